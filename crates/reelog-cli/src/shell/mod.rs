//! The interactive numbered-menu shell.
//!
//! Generic over its input and output so it can be driven by a script in
//! tests. Recoverable collection errors are printed and the loop goes on;
//! anything else ends the session.

mod display;
pub mod menu;
mod prompt;

use std::io::{BufRead, Write};

use anyhow::Result;
use reelog_collection::{AddOutcome, CollectionError, CollectionService, Session};
use reelog_core::model::{Movie, MoviePatch, SortKey};
use reelog_enrich::MetadataLookup;

use menu::{Flow, MenuCommand};
use prompt::Prompter;

#[derive(Debug)]
pub struct Shell<L, R, W> {
    service: CollectionService<L>,
    session: Session,
    io: Prompter<R, W>,
}

impl<L: MetadataLookup, R: BufRead, W: Write> Shell<L, R, W> {
    pub fn new(service: CollectionService<L>, input: R, output: W) -> Self {
        Self {
            service,
            session: Session::new(),
            io: Prompter::new(input, output),
        }
    }

    /// Start on the named profile instead of the picker. A rejected name
    /// is reported and the picker comes up as usual.
    pub fn preselect(&mut self, name: &str) -> Result<()> {
        let selected = self
            .session
            .select_or_create(self.service.database(), name)
            .map(|_| ());
        if let Err(e) = selected {
            self.report(e.into())?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.io.into_output()
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            let flow = if self.session.is_active() {
                self.menu_round().await?
            } else {
                self.pick_profile()?
            };

            match flow {
                Flow::Continue => {}
                Flow::SwitchProfile => self.session.clear(),
                Flow::Exit => {
                    writeln!(self.io.out(), "Bye!")?;
                    return Ok(());
                }
            }
        }
    }

    async fn menu_round(&mut self) -> Result<Flow> {
        self.print_menu()?;
        let max = menu::max_key();
        let Some(key) = self.io.choice(&format!("Enter choice (0-{max}): "), max)? else {
            return Ok(Flow::Exit);
        };
        let Some(command) = menu::command_for(key) else {
            return Ok(Flow::Continue);
        };

        log::debug!("Running {:?}", command);
        match self.dispatch(command).await {
            Ok(flow) => Ok(flow),
            Err(e) => {
                self.report(e)?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn dispatch(&mut self, command: MenuCommand) -> Result<Flow> {
        match command {
            MenuCommand::Exit => Ok(Flow::Exit),
            MenuCommand::List => self.list(),
            MenuCommand::Add => self.add().await,
            MenuCommand::Delete => self.delete(),
            MenuCommand::Update => self.update(),
            MenuCommand::Stats => self.stats(),
            MenuCommand::Random => self.random(),
            MenuCommand::Search => self.search(),
            MenuCommand::Sort => self.sort(),
            MenuCommand::GenerateWebsite => self.website(),
            MenuCommand::SwitchProfile => Ok(Flow::SwitchProfile),
            MenuCommand::DeleteProfile => self.delete_profile(),
        }
    }

    /// Print a recoverable error, or hand back anything fatal.
    fn report(&mut self, error: anyhow::Error) -> Result<()> {
        let Some(e) = error.downcast_ref::<CollectionError>() else {
            return Err(error);
        };
        if e.is_fatal() {
            return Err(error);
        }
        if matches!(e, CollectionError::NoActiveSession) {
            self.session.clear();
        }
        writeln!(self.io.out(), "Error: {e}")?;
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        let name = self
            .session
            .active()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let out = self.io.out();
        writeln!(out, "\n********** {name}'s Movies Database **********")?;
        for entry in menu::MENU {
            writeln!(out, "{}. {}", entry.key, entry.label)?;
        }
        Ok(())
    }

    fn print_movies(&mut self, movies: &[Movie]) -> Result<()> {
        let out = self.io.out();
        writeln!(out, "\n{} movie(s) in total", movies.len())?;
        for movie in movies {
            writeln!(out, "{}", display::movie_line(movie))?;
        }
        Ok(())
    }

    fn pick_profile(&mut self) -> Result<Flow> {
        let profiles = self
            .service
            .database()
            .list_profiles()
            .map_err(CollectionError::from)?;

        let create = profiles.len() + 1;
        let out = self.io.out();
        writeln!(out, "\nWho is watching?")?;
        for (i, profile) in profiles.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, profile.name)?;
        }
        writeln!(out, "{create}. Create new profile")?;
        writeln!(out, "0. Exit")?;

        let Some(choice) = self.io.choice(&format!("Enter choice (0-{create}): "), create)? else {
            return Ok(Flow::Exit);
        };

        let db = self.service.database();
        let selected = match choice {
            0 => return Ok(Flow::Exit),
            n if n == create => {
                let Some(name) = self.io.text("Enter new profile name: ")? else {
                    return Ok(Flow::Exit);
                };
                self.session.create(db, &name, true).map(|_| ())
            }
            n => match profiles.get(n - 1) {
                Some(profile) => self.session.select(db, profile.id).map(|_| ()),
                None => Ok(()),
            },
        };

        match selected {
            Ok(()) => {
                if let Ok(profile) = self.session.active() {
                    writeln!(self.io.out(), "Welcome, {}!", profile.name)?;
                }
            }
            Err(e) => self.report(e.into())?,
        }
        Ok(Flow::Continue)
    }

    fn list(&mut self) -> Result<Flow> {
        let profile = self.session.active_id()?;
        let movies = self.service.list_movies(profile)?;
        self.print_movies(&movies)?;
        Ok(Flow::Continue)
    }

    async fn add(&mut self) -> Result<Flow> {
        let profile = self.session.active_id()?;
        let Some(title) = self.io.text("Enter new movie name: ")? else {
            return Ok(Flow::Exit);
        };

        let message = match self.service.add_movie(profile, &title).await? {
            AddOutcome::Added(movie) => format!("Movie '{}' successfully added.", movie.title),
            AddOutcome::Stub { movie, reason } => format!(
                "Could not fetch details ({reason}); saved '{}' without metadata.",
                movie.title
            ),
            AddOutcome::Refreshed(movie) => {
                format!("Movie '{}' was already listed; details refreshed.", movie.title)
            }
        };
        writeln!(self.io.out(), "{message}")?;
        Ok(Flow::Continue)
    }

    fn delete(&mut self) -> Result<Flow> {
        let profile = self.session.active_id()?;
        let Some(title) = self.io.text("Enter movie name to delete: ")? else {
            return Ok(Flow::Exit);
        };
        self.service.delete_movie(profile, &title)?;
        writeln!(self.io.out(), "Movie '{title}' successfully deleted.")?;
        Ok(Flow::Continue)
    }

    fn update(&mut self) -> Result<Flow> {
        let profile = self.session.active_id()?;
        let Some(title) = self.io.text("Enter movie name: ")? else {
            return Ok(Flow::Exit);
        };
        let exists = self
            .service
            .database()
            .find_movie(profile, &title)
            .map_err(CollectionError::from)?
            .is_some();
        if !exists {
            return Err(CollectionError::NotFound {
                entity: "movie",
                key: title,
            }
            .into());
        }

        let out = self.io.out();
        writeln!(out, "What would you like to change?")?;
        writeln!(out, "1. Your rating")?;
        writeln!(out, "2. Year")?;
        writeln!(out, "3. Provider rating")?;
        writeln!(out, "4. Poster URL")?;
        writeln!(out, "0. Cancel")?;
        let Some(field) = self.io.choice("Enter choice (0-4): ", 4)? else {
            return Ok(Flow::Exit);
        };

        let patch = match field {
            0 => return Ok(Flow::Continue),
            1 => self
                .io
                .rating("Enter your rating (0-10): ")?
                .map(|r| MoviePatch::new().with_personal_rating(r)),
            2 => self
                .io
                .year("Enter the year: ")?
                .map(|y| MoviePatch::new().with_year(y)),
            3 => self
                .io
                .rating("Enter the rating (0-10): ")?
                .map(|r| MoviePatch::new().with_rating(r)),
            _ => self
                .io
                .text("Enter the poster URL: ")?
                .map(|url| MoviePatch::new().with_poster_url(url)),
        };
        let Some(patch) = patch else {
            return Ok(Flow::Exit);
        };

        let movie = self.service.update_movie(profile, &title, &patch)?;
        writeln!(self.io.out(), "Updated {}", display::movie_line(&movie))?;
        Ok(Flow::Continue)
    }

    fn stats(&mut self) -> Result<Flow> {
        let profile = self.session.active_id()?;
        let stats = self.service.stats(profile)?;
        let out = self.io.out();
        for line in display::stats_lines(&stats) {
            writeln!(out, "{line}")?;
        }
        Ok(Flow::Continue)
    }

    fn random(&mut self) -> Result<Flow> {
        let profile = self.session.active_id()?;
        let movie = self.service.random_movie(profile)?;
        writeln!(
            self.io.out(),
            "Your movie for tonight: {}",
            display::movie_line(&movie)
        )?;
        Ok(Flow::Continue)
    }

    fn search(&mut self) -> Result<Flow> {
        let profile = self.session.active_id()?;
        let Some(term) = self.io.text("Enter part of movie name: ")? else {
            return Ok(Flow::Exit);
        };
        let movies = self.service.search_movies(profile, &term)?;
        if movies.is_empty() {
            writeln!(self.io.out(), "No movies match '{term}'.")?;
        } else {
            let out = self.io.out();
            for movie in &movies {
                writeln!(out, "{}", display::movie_line(movie))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn sort(&mut self) -> Result<Flow> {
        let profile = self.session.active_id()?;
        let out = self.io.out();
        writeln!(out, "Sort by:")?;
        for (i, key) in SortKey::ALL.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, key.label())?;
        }
        writeln!(out, "0. Cancel")?;

        let max = SortKey::ALL.len();
        let Some(choice) = self.io.choice(&format!("Enter choice (0-{max}): "), max)? else {
            return Ok(Flow::Exit);
        };
        let Some(&key) = choice.checked_sub(1).and_then(|i| SortKey::ALL.get(i)) else {
            return Ok(Flow::Continue);
        };

        let movies = self.service.sort_movies(profile, key)?;
        self.session.refresh(self.service.database())?;
        self.print_movies(&movies)?;
        Ok(Flow::Continue)
    }

    fn website(&mut self) -> Result<Flow> {
        let profile = self.session.active_id()?;
        let path = self.service.generate_website(profile)?;
        writeln!(
            self.io.out(),
            "Website was generated successfully: {}",
            path.display()
        )?;
        Ok(Flow::Continue)
    }

    fn delete_profile(&mut self) -> Result<Flow> {
        let profiles = self
            .service
            .database()
            .list_profiles()
            .map_err(CollectionError::from)?;

        let out = self.io.out();
        writeln!(out, "Which profile should be deleted?")?;
        for (i, profile) in profiles.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, profile.name)?;
        }
        writeln!(out, "0. Cancel")?;

        let max = profiles.len();
        let Some(choice) = self.io.choice(&format!("Enter choice (0-{max}): "), max)? else {
            return Ok(Flow::Exit);
        };
        let Some(target) = choice.checked_sub(1).and_then(|i| profiles.get(i)) else {
            return Ok(Flow::Continue);
        };

        let prompt = format!(
            "This removes '{}' and all of its movies. Type DELETE to confirm: ",
            target.name
        );
        let Some(confirmed) = self.io.confirm(&prompt, "DELETE")? else {
            return Ok(Flow::Exit);
        };
        if !confirmed {
            writeln!(self.io.out(), "Cancelled.")?;
            return Ok(Flow::Continue);
        }

        let removed = self.session.delete(self.service.database(), target.id)?;
        writeln!(
            self.io.out(),
            "Deleted profile '{}' and {removed} movie(s).",
            target.name
        )?;
        Ok(Flow::Continue)
    }
}
