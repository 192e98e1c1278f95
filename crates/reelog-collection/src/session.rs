//! Which profile the interactive shell is acting on.

use reelog_core::model::{Profile, ProfileId};
use reelog_core::schema::Database;

use crate::error::{CollectionError, CollectionResult};

/// Where a session stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    NoActiveProfile,
    Active(Profile),
}

/// Holds the active profile between menu actions.
///
/// Every profile-scoped action asks the session for the active profile
/// first, so nothing touches a collection until one is chosen.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    /// The active profile, or `NoActiveSession` when none was chosen.
    pub fn active(&self) -> CollectionResult<&Profile> {
        match &self.state {
            SessionState::Active(profile) => Ok(profile),
            SessionState::NoActiveProfile => Err(CollectionError::NoActiveSession),
        }
    }

    pub fn active_id(&self) -> CollectionResult<ProfileId> {
        self.active().map(|p| p.id)
    }

    /// Make an existing profile the active one.
    pub fn select(&mut self, db: &Database, id: ProfileId) -> CollectionResult<&Profile> {
        let profile = db.get_profile(id)?;
        log::debug!("Switched to profile '{}'", profile.name);
        self.state = SessionState::Active(profile);
        self.active()
    }

    /// Make the profile with this name active, creating it if needed.
    pub fn select_or_create(&mut self, db: &Database, name: &str) -> CollectionResult<&Profile> {
        let name = require_name(name)?;
        let profile = match db.find_profile_by_name(name)? {
            Some(profile) => profile,
            None => {
                log::info!("Creating profile '{}'", name);
                db.create_profile(name)?
            }
        };
        self.state = SessionState::Active(profile);
        self.active()
    }

    /// Register a new profile. A duplicate name is an error; the new
    /// profile becomes active only when `activate` is set.
    pub fn create(
        &mut self,
        db: &Database,
        name: &str,
        activate: bool,
    ) -> CollectionResult<Profile> {
        let name = require_name(name)?;
        let profile = db.create_profile(name)?;
        log::info!("Created profile '{}'", profile.name);
        if activate {
            self.state = SessionState::Active(profile.clone());
        }
        Ok(profile)
    }

    /// Delete a profile and its movies, returning how many movies went
    /// with it. Deleting the active profile ends the session.
    pub fn delete(&mut self, db: &Database, id: ProfileId) -> CollectionResult<usize> {
        let removed = db.delete_profile(id)?;
        if self.active_id().ok() == Some(id) {
            self.clear();
        }
        Ok(removed)
    }

    /// Re-read the active profile, picking up a changed sort preference.
    pub fn refresh(&mut self, db: &Database) -> CollectionResult<()> {
        let id = self.active_id()?;
        match db.get_profile(id) {
            Ok(profile) => {
                self.state = SessionState::Active(profile);
                Ok(())
            }
            Err(e) => {
                self.clear();
                Err(e.into())
            }
        }
    }

    pub fn clear(&mut self) {
        self.state = SessionState::NoActiveProfile;
    }
}

fn require_name(name: &str) -> CollectionResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        Err(CollectionError::Validation(
            "profile name must not be empty".to_string(),
        ))
    } else {
        Ok(name)
    }
}
