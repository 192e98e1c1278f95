//! Line-oriented input helpers.
//!
//! Every helper returns `Ok(None)` once input is exhausted so callers can
//! wind down cleanly; invalid answers are re-prompted rather than failed.

use std::io::{self, BufRead, Write};

use reelog_core::model::RATING_RANGE;

#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    /// A non-empty line of text.
    pub fn text(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            match self.line(prompt)? {
                None => return Ok(None),
                Some(answer) if answer.is_empty() => {
                    writeln!(self.output, "Please enter a value.")?;
                }
                Some(answer) => return Ok(Some(answer)),
            }
        }
    }

    /// A number in `0..=max`.
    pub fn choice(&mut self, prompt: &str, max: usize) -> io::Result<Option<usize>> {
        loop {
            let Some(answer) = self.line(prompt)? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if n <= max => return Ok(Some(n)),
                _ => writeln!(self.output, "Please enter a number between 0 and {max}.")?,
            }
        }
    }

    /// A rating within the accepted range.
    pub fn rating(&mut self, prompt: &str) -> io::Result<Option<f64>> {
        loop {
            let Some(answer) = self.line(prompt)? else {
                return Ok(None);
            };
            match answer.parse::<f64>() {
                Ok(r) if r.is_finite() && RATING_RANGE.contains(&r) => return Ok(Some(r)),
                _ => writeln!(
                    self.output,
                    "Please enter a number between {} and {}.",
                    RATING_RANGE.start(),
                    RATING_RANGE.end()
                )?,
            }
        }
    }

    /// A positive year.
    pub fn year(&mut self, prompt: &str) -> io::Result<Option<i32>> {
        loop {
            let Some(answer) = self.line(prompt)? else {
                return Ok(None);
            };
            match answer.parse::<i32>() {
                Ok(y) if y > 0 => return Ok(Some(y)),
                _ => writeln!(self.output, "Please enter a valid year.")?,
            }
        }
    }

    /// True only if the user types `word` exactly.
    pub fn confirm(&mut self, prompt: &str, word: &str) -> io::Result<Option<bool>> {
        Ok(self.line(prompt)?.map(|answer| answer == word))
    }
}
