use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ProfileId;
use crate::model::query::SortKey;

/// An isolated movie collection inside the shared store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,

    /// Unique, compared case-insensitively.
    pub name: String,

    /// Ordering last chosen for this profile; `None` keeps insertion order.
    pub sort_key: Option<SortKey>,

    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// File name of the generated page, e.g. `Jane_Doe.html`.
    ///
    /// Anything but letters, digits, `-` and `_` becomes `_`, so the name
    /// never carries a path separator or a `..` component.
    #[must_use]
    pub fn site_file_name(&self) -> String {
        let stem: String = self
            .name
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{stem}.html")
    }

    /// Heading used on the generated page.
    #[must_use]
    pub fn site_title(&self) -> String {
        format!("{}'s Movie App", self.name.trim())
    }
}
