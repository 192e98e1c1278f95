pub mod ids;
pub mod movie;
pub mod profile;
pub mod query;

pub use ids::{MovieId, ProfileId};
pub use movie::{validate_rating, Movie, MoviePatch, NewMovie, RATING_RANGE};
pub use profile::Profile;
pub use query::{MovieQuery, SortKey};
