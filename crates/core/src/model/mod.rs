mod card;
mod ids;
mod profile;
mod report;

pub use ids::{CardId, CategoryId, ParseIdError, SetId};

pub use card::{CardError, Flashcard};
pub use profile::{Category, CategoryPoints, UserProfile};
pub use report::{ReportError, ScoreReport};
