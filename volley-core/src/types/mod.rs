mod id;
mod outcome;

pub use id::ItemId;
pub use outcome::{BatchResult, Failure, Outcome, Success};
