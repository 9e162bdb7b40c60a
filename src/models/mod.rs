//! Domain models
//!
//! Shapes exchanged with the collaborator that submits judge requests.

pub mod submission;
pub mod test_case;

pub use submission::*;
pub use test_case::*;
