//! Core data types shared across the engine.

mod category;
mod options;
mod result;
mod span;
mod token;

pub use category::PiiCategory;
pub use options::RedactionOptions;
pub use result::{DegradationWarning, RedactionOutcome, RedactionResult};
pub use span::{Detection, DetectionSource};
pub use token::RedactionToken;
