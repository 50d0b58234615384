//! Detection pipeline stages.
//!
//! A redaction call flows through three stages: chunked or inline pattern
//! scanning ([`chunk`]), conflict resolution over every detection source
//! ([`merge`]), and placeholder substitution with ledger bookkeeping
//! ([`tokenize`]). Each stage is a pure function over its inputs; the
//! orchestrator owns scheduling and I/O.

pub mod chunk;
pub mod merge;
pub mod tokenize;

pub use chunk::{margin_for, split_with_margin, Chunk};
pub use merge::resolve;
pub use tokenize::{apply, restore, Tokenizer};
