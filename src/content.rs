//! Static content document and its read-only store
//!
//! The document is loaded once at startup; a missing or malformed file aborts
//! the process. After that the store is immutable and shared by reference.

mod document;
mod store;
mod texts;

#[cfg(test)]
pub(crate) mod fixtures;

pub use document::Entity;
#[cfg(test)]
pub use document::Candidate;
pub use store::{ContentStore, EntitySummary};
pub use texts::Texts;
