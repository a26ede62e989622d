//! Corpus-wide reference resolution.
//!
//! Turns shorthand `sequence/meeting` mentions into concrete identifiers by
//! matching them against every record in the corpus, and records the inverse
//! edges on the target records.
mod context;
mod resolver;

pub use context::ResolutionContext;
pub use resolver::ReferenceResolver;
