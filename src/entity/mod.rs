// Entity data model.
// Root entity tree, dependency entities, and the assembled warm-up result.

pub mod types;

pub use types::*;
