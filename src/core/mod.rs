//! Core data model: references and link classification.

mod link;
mod reference;

pub use link::LinkScope;
pub use reference::{RefKind, Reference};
