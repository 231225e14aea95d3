//! Foundation types shared by the parser and the resolution pipeline.

pub mod name;
pub mod span;

pub use name::{is_capitalized, FullName, NamePart};
pub use span::{locate, SourceLoc};
