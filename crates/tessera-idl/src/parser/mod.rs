//! The lexerless parser: a character-level scanner plus recursive-descent
//! declaration and value grammars.

pub mod decl;
pub mod scanner;
pub mod value;

pub use decl::parse_module;
pub use scanner::Scanner;
pub use value::{parse_default_value, parse_full_name};

use crate::ast::decl::Schema;
use crate::error::Result;

/// Parses one module's source text into a fresh, unresolved [`Schema`].
///
/// The result still contains `Type::Reference` / `Type::Import` placeholders
/// and raw-captured values; run it through
/// [`process_parsed_source`](crate::compile::process_parsed_source) to
/// resolve them.
pub struct Parser<'s> {
    source: &'s str,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    pub fn parse(&self) -> Result<Schema> {
        let mut schema = Schema::new();
        parse_module(&mut schema, self.source)?;
        Ok(schema)
    }
}
