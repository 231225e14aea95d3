//! High-level compile API.
//!
//! `compile_source` is the one-call entry point: parse a module, then run the
//! full resolution pipeline over it and everything it imports. The loader
//! callback maps an import path to source text; return `None` for files that
//! cannot be found.

use crate::ast::decl::Schema;
use crate::ast::types::Type;
use crate::ast::value::Value;
use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::resolve::{self, ImportCtx};

/// Compiles one module's source text into a fully resolved [`Schema`].
pub fn compile_source(
    source: &str,
    loader: &mut dyn FnMut(&str) -> Option<String>,
) -> Result<Schema> {
    let mut schema = Parser::new(source).parse()?;
    process_parsed_source(&mut schema, loader)?;
    Ok(schema)
}

/// Runs the resolution pipeline over an already parsed schema, starting at
/// its root module. Imported modules are parsed into the same arena and
/// processed recursively.
pub fn process_parsed_source(
    schema: &mut Schema,
    loader: &mut dyn FnMut(&str) -> Option<String>,
) -> Result<()> {
    let root = schema.root();
    let mut imports = ImportCtx::new(loader);
    resolve::process_module(schema, root, &mut imports)
}

/// Parses a standalone literal against a known type from a resolved schema.
///
/// Useful for tooling that accepts values in schema syntax, such as a CLI
/// that overrides a constant.
pub fn parse_value(raw: &str, ty: &Type, schema: &Schema) -> Result<Value> {
    resolve::reparse_value(raw, ty, schema)
}

/// Serializes a resolved [`Schema`] to JSON.
pub fn serialize_schema(schema: &Schema) -> Result<String> {
    serde_json::to_string(schema)
        .map_err(|e| Error::internal(format!("schema serialization failed: {e}")))
}

/// Deserializes a [`Schema`] from JSON produced by [`serialize_schema`].
pub fn deserialize_schema(data: &str) -> Result<Schema> {
    serde_json::from_str(data)
        .map_err(|e| Error::internal(format!("schema deserialization failed: {e}")))
}
