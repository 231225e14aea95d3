//! The resolution pipeline.
//!
//! Runs a fixed sequence of rewrite passes over a freshly parsed module:
//!
//! 1. [`ids`]: derive missing declaration ids deterministically
//! 2. [`imports`]: load, parse, and process imported modules
//! 3. [`names`]: bind references, close generics (fixpoint)
//! 4. [`values`]: re-parse deferred literals against resolved types
//! 5. [`consts`]: substitute constant references by their values
//! 6. [`validate`]: structural checks and transient-node invariants
//!
//! Each pass follows the same shape: clone a declaration's kind and
//! annotations out of the arena, rewrite slots through [`crate::ast::walk`],
//! and write the result back. A module either resolves completely or the
//! pipeline aborts with the first error.

pub mod consts;
pub mod ids;
pub mod imports;
pub mod names;
pub mod validate;
pub mod values;

pub use imports::ImportCtx;
pub use values::reparse_value;

use crate::ast::decl::{DeclId, Schema};
use crate::error::Result;

/// Runs the full pass sequence over `module` (and, through the import pass,
/// over every module it transitively imports).
pub fn process_module(schema: &mut Schema, module: DeclId, imports: &mut ImportCtx<'_>) -> Result<()> {
    tracing::debug!(module = %module, "resolving module");
    ids::generate_ids(schema, module)?;
    imports::resolve_imports(schema, module, imports)?;
    names::resolve_names(schema, module)?;
    values::resolve_values(schema, module)?;
    consts::resolve_const_refs(schema, module)?;
    validate::validate(schema, module)?;
    tracing::debug!(module = %module, decls = schema.len(), "module resolved");
    Ok(())
}
