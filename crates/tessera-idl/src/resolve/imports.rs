//! Import resolution.
//!
//! Every `Type::Import` slot is replaced by loading the named file through
//! the caller-supplied loader, parsing it into the same arena, and running
//! the full pipeline over the imported module. A file is parsed at most once
//! per compilation: later imports of the same name share the cached module.
//! An import reached again while it is still being processed is a cycle and
//! fails with a resolve error.

use crate::ast::decl::{DeclId, Schema};
use crate::ast::types::Type;
use crate::ast::walk;
use crate::error::{Error, Result};
use crate::resolve::names;
use std::collections::{HashMap, HashSet};

/// Import state shared across one compilation: the loader callback, the
/// per-file module cache, and the in-progress set used for cycle detection.
pub struct ImportCtx<'a> {
    loader: &'a mut dyn FnMut(&str) -> Option<String>,
    cache: HashMap<String, DeclId>,
    in_progress: HashSet<String>,
}

impl<'a> ImportCtx<'a> {
    pub fn new(loader: &'a mut dyn FnMut(&str) -> Option<String>) -> Self {
        Self {
            loader,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }
}

/// Replaces every import slot in `module` by the imported declaration.
pub fn resolve_imports(schema: &mut Schema, module: DeclId, ctx: &mut ImportCtx<'_>) -> Result<()> {
    for id in schema.module_decls(module) {
        let mut kind = schema.decl(id).kind.clone();
        let mut annotations = schema.decl(id).annotations.clone();

        walk::rewrite_types(&mut kind, &mut annotations, |ty| {
            if let Type::Import { file, inner } = ty {
                let file = std::mem::take(file);
                let inner = inner.take();
                let imported = import_module(schema, ctx, &file)?;
                *ty = match inner {
                    None => Type::Decl(imported),
                    Some(inner) => resolve_imported_name(schema, imported, &file, *inner)?,
                };
            }
            Ok(())
        })?;

        let decl = schema.decl_mut(id);
        decl.kind = kind;
        decl.annotations = annotations;
    }
    Ok(())
}

/// Loads, parses, and fully processes one imported file, or returns the
/// cached module when it was imported before.
fn import_module(schema: &mut Schema, ctx: &mut ImportCtx<'_>, file: &str) -> Result<DeclId> {
    if let Some(&cached) = ctx.cache.get(file) {
        return Ok(cached);
    }
    if !ctx.in_progress.insert(file.to_string()) {
        return Err(Error::resolve(format!(
            "import cycle detected through \"{file}\""
        )));
    }

    let result = load_and_process(schema, ctx, file);
    ctx.in_progress.remove(file);

    let module = result?;
    ctx.cache.insert(file.to_string(), module);
    Ok(module)
}

fn load_and_process(schema: &mut Schema, ctx: &mut ImportCtx<'_>, file: &str) -> Result<DeclId> {
    let source = (ctx.loader)(file)
        .ok_or_else(|| Error::resolve(format!("cannot load import \"{file}\"")))?;
    tracing::debug!(file, "processing import");
    let module = crate::parser::parse_module(schema, &source)?;
    crate::resolve::process_module(schema, module, ctx)?;
    Ok(module)
}

/// Resolves the type named in `import "file".Name` against the processed
/// imported module.
fn resolve_imported_name(
    schema: &Schema,
    module: DeclId,
    file: &str,
    inner: Type,
) -> Result<Type> {
    let Type::Reference(name) = inner else {
        return Err(Error::internal(format!(
            "import of \"{file}\" names a non-reference type"
        )));
    };
    match names::resolve_reference(schema, module, &name)? {
        Some(resolved) => Ok(resolved),
        None => Err(Error::resolve(format!(
            "\"{file}\" does not define '{name}'"
        ))),
    }
}
