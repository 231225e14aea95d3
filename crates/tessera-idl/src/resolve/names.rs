//! Reference resolution and generic closing.
//!
//! Every `Type::Reference` is bound by searching the lexical scope chain
//! outward for the name's first segment, then resolving later segments
//! strictly against the container found for the previous one. Forward
//! references are legal, so the pass sweeps the whole module repeatedly: a
//! sweep that makes no progress while references remain reports them as
//! unresolved.

use crate::ast::decl::{Composite, DeclId, DeclKind, Schema};
use crate::ast::types::{BoundGenericType, GenericParameter, Primitive, Type};
use crate::ast::walk;
use crate::error::{Error, Result};
use crate::foundation::{FullName, NamePart};

/// Binds every reference in `module`. Runs to a fixpoint over full-module
/// sweeps; by construction two sweeps suffice for any resolvable module, but
/// progress is measured rather than assumed.
pub fn resolve_names(schema: &mut Schema, module: DeclId) -> Result<()> {
    let decls = schema.module_decls(module);
    let mut sweeps = 0u32;
    loop {
        sweeps += 1;
        let mut unresolved = Vec::new();
        let mut progress = false;

        for &id in &decls {
            let decl = schema.decl(id);
            // References inside a composite body resolve starting at the
            // composite itself; other declarations start at their parent.
            let start = if decl.composite().is_some() {
                id
            } else {
                decl.scope.unwrap_or(id)
            };
            let mut kind = decl.kind.clone();
            let mut annotations = decl.annotations.clone();

            walk::rewrite_types(&mut kind, &mut annotations, |ty| {
                if let Type::Reference(name) = ty {
                    match resolve_reference(schema, start, name)? {
                        Some(resolved) => {
                            *ty = resolved;
                            progress = true;
                        }
                        None => unresolved.push(name.to_string()),
                    }
                }
                Ok(())
            })?;

            let decl = schema.decl_mut(id);
            decl.kind = kind;
            decl.annotations = annotations;
        }

        if unresolved.is_empty() {
            tracing::debug!(sweeps, "references resolved");
            return Ok(());
        }
        if !progress {
            unresolved.sort();
            unresolved.dedup();
            return Err(Error::resolve(format!(
                "unresolved name(s): {}",
                unresolved.join(", ")
            )));
        }
    }
}

enum Lookup {
    /// The name is not defined here.
    Missing,
    /// The name is defined here but its target has not resolved yet.
    Pending,
    Found(Type),
}

/// Resolves one dotted name from `scope`. `Ok(None)` means "not yet": some
/// part of the name depends on a reference another sweep must bind first.
pub(crate) fn resolve_reference(
    schema: &Schema,
    scope: DeclId,
    name: &FullName,
) -> Result<Option<Type>> {
    // The leading-dot form always denotes a module-level constant.
    if name.is_top_level_const() {
        let module = schema.module_of(scope);
        return match lookup_member(schema, module, &name.first().name) {
            Lookup::Found(Type::Decl(id))
                if matches!(schema.decl(id).kind, DeclKind::Const(_)) =>
            {
                Ok(Some(Type::Decl(id)))
            }
            Lookup::Found(_) => Err(Error::resolve(format!(
                "'{name}' does not name a module-level constant"
            ))),
            Lookup::Pending | Lookup::Missing => Ok(None),
        };
    }

    // First segment: search the scope chain outward.
    let first = name.first();
    let mut found = None;
    let mut cursor = Some(scope);
    while let Some(s) = cursor {
        match lookup_in_scope(schema, s, &first.name) {
            Lookup::Found(t) => {
                found = Some(t);
                break;
            }
            // A defined-but-unresolved alias shadows outer scopes.
            Lookup::Pending => return Ok(None),
            Lookup::Missing => cursor = schema.decl(s).scope,
        }
    }
    let Some(base) = found else {
        return Ok(None);
    };
    let Some(mut current) = apply_generic_args(schema, scope, base, first, None)? else {
        return Ok(None);
    };

    // Later segments resolve strictly against the previous one.
    for i in 1..name.len() {
        let part = name.part(i);
        let (container, binding) = match current {
            Type::Decl(id) => (id, None),
            Type::Bound(b) => (b.open, Some(*b)),
            other => {
                return Err(Error::resolve(format!(
                    "cannot resolve '{}' in '{name}': {} has no members",
                    part.name,
                    other.describe()
                )))
            }
        };
        let member = match lookup_member(schema, container, &part.name) {
            Lookup::Found(t) => t,
            Lookup::Pending | Lookup::Missing => return Ok(None),
        };
        match apply_generic_args(schema, scope, member, part, binding)? {
            Some(t) => current = t,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Applies a name part's generic arguments to the type it resolved to.
/// `parent` carries the binding accumulated from earlier dotted segments, so
/// members of a closed generic stay closable.
fn apply_generic_args(
    schema: &Schema,
    scope: DeclId,
    base: Type,
    part: &NamePart,
    parent: Option<BoundGenericType>,
) -> Result<Option<Type>> {
    let mut args = Vec::new();
    for arg_name in &part.type_args {
        match resolve_reference(schema, scope, arg_name)? {
            Some(t) => args.push(t),
            None => return Ok(None),
        }
    }

    let Type::Decl(id) = base else {
        if !args.is_empty() {
            return Err(Error::resolve(format!(
                "cannot apply type arguments to '{}'",
                part.name
            )));
        }
        return Ok(Some(base));
    };

    let param_count = schema
        .decl(id)
        .composite()
        .map(|c| c.type_params.len())
        .unwrap_or(0);

    if !args.is_empty() {
        if param_count == 0 {
            return Err(Error::resolve(format!(
                "'{}' is not generic and takes no type arguments",
                part.name
            )));
        }
        if args.len() != param_count {
            return Err(Error::resolve(format!(
                "wrong number of type arguments for '{}': expected {param_count}, got {}",
                part.name,
                args.len()
            )));
        }
        return Ok(Some(Type::Bound(Box::new(BoundGenericType {
            open: id,
            args,
            parent: parent.map(Box::new),
        }))));
    }

    // No arguments: the type stays open, but a binding inherited from the
    // dotted path must be preserved.
    if parent.is_some() {
        return Ok(Some(Type::Bound(Box::new(BoundGenericType {
            open: id,
            args: Vec::new(),
            parent: parent.map(Box::new),
        }))));
    }
    Ok(Some(Type::Decl(id)))
}

/// Looks `name` up within one scope: members first, then, at module scope
/// only, the primitive keywords.
fn lookup_in_scope(schema: &Schema, scope: DeclId, name: &str) -> Lookup {
    match lookup_member(schema, scope, name) {
        Lookup::Missing => {}
        found => return found,
    }
    if schema.decl(scope).is_module() {
        if let Some(primitive) = Primitive::from_keyword(name) {
            return Lookup::Found(Type::Primitive(primitive));
        }
    }
    Lookup::Missing
}

/// Strict member lookup within a container: nested declarations, the
/// container's own generic parameters, and `using` aliases.
fn lookup_member(schema: &Schema, container: DeclId, name: &str) -> Lookup {
    let Some(composite) = schema.decl(container).composite() else {
        return Lookup::Missing;
    };

    if let Some(id) = find_named(schema, composite, name) {
        return Lookup::Found(Type::Decl(id));
    }

    if let Some(index) = composite.type_params.iter().position(|p| p == name) {
        return Lookup::Found(Type::GenericParameter(GenericParameter {
            owner: container,
            index: index as u32,
            name: name.to_string(),
        }));
    }

    for using in &composite.usings {
        if using.name.as_deref() == Some(name) {
            return match &using.target {
                Type::Reference(_) | Type::Import { .. } => Lookup::Pending,
                resolved => Lookup::Found(resolved.clone()),
            };
        }
    }

    Lookup::Missing
}

fn find_named(schema: &Schema, composite: &Composite, name: &str) -> Option<DeclId> {
    composite
        .structs
        .iter()
        .chain(&composite.interfaces)
        .chain(&composite.enums)
        .chain(&composite.consts)
        .chain(&composite.annotation_defs)
        .copied()
        .find(|&id| schema.decl(id).name == name)
}
