//! Constant-reference substitution.
//!
//! A value that names another constant is replaced by that constant's actual
//! value. Constant references are always fully qualified: lookup starts at
//! the module root and descends scope names, never searching outward.
//! Substituted values are resolved recursively (a constant may be defined in
//! terms of another), with a seen-set turning reference cycles into errors.

use crate::ast::decl::{DeclId, DeclKind, Schema};
use crate::ast::value::Value;
use crate::ast::walk;
use crate::error::{Error, Result};
use crate::foundation::FullName;

pub fn resolve_const_refs(schema: &mut Schema, module: DeclId) -> Result<()> {
    for id in schema.module_decls(module) {
        let mut kind = schema.decl(id).kind.clone();
        let mut annotations = schema.decl(id).annotations.clone();

        walk::rewrite_values(&mut kind, &mut annotations, |value| {
            if let Value::ConstRef(name) = value {
                *value = const_value(schema, module, &name.clone(), &mut Vec::new())?;
            }
            Ok(())
        })?;

        let decl = schema.decl_mut(id);
        decl.kind = kind;
        decl.annotations = annotations;
    }
    Ok(())
}

/// Returns the value of the constant `name` refers to, with any constant
/// references inside that value resolved as well.
fn const_value(
    schema: &Schema,
    module: DeclId,
    name: &FullName,
    seen: &mut Vec<DeclId>,
) -> Result<Value> {
    let id = lookup_const(schema, module, name)?;
    if seen.contains(&id) {
        return Err(Error::resolve(format!(
            "constant reference cycle through '{name}'"
        )));
    }
    let DeclKind::Const(decl) = &schema.decl(id).kind else {
        return Err(Error::resolve(format!(
            "const ref '{name}' does not refer to a const"
        )));
    };

    seen.push(id);
    let mut value = decl.value.clone();
    deep_resolve(schema, module, &mut value, seen)?;
    seen.pop();
    Ok(value)
}

fn deep_resolve(
    schema: &Schema,
    module: DeclId,
    value: &mut Value,
    seen: &mut Vec<DeclId>,
) -> Result<()> {
    match value {
        Value::ConstRef(name) => {
            *value = const_value(schema, module, &name.clone(), seen)?;
        }
        Value::List(items) => {
            for item in items {
                deep_resolve(schema, module, item, seen)?;
            }
        }
        Value::Struct(fields) => {
            for item in fields.values_mut() {
                deep_resolve(schema, module, item, seen)?;
            }
        }
        Value::Union { value: inner, .. } => deep_resolve(schema, module, inner, seen)?,
        _ => {}
    }
    Ok(())
}

/// Full-name lookup from the module root: every segment before the last
/// names a nested composite scope, the last names the constant itself.
fn lookup_const(schema: &Schema, module: DeclId, name: &FullName) -> Result<DeclId> {
    let mut scope = module;
    let parts = name.parts();
    for part in &parts[..parts.len() - 1] {
        scope = child_scope(schema, scope, &part.name).ok_or_else(|| {
            Error::resolve(format!("cannot resolve const ref '{name}'"))
        })?;
    }

    let composite = schema
        .decl(scope)
        .composite()
        .ok_or_else(|| Error::resolve(format!("cannot resolve const ref '{name}'")))?;
    let last = &name.last().name;
    if let Some(&id) = composite
        .consts
        .iter()
        .find(|&&id| &schema.decl(id).name == last)
    {
        return Ok(id);
    }
    // Distinguish "no such name" from "that name is not a constant".
    let other = composite
        .structs
        .iter()
        .chain(&composite.interfaces)
        .chain(&composite.enums)
        .chain(&composite.annotation_defs)
        .any(|&id| &schema.decl(id).name == last);
    if other {
        Err(Error::resolve(format!(
            "const ref '{name}' does not refer to a const"
        )))
    } else {
        Err(Error::resolve(format!("cannot resolve const ref '{name}'")))
    }
}

fn child_scope(schema: &Schema, scope: DeclId, name: &str) -> Option<DeclId> {
    let composite = schema.decl(scope).composite()?;
    composite
        .structs
        .iter()
        .chain(&composite.interfaces)
        .copied()
        .find(|&id| schema.decl(id).name == name)
}
