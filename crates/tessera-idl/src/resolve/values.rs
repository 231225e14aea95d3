//! Deferred-literal resolution.
//!
//! Literals whose type was unknown at parse time were captured as raw text.
//! With references bound, each one is re-parsed by the same type-directed
//! grammar the parser uses. Annotation arguments resolve here too: their
//! expected type comes from the now-bound annotation declaration.

use crate::ast::decl::{Annotation, DeclId, DeclKind, Schema};
use crate::ast::types::Type;
use crate::ast::value::Value;
use crate::ast::walk::{self, SlotVisit};
use crate::error::{Error, Result};
use crate::parser::{parse_default_value, Scanner};

/// Re-parses every deferred value in `module` against its resolved type.
pub fn resolve_values(schema: &mut Schema, module: DeclId) -> Result<()> {
    for id in schema.module_decls(module) {
        let mut kind = schema.decl(id).kind.clone();
        let mut annotations = schema.decl(id).annotations.clone();

        walk::walk_decl(&mut kind, &mut annotations, &mut ValueResolver { schema })?;

        let decl = schema.decl_mut(id);
        decl.kind = kind;
        decl.annotations = annotations;
    }
    Ok(())
}

/// Parses a raw literal against a known type. Shared with the public
/// value-parsing entry point.
pub fn reparse_value(raw: &str, ty: &Type, schema: &Schema) -> Result<Value> {
    let mut sc = Scanner::new(raw);
    sc.advance_whitespace();
    parse_default_value(&mut sc, schema, Some(ty))
}

struct ValueResolver<'a> {
    schema: &'a Schema,
}

impl SlotVisit for ValueResolver<'_> {
    /// Runs before the walker descends into the annotation, so the argument
    /// is typed (and replaced) before its own value slots are visited.
    fn visit_annotation(&mut self, a: &mut Annotation) -> Result<()> {
        let (decl_id, binding) = match &a.decl {
            Type::Decl(id) => (*id, None),
            Type::Bound(b) => (b.open, Some((**b).clone())),
            Type::Reference(name) => {
                return Err(Error::resolve(format!(
                    "cannot find annotation declaration '{name}'"
                )))
            }
            other => {
                return Err(Error::resolve(format!(
                    "{} cannot be used as an annotation",
                    other.describe()
                )))
            }
        };
        let decl = self.schema.decl(decl_id);
        let DeclKind::Annotation(annotation_decl) = &decl.kind else {
            return Err(Error::resolve(format!(
                "'{}' is not an annotation",
                decl.name
            )));
        };

        match (&mut a.argument, &annotation_decl.arg_type) {
            (Some(argument), Some(arg_type)) => {
                let mut ty = arg_type.clone();
                if let (Type::GenericParameter(p), Some(b)) = (&ty, &binding) {
                    ty = b.resolve_generic_parameter(p).ok_or_else(|| {
                        Error::resolve(format!(
                            "annotation '{}' argument type parameter {} is unbound",
                            decl.name, p.name
                        ))
                    })?;
                }
                if let Value::Unresolved { raw, .. } = argument {
                    *argument = reparse_value(raw, &ty, self.schema)?;
                }
            }
            (Some(_), None) => {
                return Err(Error::resolve(format!(
                    "annotation '{}' takes no argument",
                    decl.name
                )))
            }
            (None, Some(arg_type)) => {
                if *arg_type != Type::VOID {
                    return Err(Error::resolve(format!(
                        "annotation '{}' requires an argument of type {}",
                        decl.name,
                        arg_type.describe()
                    )));
                }
            }
            (None, None) => {}
        }
        Ok(())
    }

    fn visit_value(&mut self, value: &mut Value) -> Result<()> {
        if let Value::Unresolved { ty: Some(ty), raw, .. } = value {
            let parsed = reparse_value(raw, ty, self.schema)?;
            *value = parsed;
        }
        Ok(())
    }
}
