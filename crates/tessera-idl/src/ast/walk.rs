//! Slot traversal over a declaration.
//!
//! Every resolution pass rewrites the same kinds of slots: type positions
//! (field types, using targets, annotation declarations, generic arguments,
//! the expected type carried by a deferred value), value positions (defaults,
//! constant values, annotation arguments), and applied annotations. This
//! module provides one traversal over all of them so passes stay free of
//! duplicated recursion.
//!
//! Traversal is depth-first. Type and value callbacks run post-order (children
//! first), so a pass replacing a node has already seen everything inside it.
//! Annotation callbacks run pre-order, letting a pass rewrite an annotation's
//! argument before the walker descends into it.
//!
//! Nested declarations are *not* followed through `DeclId`s: a pass iterates
//! the arena itself, one declaration at a time.

use crate::ast::decl::{Annotation, Composite, DeclKind, Field, Method, ParamList, Parameter};
use crate::ast::types::{BoundGenericType, Type};
use crate::ast::value::Value;
use crate::error::Result;

/// Receiver for slot callbacks. Unimplemented methods are no-ops.
pub trait SlotVisit {
    fn visit_type(&mut self, _ty: &mut Type) -> Result<()> {
        Ok(())
    }
    fn visit_value(&mut self, _value: &mut Value) -> Result<()> {
        Ok(())
    }
    fn visit_annotation(&mut self, _annotation: &mut Annotation) -> Result<()> {
        Ok(())
    }
}

/// Walks every slot of one declaration (kind plus applied annotations).
pub fn walk_decl(
    kind: &mut DeclKind,
    annotations: &mut [Annotation],
    v: &mut impl SlotVisit,
) -> Result<()> {
    for a in annotations.iter_mut() {
        walk_annotation(a, v)?;
    }
    match kind {
        DeclKind::Module(m) => walk_composite(&mut m.nested, v)?,
        DeclKind::Struct(s) => {
            walk_composite(&mut s.nested, v)?;
            for field in &mut s.fields {
                walk_field(field, v)?;
            }
        }
        DeclKind::Interface(i) => {
            walk_composite(&mut i.nested, v)?;
            for base in &mut i.extends {
                walk_type(base, v)?;
            }
            for method in &mut i.methods {
                walk_method(method, v)?;
            }
        }
        DeclKind::Enum(e) => {
            for enumerant in &mut e.enumerants {
                if let Some(a) = &mut enumerant.annotation {
                    walk_annotation(a, v)?;
                }
            }
        }
        DeclKind::Const(c) => {
            walk_type(&mut c.ty, v)?;
            walk_value(&mut c.value, v)?;
        }
        DeclKind::Annotation(a) => {
            if let Some(ty) = &mut a.arg_type {
                walk_type(ty, v)?;
            }
        }
    }
    Ok(())
}

fn walk_composite(c: &mut Composite, v: &mut impl SlotVisit) -> Result<()> {
    for using in &mut c.usings {
        walk_type(&mut using.target, v)?;
    }
    Ok(())
}

fn walk_field(field: &mut Field, v: &mut impl SlotVisit) -> Result<()> {
    walk_type(&mut field.ty, v)?;
    if let Some(default) = &mut field.default {
        walk_value(default, v)?;
    }
    if let Some(a) = &mut field.annotation {
        walk_annotation(a, v)?;
    }
    Ok(())
}

fn walk_method(method: &mut Method, v: &mut impl SlotVisit) -> Result<()> {
    walk_param_list(&mut method.args, v)?;
    walk_param_list(&mut method.ret, v)?;
    if let Some(a) = &mut method.annotation {
        walk_annotation(a, v)?;
    }
    Ok(())
}

fn walk_param_list(params: &mut ParamList, v: &mut impl SlotVisit) -> Result<()> {
    match params {
        ParamList::Params(list) => {
            for p in list {
                walk_parameter(p, v)?;
            }
            Ok(())
        }
        ParamList::Type(ty) => walk_type(ty, v),
    }
}

fn walk_parameter(param: &mut Parameter, v: &mut impl SlotVisit) -> Result<()> {
    walk_type(&mut param.ty, v)?;
    if let Some(default) = &mut param.default {
        walk_value(default, v)?;
    }
    if let Some(a) = &mut param.annotation {
        walk_annotation(a, v)?;
    }
    Ok(())
}

/// Walks a type slot: children first, then the callback on the node itself.
pub fn walk_type(ty: &mut Type, v: &mut impl SlotVisit) -> Result<()> {
    match ty {
        Type::List(inner) => walk_type(inner, v)?,
        Type::Union(u) => {
            for field in &mut u.fields {
                walk_field(field, v)?;
            }
            for a in &mut u.annotations {
                walk_annotation(a, v)?;
            }
        }
        Type::Group(g) => {
            for field in &mut g.fields {
                walk_field(field, v)?;
            }
        }
        Type::Bound(b) => walk_bound(b, v)?,
        // Import inner references are resolved against the imported module by
        // the import pass itself, not by scope search here.
        Type::Primitive(_)
        | Type::Reference(_)
        | Type::Import { .. }
        | Type::Decl(_)
        | Type::GenericParameter(_) => {}
    }
    v.visit_type(ty)
}

fn walk_bound(bound: &mut BoundGenericType, v: &mut impl SlotVisit) -> Result<()> {
    for arg in &mut bound.args {
        walk_type(arg, v)?;
    }
    if let Some(parent) = &mut bound.parent {
        walk_bound(parent, v)?;
    }
    Ok(())
}

/// Walks a value slot: children first, then the callback on the node itself.
pub fn walk_value(value: &mut Value, v: &mut impl SlotVisit) -> Result<()> {
    match value {
        Value::List(items) => {
            for item in items {
                walk_value(item, v)?;
            }
        }
        Value::Struct(fields) => {
            for item in fields.values_mut() {
                walk_value(item, v)?;
            }
        }
        Value::Union { value: inner, .. } => walk_value(inner, v)?,
        Value::Unresolved { ty: Some(ty), .. } => walk_type(ty, v)?,
        _ => {}
    }
    v.visit_value(value)
}

fn walk_annotation(a: &mut Annotation, v: &mut impl SlotVisit) -> Result<()> {
    v.visit_annotation(a)?;
    walk_type(&mut a.decl, v)?;
    if let Some(arg) = &mut a.argument {
        walk_value(arg, v)?;
    }
    Ok(())
}

struct TypeSlots<F>(F);

impl<F: FnMut(&mut Type) -> Result<()>> SlotVisit for TypeSlots<F> {
    fn visit_type(&mut self, ty: &mut Type) -> Result<()> {
        (self.0)(ty)
    }
}

struct ValueSlots<F>(F);

impl<F: FnMut(&mut Value) -> Result<()>> SlotVisit for ValueSlots<F> {
    fn visit_value(&mut self, value: &mut Value) -> Result<()> {
        (self.0)(value)
    }
}

struct AnnotationSlots<F>(F);

impl<F: FnMut(&mut Annotation) -> Result<()>> SlotVisit for AnnotationSlots<F> {
    fn visit_annotation(&mut self, a: &mut Annotation) -> Result<()> {
        (self.0)(a)
    }
}

/// Applies `f` to every type slot of the declaration.
pub fn rewrite_types(
    kind: &mut DeclKind,
    annotations: &mut [Annotation],
    f: impl FnMut(&mut Type) -> Result<()>,
) -> Result<()> {
    walk_decl(kind, annotations, &mut TypeSlots(f))
}

/// Applies `f` to every value slot of the declaration, children first.
pub fn rewrite_values(
    kind: &mut DeclKind,
    annotations: &mut [Annotation],
    f: impl FnMut(&mut Value) -> Result<()>,
) -> Result<()> {
    walk_decl(kind, annotations, &mut ValueSlots(f))
}

/// Applies `f` to every applied annotation of the declaration.
pub fn rewrite_annotations(
    kind: &mut DeclKind,
    annotations: &mut [Annotation],
    f: impl FnMut(&mut Annotation) -> Result<()>,
) -> Result<()> {
    walk_decl(kind, annotations, &mut AnnotationSlots(f))
}
