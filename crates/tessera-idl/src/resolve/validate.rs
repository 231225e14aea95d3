//! Structural validation of a resolved module.
//!
//! Transient nodes surviving the pipeline are internal errors; missing ids,
//! annotation-target mismatches, and ordinal holes are user schema errors.

use crate::ast::decl::{
    Annotation, AnnotationTarget, Decl, DeclId, DeclKind, Field, ParamList, Schema,
};
use crate::ast::types::Type;
use crate::ast::value::Value;
use crate::ast::walk;
use crate::error::{Error, Result};

pub fn validate(schema: &Schema, module: DeclId) -> Result<()> {
    for id in schema.module_decls(module) {
        let decl = schema.decl(id);
        check_no_transients(decl)?;
        check_id_present(decl)?;
        check_annotations(schema, decl)?;
        check_ordinals(decl)?;
    }
    Ok(())
}

/// Any `Reference`, `Import`, `Unresolved`, or `ConstRef` surviving to this
/// point is a pipeline bug, not a schema error.
fn check_no_transients(decl: &Decl) -> Result<()> {
    let mut kind = decl.kind.clone();
    let mut annotations = decl.annotations.clone();
    walk::rewrite_types(&mut kind, &mut annotations, |ty| match ty {
        Type::Reference(name) => Err(Error::internal(format!(
            "unexpected unresolved reference '{name}'"
        ))),
        Type::Import { file, .. } => Err(Error::internal(format!(
            "unexpected remaining import \"{file}\""
        ))),
        _ => Ok(()),
    })?;
    walk::rewrite_values(&mut kind, &mut annotations, |value| match value {
        Value::Unresolved { raw, .. } => Err(Error::internal(format!(
            "unexpected unresolved default value '{raw}'"
        ))),
        Value::ConstRef(name) => Err(Error::internal(format!(
            "unexpected unresolved const reference '{name}'"
        ))),
        _ => Ok(()),
    })
}

fn check_id_present(decl: &Decl) -> Result<()> {
    let bears_id = matches!(
        decl.kind,
        DeclKind::Module(_)
            | DeclKind::Struct(_)
            | DeclKind::Interface(_)
            | DeclKind::Enum(_)
            | DeclKind::Annotation(_)
    );
    if bears_id && decl.id.is_none() {
        return Err(Error::validation(format!(
            "{} '{}' has no id after resolution",
            decl.kind_name(),
            decl.name
        )));
    }
    Ok(())
}

// ----- annotation targets -----

fn check_annotations(schema: &Schema, decl: &Decl) -> Result<()> {
    let own_target = match &decl.kind {
        DeclKind::Module(_) => AnnotationTarget::File,
        DeclKind::Struct(_) => AnnotationTarget::Struct,
        DeclKind::Interface(_) => AnnotationTarget::Interface,
        DeclKind::Enum(_) => AnnotationTarget::Enum,
        DeclKind::Const(_) => AnnotationTarget::Const,
        DeclKind::Annotation(_) => AnnotationTarget::Annotation,
    };
    for a in &decl.annotations {
        check_one_annotation(schema, a, own_target)?;
    }

    match &decl.kind {
        DeclKind::Struct(s) => check_field_annotations(schema, &s.fields)?,
        DeclKind::Interface(i) => {
            for method in &i.methods {
                if let Some(a) = &method.annotation {
                    check_one_annotation(schema, a, AnnotationTarget::Method)?;
                }
                check_param_annotations(schema, &method.args)?;
                check_param_annotations(schema, &method.ret)?;
            }
        }
        DeclKind::Enum(e) => {
            for enumerant in &e.enumerants {
                if let Some(a) = &enumerant.annotation {
                    check_one_annotation(schema, a, AnnotationTarget::Enumerant)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_field_annotations(schema: &Schema, fields: &[Field]) -> Result<()> {
    for field in fields {
        if let Some(a) = &field.annotation {
            let target = match &field.ty {
                Type::Union(_) => AnnotationTarget::Union,
                Type::Group(_) => AnnotationTarget::Group,
                _ => AnnotationTarget::Field,
            };
            check_one_annotation(schema, a, target)?;
        }
        match &field.ty {
            Type::Union(u) => {
                for a in &u.annotations {
                    check_one_annotation(schema, a, AnnotationTarget::Union)?;
                }
                check_field_annotations(schema, &u.fields)?;
            }
            Type::Group(g) => check_field_annotations(schema, &g.fields)?,
            _ => {}
        }
    }
    Ok(())
}

fn check_param_annotations(schema: &Schema, params: &ParamList) -> Result<()> {
    if let ParamList::Params(list) = params {
        for param in list {
            if let Some(a) = &param.annotation {
                check_one_annotation(schema, a, AnnotationTarget::Param)?;
            }
        }
    }
    Ok(())
}

fn check_one_annotation(schema: &Schema, a: &Annotation, target: AnnotationTarget) -> Result<()> {
    let decl_id = match &a.decl {
        Type::Decl(id) => *id,
        Type::Bound(b) => b.open,
        other => {
            return Err(Error::internal(format!(
                "annotation resolved to {}",
                other.describe()
            )))
        }
    };
    let decl = schema.decl(decl_id);
    let DeclKind::Annotation(annotation_decl) = &decl.kind else {
        return Err(Error::validation(format!(
            "'{}' is not an annotation",
            decl.name
        )));
    };
    let allowed = annotation_decl
        .targets
        .iter()
        .any(|t| *t == AnnotationTarget::Any || *t == target);
    if !allowed {
        return Err(Error::validation(format!(
            "annotation '{}' cannot be applied to a {}",
            decl.name, target
        )));
    }
    Ok(())
}

// ----- ordinal numbering -----

fn check_ordinals(decl: &Decl) -> Result<()> {
    match &decl.kind {
        DeclKind::Struct(s) => {
            let mut numbers = Vec::new();
            collect_field_numbers(&s.fields, &mut numbers);
            check_contiguous(numbers, "field", &decl.name)
        }
        DeclKind::Enum(e) => {
            let numbers = e.enumerants.iter().map(|en| en.number).collect();
            check_contiguous(numbers, "enumerant", &decl.name)
        }
        DeclKind::Interface(i) => {
            let numbers = i.methods.iter().map(|m| m.number).collect();
            check_contiguous(numbers, "method", &decl.name)
        }
        _ => Ok(()),
    }
}

/// Fields nested in inline unions and groups share their struct's ordinal
/// space; the anonymous union and group slots themselves are unnumbered.
fn collect_field_numbers(fields: &[Field], out: &mut Vec<u32>) {
    for field in fields {
        if let Some(number) = field.number {
            out.push(number);
        }
        match &field.ty {
            Type::Union(u) => collect_field_numbers(&u.fields, out),
            Type::Group(g) => collect_field_numbers(&g.fields, out),
            _ => {}
        }
    }
}

fn check_contiguous(mut numbers: Vec<u32>, what: &str, name: &str) -> Result<()> {
    numbers.sort_unstable();
    for (expected, number) in numbers.iter().enumerate() {
        if *number as usize != expected {
            return Err(Error::validation(format!(
                "{what} numbering of '{name}' contains holes or duplicates"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_numbering() {
        assert!(check_contiguous(vec![2, 0, 1], "field", "S").is_ok());
        let err = check_contiguous(vec![0, 2], "field", "S").unwrap_err();
        assert!(err.message.contains("numbering"));
        assert!(err.message.contains("holes"));
        assert!(check_contiguous(vec![0, 0], "field", "S").is_err());
        assert!(check_contiguous(Vec::new(), "field", "S").is_ok());
    }
}
