//! Type-directed literal parsing.
//!
//! Literals are parsed against their expected type. When the type is still an
//! unresolved reference (or unknown entirely, as for annotation arguments),
//! the literal's raw text is captured verbatim into [`Value::Unresolved`] and
//! re-parsed by the default-value pass once resolution has produced the real
//! type. These routines take the schema immutably, so they serve both the
//! initial parse and that later re-parse.

use crate::ast::decl::{DeclKind, EnumDecl, Schema, StructDecl};
use crate::ast::types::{BoundGenericType, Primitive, Type, UnionType};
use crate::ast::value::Value;
use crate::error::Result;
use crate::foundation::{is_capitalized, FullName, NamePart};
use crate::parser::scanner::Scanner;
use indexmap::IndexMap;

/// Parses a dotted name at the cursor.
///
/// Recognizes the leading-dot top-level constant form `.lowerName`, and
/// otherwise a dotted chain where every non-final segment is capitalized and
/// capitalized segments may carry parenthesized generic arguments. A
/// lowercase segment cannot introduce a scope, so it always ends the chain.
pub fn parse_full_name(sc: &mut Scanner) -> Result<FullName> {
    if sc.peek(".") {
        sc.advance_no_ws(".")?;
        let name = match sc.opt_advance_ident() {
            Some(name) => name,
            None => return Err(sc.error("Expected valid const ref.")),
        };
        return Ok(FullName::top_level_const(name));
    }

    let mut parts = Vec::new();
    loop {
        let name = sc.advance_ident()?;
        let capitalized = is_capitalized(name);

        let mut type_args = Vec::new();
        if capitalized && sc.opt_advance("(") {
            loop {
                type_args.push(parse_full_name(sc)?);
                if !sc.opt_advance(",") {
                    break;
                }
            }
            sc.advance(")")?;
        }

        parts.push(NamePart::with_args(name, type_args));
        if !capitalized || !sc.opt_advance(".") {
            break;
        }
    }
    Ok(FullName::new(parts))
}

/// Parses a default-value literal for `ty`, stripping any redundant wrapping
/// parentheses first. `None` means the expected type is wholly unknown; the
/// literal is captured raw.
pub fn parse_default_value(sc: &mut Scanner, schema: &Schema, ty: Option<&Type>) -> Result<Value> {
    let mut parens = 0;
    while sc.opt_advance("(") {
        parens += 1;
    }
    let result = parse_value_direct(sc, schema, ty)?;
    for _ in 0..parens {
        sc.advance(")")?;
    }
    Ok(result)
}

fn parse_value_direct(sc: &mut Scanner, schema: &Schema, ty: Option<&Type>) -> Result<Value> {
    let Some(ty) = ty else {
        return parse_unresolved(sc, schema, None);
    };

    match ty {
        Type::Primitive(p) => parse_primitive_value(sc, *p),
        Type::List(inner) => parse_list_value(sc, schema, inner),
        Type::Union(u) => parse_struct_or_union_value(sc, schema, StructShape::Union(u)),
        Type::Decl(id) => match &schema.decl(*id).kind {
            DeclKind::Enum(e) => parse_enum_value(sc, e),
            DeclKind::Struct(s) => {
                parse_struct_or_union_value(sc, schema, StructShape::Struct(s, None))
            }
            _ => Err(sc.error(format!(
                "cannot parse a default value for a {}",
                schema.decl(*id).kind_name()
            ))),
        },
        Type::Bound(b) => {
            let open = schema.decl(b.open);
            match &open.kind {
                DeclKind::Struct(s) => {
                    parse_struct_or_union_value(sc, schema, StructShape::Struct(s, Some(b)))
                }
                DeclKind::Enum(e) => parse_enum_value(sc, e),
                _ => Err(sc.error(format!(
                    "cannot parse a default value for a generic {}",
                    open.kind_name()
                ))),
            }
        }
        Type::Reference(_) => parse_unresolved(sc, schema, Some(ty)),
        Type::GenericParameter(p) => Err(sc.error(format!(
            "Cannot parse a default value for generic type parameter {}.",
            p.name
        ))),
        Type::Import { .. } | Type::Group(_) => Err(sc.error(format!(
            "cannot parse a default value for {}",
            ty.describe()
        ))),
    }
}

fn parse_unresolved(sc: &mut Scanner, schema: &Schema, ty: Option<&Type>) -> Result<Value> {
    let pos = sc.pos();
    let raw = parse_raw_value(sc, schema)?;
    Ok(Value::Unresolved {
        ty: ty.cloned(),
        raw,
        pos,
    })
}

fn parse_primitive_value(sc: &mut Scanner, primitive: Primitive) -> Result<Value> {
    if primitive.is_numeric() {
        return parse_numeric_value(sc, primitive);
    }
    match primitive {
        Primitive::Bool => {
            let name = parse_full_name(sc)?;
            if name.is_simple() {
                match name.first().name.as_str() {
                    "true" => return Ok(Value::Bool(true)),
                    "false" => return Ok(Value::Bool(false)),
                    _ => {}
                }
            }
            Ok(Value::ConstRef(name))
        }
        Primitive::Void => {
            let name = parse_full_name(sc)?;
            if name.is_simple() && name.first().name == "void" {
                return Ok(Value::Void);
            }
            Ok(Value::ConstRef(name))
        }
        Primitive::Text => {
            if sc.peek("\"") {
                return Ok(Value::Text(sc.parse_text()?));
            }
            Ok(Value::ConstRef(parse_full_name(sc)?))
        }
        Primitive::Data => {
            if sc.peek("0x\"") {
                return Ok(Value::Data(sc.parse_blob()?));
            }
            if sc.peek("\"") {
                // Text may be assigned to a data field as its UTF-8 bytes.
                return Ok(Value::Data(sc.parse_text()?.into_bytes()));
            }
            Ok(Value::ConstRef(parse_full_name(sc)?))
        }
        Primitive::AnyPointer => Err(sc.error("AnyPointer cannot have a default value.")),
        _ => Err(sc.error(format!(
            "cannot parse a default value for {}",
            primitive.keyword()
        ))),
    }
}

fn parse_numeric_value(sc: &mut Scanner, primitive: Primitive) -> Result<Value> {
    if sc.peek_number_start() {
        return Ok(match primitive {
            Primitive::Int8 => Value::Int8(sc.parse_i8()?),
            Primitive::Int16 => Value::Int16(sc.parse_i16()?),
            Primitive::Int32 => Value::Int32(sc.parse_i32()?),
            Primitive::Int64 => Value::Int64(sc.parse_i64()?),
            Primitive::UInt8 => Value::UInt8(sc.parse_u8()?),
            Primitive::UInt16 => Value::UInt16(sc.parse_u16()?),
            Primitive::UInt32 => Value::UInt32(sc.parse_u32()?),
            Primitive::UInt64 => Value::UInt64(sc.parse_u64()?),
            Primitive::Float32 => Value::Float32(sc.parse_f32()?),
            Primitive::Float64 => Value::Float64(sc.parse_f64()?),
            _ => unreachable!("is_numeric covers exactly these"),
        });
    }

    // Not a digit: inf/nan for floats, otherwise a constant reference.
    let name = parse_full_name(sc)?;
    if name.is_simple() {
        match name.first().name.as_str() {
            "inf" => {
                return match primitive {
                    Primitive::Float32 => Ok(Value::Float32(f32::INFINITY)),
                    Primitive::Float64 => Ok(Value::Float64(f64::INFINITY)),
                    _ => Err(sc.error("Unexpected token 'inf'.")),
                }
            }
            "nan" => {
                return match primitive {
                    Primitive::Float32 => Ok(Value::Float32(f32::NAN)),
                    Primitive::Float64 => Ok(Value::Float64(f64::NAN)),
                    _ => Err(sc.error("Unexpected token 'nan'.")),
                }
            }
            _ => {}
        }
    }
    if !name.could_be_const_ref() {
        return Err(sc.error("Invalid const reference"));
    }
    Ok(Value::ConstRef(name))
}

fn parse_list_value(sc: &mut Scanner, schema: &Schema, element: &Type) -> Result<Value> {
    if !sc.opt_advance("[") {
        return Ok(Value::ConstRef(parse_full_name(sc)?));
    }
    let mut values = Vec::new();
    loop {
        // The terminator check inspects the raw cursor character; an open
        // bracket at end of input must not run past the buffer.
        match sc.peek_char() {
            None => return Err(sc.error("Expected ']'.")),
            Some(']') => break,
            Some(_) => {}
        }
        values.push(parse_default_value(sc, schema, Some(element))?);
        if !sc.opt_advance(",") {
            break;
        }
    }
    sc.advance("]")?;
    Ok(Value::List(values))
}

fn parse_enum_value(sc: &mut Scanner, decl: &EnumDecl) -> Result<Value> {
    let name = parse_full_name(sc)?;
    if name.could_be_const_ref() {
        return Ok(Value::ConstRef(name));
    }
    if !name.is_simple() {
        return Err(sc.error("Invalid enumerant name."));
    }
    let token = &name.first().name;
    if is_capitalized(token) {
        return Err(sc.error("Invalid enumerant: must start with lower case"));
    }
    let enumerant = decl
        .enumerants
        .iter()
        .find(|e| &e.name == token)
        .ok_or_else(|| sc.error(format!("Unknown enumerant '{token}'.")))?;
    Ok(Value::Enumerant {
        name: token.clone(),
        number: enumerant.number,
    })
}

#[derive(Clone, Copy)]
enum StructShape<'a> {
    Struct(&'a StructDecl, Option<&'a BoundGenericType>),
    Union(&'a UnionType),
}

/// Parses `name = value` pairs for a struct or union literal (the wrapping
/// parentheses were consumed by paren stripping). The first name may instead
/// be a fully qualified constant reference, replacing the whole literal.
fn parse_struct_or_union_value(
    sc: &mut Scanner,
    schema: &Schema,
    shape: StructShape<'_>,
) -> Result<Value> {
    let mut fields = IndexMap::new();
    let mut can_be_const_ref = true;
    loop {
        let name = parse_full_name(sc)?;

        // A const ref always contains a period or the leading-dot form.
        if name.could_be_const_ref() {
            if can_be_const_ref {
                return Ok(Value::ConstRef(name));
            }
            return Err(sc.error("invalid field name"));
        }
        if !name.is_simple() || is_capitalized(&name.first().name) {
            return Err(sc.error("Field name in default value must start with a lower case letter."));
        }
        let field_name = name.first().name.clone();
        can_be_const_ref = false;

        sc.advance("=")?;

        match shape {
            StructShape::Union(u) => {
                // Same syntax as a struct literal, but exactly one member.
                let member = u
                    .fields
                    .iter()
                    .find(|f| f.name.as_deref() == Some(field_name.as_str()))
                    .ok_or_else(|| {
                        sc.error(format!("Unknown field '{field_name}' in default value."))
                    })?;
                let value = parse_default_value(sc, schema, Some(&member.ty))?;
                return Ok(Value::Union {
                    field: field_name,
                    value: Box::new(value),
                });
            }
            StructShape::Struct(decl, generic) => {
                let mut field_ty = decl
                    .field_type(&field_name)
                    .ok_or_else(|| {
                        sc.error(format!("Unknown field '{field_name}' in default value."))
                    })?
                    .clone();

                if let Some(generic) = generic {
                    if let Type::GenericParameter(p) = &field_ty {
                        field_ty = generic.resolve_generic_parameter(p).ok_or_else(|| {
                            sc.error(format!(
                                "Cannot parse a default value for generic type parameter {}.",
                                p.name
                            ))
                        })?;
                    }
                    // The field type comes from the open declaration; close
                    // any remaining parameters against our own binding. The
                    // result need not end up fully closed if the value never
                    // touches the open parts.
                    if let Type::Bound(b) = &field_ty {
                        if !b.is_fully_closed() {
                            field_ty = Type::Bound(Box::new(b.close_with(generic)));
                        }
                    }
                }

                let value = parse_default_value(sc, schema, Some(&field_ty))?;
                fields.insert(field_name, value);
            }
        }

        if !sc.opt_advance(",") {
            break;
        }
    }
    Ok(Value::Struct(fields))
}

/// Consumes one literal of unknown type, returning its text for later
/// re-parsing. Quote-, bracket-, and parenthesis-aware: the captured span is
/// always a complete balanced literal.
fn parse_raw_value(sc: &mut Scanner, schema: &Schema) -> Result<String> {
    let start = sc.pos();

    if sc.peek("[") {
        sc.advance("[")?;
        while !sc.peek("]") {
            parse_default_value(sc, schema, None)?;
            if !sc.opt_advance(",") {
                break;
            }
        }
        sc.advance("]")?;
    } else if sc.peek("0x\"") {
        sc.parse_blob()?;
    } else if sc.peek("\"") {
        sc.parse_text()?;
    } else if sc.peek_number_start() {
        let negate = sc.opt_advance("-");
        if sc.opt_advance("inf") {
            return Ok(if negate { "-inf" } else { "inf" }.to_string());
        }
        if sc.opt_advance("nan") {
            if negate {
                return Err(sc.error("cannot negate nan"));
            }
            return Ok("nan".to_string());
        }
        sc.advance_raw_number()?;
    } else {
        let name = parse_full_name(sc)?;

        // If this turns out not to be a const ref it will fail later.
        if name.could_be_const_ref() {
            return Ok(name.to_string());
        }
        if !name.is_simple() {
            return Err(sc.error("Invalid fully qualified name at this location."));
        }
        let simple = name.first().name.clone();
        if simple == "true" || simple == "false" || simple == "inf" {
            return Ok(simple);
        }

        // A bare name is an enumerant; `name = value` starts a struct shape.
        if sc.opt_advance("=") {
            parse_default_value(sc, schema, None)?;
            while sc.opt_advance(",") {
                sc.advance_ident()?;
                sc.advance("=")?;
                parse_default_value(sc, schema, None)?;
            }
        } else {
            return Ok(simple);
        }
    }

    Ok(sc.source()[start..sc.pos()].trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str, ty: &Type) -> Result<Value> {
        let schema = Schema::new();
        let mut sc = Scanner::new(src);
        parse_default_value(&mut sc, &schema, Some(ty))
    }

    #[test]
    fn full_name_forms() {
        let mut sc = Scanner::new("Outer(Text).Inner.someConst rest");
        let name = parse_full_name(&mut sc).unwrap();
        assert_eq!(name.to_string(), "Outer(Text).Inner.someConst");
        assert!(sc.peek("rest"));

        let mut sc = Scanner::new(".kMax");
        let name = parse_full_name(&mut sc).unwrap();
        assert!(name.is_top_level_const());
    }

    #[test]
    fn lowercase_segment_ends_the_chain() {
        // `foo.bar` parses as just `foo`; the dot is left for the caller.
        let mut sc = Scanner::new("foo.bar");
        let name = parse_full_name(&mut sc).unwrap();
        assert_eq!(name.to_string(), "foo");
        assert!(sc.peek("."));
    }

    #[test]
    fn typed_primitive_literals() {
        assert_eq!(parse("true", &Type::Primitive(Primitive::Bool)).unwrap(), Value::Bool(true));
        assert_eq!(parse("-7", &Type::Primitive(Primitive::Int16)).unwrap(), Value::Int16(-7));
        assert_eq!(parse("void", &Type::VOID).unwrap(), Value::Void);
        assert_eq!(
            parse("\"hi\"", &Type::Primitive(Primitive::Text)).unwrap(),
            Value::Text("hi".to_string())
        );
        assert_eq!(
            parse("\"hi\"", &Type::Primitive(Primitive::Data)).unwrap(),
            Value::Data(b"hi".to_vec())
        );
    }

    #[test]
    fn parenthesized_literal_is_stripped() {
        assert_eq!(
            parse("((42))", &Type::Primitive(Primitive::UInt8)).unwrap(),
            Value::UInt8(42)
        );
    }

    #[test]
    fn list_literal_and_eof_guard() {
        let ty = Type::List(Box::new(Type::Primitive(Primitive::Int32)));
        assert_eq!(
            parse("[1, 2, 3]", &ty).unwrap(),
            Value::List(vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)])
        );
        assert!(parse("[1, 2", &ty).is_err());
    }

    #[test]
    fn numeric_const_ref() {
        let v = parse(".kMax", &Type::Primitive(Primitive::Int32)).unwrap();
        assert_eq!(v, Value::ConstRef(FullName::top_level_const("kMax")));
        // A bare lowercase name is not a valid const ref for a numeric type.
        assert!(parse("loose", &Type::Primitive(Primitive::Int32)).is_err());
    }

    #[test]
    fn unknown_type_captures_raw_text() {
        let schema = Schema::new();
        let mut sc = Scanner::new("(x = 1, y = \"a, b\")");
        let v = parse_default_value(&mut sc, &schema, None).unwrap();
        match v {
            Value::Unresolved { ty: None, raw, .. } => assert_eq!(raw, "x = 1, y = \"a, b\""),
            other => panic!("expected unresolved capture, got {other}"),
        }
    }

    #[test]
    fn raw_capture_handles_special_tokens() {
        for (src, expected) in [("-inf", "-inf"), ("nan", "nan"), ("someEnumerant", "someEnumerant")] {
            let schema = Schema::new();
            let mut sc = Scanner::new(src);
            match parse_default_value(&mut sc, &schema, None).unwrap() {
                Value::Unresolved { raw, .. } => assert_eq!(raw, expected),
                other => panic!("expected unresolved capture, got {other}"),
            }
        }
    }
}
