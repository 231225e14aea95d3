//! Schema values: constants, defaults, and annotation arguments.

use crate::ast::types::Type;
use crate::foundation::FullName;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully- or not-yet-resolved value.
///
/// `ConstRef` and `Unresolved` are transient: the former names another
/// constant and is substituted by the constant-reference pass, the latter
/// holds raw literal text captured before its type was known and is re-parsed
/// by the default-value pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Void,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Text(String),
    Data(Vec<u8>),
    List(Vec<Value>),
    Enumerant { name: String, number: u32 },
    /// Struct literal: field name to value, in source order.
    Struct(IndexMap<String, Value>),
    /// Union literal: exactly one member set.
    Union { field: String, value: Box<Value> },
    /// Reference to another constant, resolved by substitution.
    ConstRef(FullName),
    /// Raw literal text deferred until the target type is known.
    Unresolved {
        /// Expected type, when partially known (a reference to be resolved);
        /// `None` for annotation arguments whose declaration is still unbound.
        ty: Option<Type>,
        raw: String,
        /// Byte position of the literal in its original source, for diagnostics.
        pos: usize,
    },
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt8(v) => write!(f, "{v}"),
            Value::UInt16(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Data(bytes) => {
                write!(f, "0x\"")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                write!(f, "\"")
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Enumerant { name, .. } => write!(f, "{name}"),
            Value::Struct(fields) => {
                write!(f, "(")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name} = {value}")?;
                }
                write!(f, ")")
            }
            Value::Union { field, value } => write!(f, "({field} = {value})"),
            Value::ConstRef(name) => write!(f, "const ref {name}"),
            Value::Unresolved { raw, .. } => write!(f, "unresolved {raw:?}"),
        }
    }
}
