//! The type sum-type and generic-binding machinery.

use crate::ast::decl::{Annotation, DeclId, Field};
use crate::foundation::FullName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of built-in types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    AnyPointer,
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Text,
    Data,
}

impl Primitive {
    /// Source keyword for this primitive.
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::AnyPointer => "AnyPointer",
            Primitive::Void => "Void",
            Primitive::Bool => "Bool",
            Primitive::Int8 => "Int8",
            Primitive::Int16 => "Int16",
            Primitive::Int32 => "Int32",
            Primitive::Int64 => "Int64",
            Primitive::UInt8 => "UInt8",
            Primitive::UInt16 => "UInt16",
            Primitive::UInt32 => "UInt32",
            Primitive::UInt64 => "UInt64",
            Primitive::Float32 => "Float32",
            Primitive::Float64 => "Float64",
            Primitive::Text => "Text",
            Primitive::Data => "Data",
        }
    }

    /// Parses a primitive keyword, if `name` is one.
    pub fn from_keyword(name: &str) -> Option<Self> {
        Some(match name {
            "AnyPointer" => Primitive::AnyPointer,
            "Void" => Primitive::Void,
            "Bool" => Primitive::Bool,
            "Int8" => Primitive::Int8,
            "Int16" => Primitive::Int16,
            "Int32" => Primitive::Int32,
            "Int64" => Primitive::Int64,
            "UInt8" => Primitive::UInt8,
            "UInt16" => Primitive::UInt16,
            "UInt32" => Primitive::UInt32,
            "UInt64" => Primitive::UInt64,
            "Float32" => Primitive::Float32,
            "Float64" => Primitive::Float64,
            "Text" => Primitive::Text,
            "Data" => Primitive::Data,
            _ => return None,
        })
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Primitive::Int8
                | Primitive::Int16
                | Primitive::Int32
                | Primitive::Int64
                | Primitive::UInt8
                | Primitive::UInt16
                | Primitive::UInt32
                | Primitive::UInt64
                | Primitive::Float32
                | Primitive::Float64
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// An anonymous union: member fields are mutually exclusive at runtime.
///
/// Exclusivity is represented, not enforced here; consumers of the resolved
/// schema must treat union fields as one-of.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnionType {
    pub fields: Vec<Field>,
    pub annotations: Vec<Annotation>,
}

/// A group: a named bag of fields with no exclusivity semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupType {
    pub fields: Vec<Field>,
}

/// A generic type parameter, meaningful only relative to its declaring scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericParameter {
    /// The composite declaration whose parameter list declares this parameter.
    pub owner: DeclId,
    /// Position within the owner's parameter list.
    pub index: u32,
    pub name: String,
}

/// A generic declaration paired with actual type arguments.
///
/// `parent` binds the enclosing generic scope for nested generics, so a
/// member of `Outer(Text)` that mentions `Outer`'s parameter can still be
/// closed. `args` may be empty, which leaves the type open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundGenericType {
    /// The open (generic) declaration being instantiated.
    pub open: DeclId,
    /// Actual type arguments, parallel to the open declaration's parameters.
    pub args: Vec<Type>,
    /// Binding for the enclosing generic scope, when nested.
    pub parent: Option<Box<BoundGenericType>>,
}

impl BoundGenericType {
    /// A binding is fully closed when no argument, through the whole parent
    /// chain, is still a generic parameter.
    pub fn is_fully_closed(&self) -> bool {
        self.args.iter().all(|a| match a {
            Type::GenericParameter(_) => false,
            Type::Bound(b) => b.is_fully_closed(),
            _ => true,
        }) && self.parent.as_ref().is_none_or(|p| p.is_fully_closed())
    }

    /// Looks up the actual type bound to `param`, searching this binding and
    /// then the parent chain. Returns `None` when the owning declaration was
    /// left open (no arguments given) or the parameter belongs elsewhere.
    pub fn resolve_generic_parameter(&self, param: &GenericParameter) -> Option<Type> {
        if param.owner == self.open {
            return self.args.get(param.index as usize).cloned();
        }
        self.parent
            .as_ref()
            .and_then(|p| p.resolve_generic_parameter(param))
    }

    /// Produces a new binding with any remaining generic parameters replaced
    /// by their bindings in `outer`. Arguments `outer` cannot resolve are
    /// kept; the result may still be open.
    pub fn close_with(&self, outer: &BoundGenericType) -> BoundGenericType {
        let args = self
            .args
            .iter()
            .map(|a| match a {
                Type::GenericParameter(p) => {
                    outer.resolve_generic_parameter(p).unwrap_or_else(|| a.clone())
                }
                Type::Bound(b) => Type::Bound(Box::new(b.close_with(outer))),
                other => other.clone(),
            })
            .collect();
        BoundGenericType {
            open: self.open,
            args,
            parent: self.parent.as_ref().map(|p| Box::new(p.close_with(outer))),
        }
    }
}

/// A schema type.
///
/// `Reference` and `Import` are produced by the parser and must not survive
/// the resolution pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Primitive(Primitive),
    /// `List(T)`
    List(Box<Type>),
    /// Unresolved dotted name, replaced in place by reference resolution.
    Reference(FullName),
    /// `import "file"` or `import "file".Name`, replaced by import resolution.
    Import {
        file: String,
        inner: Option<Box<Type>>,
    },
    /// A resolved declaration: struct, interface, enum, const, annotation, or module.
    Decl(DeclId),
    /// Inline anonymous union.
    Union(UnionType),
    /// Inline group.
    Group(GroupType),
    GenericParameter(GenericParameter),
    /// A (possibly partially) closed generic type.
    Bound(Box<BoundGenericType>),
}

impl Type {
    pub const VOID: Type = Type::Primitive(Primitive::Void);

    pub fn is_union_or_group(&self) -> bool {
        matches!(self, Type::Union(_) | Type::Group(_))
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Type::Primitive(p) => p.keyword().to_string(),
            Type::List(inner) => format!("List({})", inner.describe()),
            Type::Reference(name) => format!("reference to {name}"),
            Type::Import { file, .. } => format!("import \"{file}\""),
            Type::Decl(id) => format!("declaration #{}", id.index()),
            Type::Union(_) => "union".to_string(),
            Type::Group(_) => "group".to_string(),
            Type::GenericParameter(p) => format!("generic parameter {}", p.name),
            Type::Bound(b) => format!("bound generic #{}", b.open.index()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(owner: u32, index: u32, name: &str) -> GenericParameter {
        GenericParameter {
            owner: DeclId::new(owner),
            index,
            name: name.to_string(),
        }
    }

    #[test]
    fn bound_type_closure() {
        // Foo(T) at decl 1; Bar(U) nested at decl 2 with parent binding Foo(Int32).
        let foo_closed = BoundGenericType {
            open: DeclId::new(1),
            args: vec![Type::Primitive(Primitive::Int32)],
            parent: None,
        };
        assert!(foo_closed.is_fully_closed());

        let t = param(1, 0, "T");
        assert_eq!(
            foo_closed.resolve_generic_parameter(&t),
            Some(Type::Primitive(Primitive::Int32))
        );

        // Bar bound with Foo's own parameter: open until closed against Foo(Int32).
        let bar_open = BoundGenericType {
            open: DeclId::new(2),
            args: vec![Type::GenericParameter(t.clone())],
            parent: None,
        };
        assert!(!bar_open.is_fully_closed());

        let bar_closed = bar_open.close_with(&foo_closed);
        assert!(bar_closed.is_fully_closed());
        assert_eq!(bar_closed.args[0], Type::Primitive(Primitive::Int32));
    }

    #[test]
    fn parameter_resolution_walks_parent_chain() {
        let outer = BoundGenericType {
            open: DeclId::new(1),
            args: vec![Type::Primitive(Primitive::Text)],
            parent: None,
        };
        let inner = BoundGenericType {
            open: DeclId::new(2),
            args: vec![],
            parent: Some(Box::new(outer)),
        };
        let t = param(1, 0, "T");
        assert_eq!(
            inner.resolve_generic_parameter(&t),
            Some(Type::Primitive(Primitive::Text))
        );
        // Unbound parameter of the inner (open) declaration.
        let u = param(2, 0, "U");
        assert_eq!(inner.resolve_generic_parameter(&u), None);
    }
}
