//! The schema data model: a declaration arena plus type and value sum types.
//!
//! # Design
//!
//! Declarations (modules, structs, interfaces, enums, consts, annotation
//! declarations) live in a single [`Schema`] arena and reference each other
//! through [`DeclId`] indices. The lexical `scope` relation is a parent index,
//! never an owning reference, so the scope tree stays cycle-free under
//! ownership while still supporting outward name lookup.
//!
//! [`Type`] and [`Value`] are closed sum types. Two variants of each are
//! transient: `Type::Reference` / `Type::Import` and `Value::ConstRef` /
//! `Value::Unresolved` exist only between parsing and the end of the
//! resolution pipeline; validation hard-fails on any survivor.
//!
//! Traversal is closure-based (see [`walk`]) rather than a visitor trait:
//! every pass needs the same slot enumeration, and exhaustive matching on the
//! sum types lets the compiler police completeness.

pub mod decl;
pub mod types;
pub mod value;
pub mod walk;

pub use decl::{
    Annotation, AnnotationDecl, AnnotationTarget, Composite, ConstDecl, Decl, DeclId, DeclKind,
    EnumDecl, Enumerant, Field, InterfaceDecl, Method, ModuleDecl, ParamList, Parameter, Schema,
    StructDecl, Using,
};
pub use types::{BoundGenericType, GenericParameter, GroupType, Primitive, Type, UnionType};
pub use value::Value;
