//! # Tessera IDL
//!
//! Compiler front-end for the Tessera interface definition language: a
//! lexerless recursive-descent parser plus a multi-pass resolution pipeline
//! that turns source text into a fully bound [`Schema`].
//!
//! ## Architecture
//!
//! ```text
//! foundation  - names, source locations
//! ast         - declaration arena, types, values, slot walker
//! parser      - character-level scanner + declaration/value grammars
//! resolve     - ids, imports, names, values, consts, validate
//! compile     - high-level API
//! ```
//!
//! Parsing defers everything it cannot decide locally: type names become
//! [`Type::Reference`], imports become [`Type::Import`], and literals whose
//! type is not yet known are captured as raw text in [`Value::Unresolved`].
//! The resolution passes then rewrite those placeholders in place until none
//! remain; validation guarantees it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tessera_idl::compile_source;
//!
//! let schema = compile_source(source, &mut |file| std::fs::read_to_string(file).ok())?;
//! ```

pub mod ast;
pub mod compile;
pub mod error;
pub mod foundation;
pub mod parser;
pub mod resolve;

pub use ast::decl::{
    Annotation, AnnotationDecl, AnnotationTarget, Composite, ConstDecl, Decl, DeclId, DeclKind,
    EnumDecl, Enumerant, Field, InterfaceDecl, Method, ModuleDecl, ParamList, Parameter, Schema,
    StructDecl, Using, MIN_UID,
};
pub use ast::types::{BoundGenericType, GenericParameter, GroupType, Primitive, Type, UnionType};
pub use ast::value::Value;
pub use compile::{
    compile_source, deserialize_schema, parse_value, process_parsed_source, serialize_schema,
};
pub use error::{Error, ErrorKind, Result};
pub use foundation::{FullName, NamePart, SourceLoc};
pub use parser::Parser;

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
