//! Declarations and the arena they live in.

use crate::ast::types::Type;
use crate::ast::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generated and explicit declaration ids live in disjoint numeric ranges:
/// every generated id has this bit forced on, and explicit ids below it are
/// rejected by the parser.
pub const MIN_UID: u64 = 1 << 63;

/// Index of a declaration in a [`Schema`] arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DeclId(u32);

impl DeclId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The declaration arena for one compilation.
///
/// The root module is the first declaration parsed. Imported modules are
/// appended to the same arena, so a resolved `Type::Decl` can point into any
/// module loaded during the compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    decls: Vec<Decl>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// The root module: the first declaration ever parsed into this arena.
    pub fn root(&self) -> DeclId {
        debug_assert!(!self.decls.is_empty());
        DeclId(0)
    }

    pub fn alloc(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = DeclId> {
        (0..self.decls.len() as u32).map(DeclId)
    }

    /// The module at the root of `id`'s scope chain.
    pub fn module_of(&self, id: DeclId) -> DeclId {
        let mut cur = id;
        while let Some(parent) = self.decl(cur).scope {
            cur = parent;
        }
        cur
    }

    /// All declarations belonging to `module`, in arena (parse) order.
    /// Parents always precede their children.
    pub fn module_decls(&self, module: DeclId) -> Vec<DeclId> {
        self.iter_ids()
            .filter(|&id| self.module_of(id) == module)
            .collect()
    }
}

/// One named declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decl {
    /// Declaration name; empty for modules, which are anonymous.
    pub name: String,
    /// 64-bit identifier. Mandatory in source for modules; derived during
    /// resolution for structs, interfaces, enums, and annotation declarations
    /// when not written explicitly.
    pub id: Option<u64>,
    /// Enclosing lexical scope (parent index). `None` only for modules.
    pub scope: Option<DeclId>,
    /// Annotations applied to this declaration.
    pub annotations: Vec<Annotation>,
    pub kind: DeclKind,
}

impl Decl {
    /// Nested-declaration lists, for the kinds that introduce a scope.
    pub fn composite(&self) -> Option<&Composite> {
        match &self.kind {
            DeclKind::Module(m) => Some(&m.nested),
            DeclKind::Struct(s) => Some(&s.nested),
            DeclKind::Interface(i) => Some(&i.nested),
            _ => None,
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self.kind, DeclKind::Module(_))
    }

    /// Kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            DeclKind::Module(_) => "module",
            DeclKind::Struct(_) => "struct",
            DeclKind::Interface(_) => "interface",
            DeclKind::Enum(_) => "enum",
            DeclKind::Const(_) => "const",
            DeclKind::Annotation(_) => "annotation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DeclKind {
    Module(ModuleDecl),
    Struct(StructDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    Const(ConstDecl),
    Annotation(AnnotationDecl),
}

/// Nested declarations and scope-local state shared by modules, structs, and
/// interfaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Composite {
    pub structs: Vec<DeclId>,
    pub interfaces: Vec<DeclId>,
    pub enums: Vec<DeclId>,
    pub consts: Vec<DeclId>,
    pub annotation_defs: Vec<DeclId>,
    pub usings: Vec<Using>,
    /// Generic parameter names, in declaration order.
    pub type_params: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleDecl {
    pub nested: Composite,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructDecl {
    pub nested: Composite,
    pub fields: Vec<Field>,
}

impl StructDecl {
    /// Looks up a field's type by name, including fields nested one level
    /// inside anonymous unions (their names share the struct's namespace).
    pub fn field_type(&self, name: &str) -> Option<&Type> {
        for field in &self.fields {
            match &field.name {
                Some(n) if n == name => return Some(&field.ty),
                Some(_) => {}
                None => {
                    if let Type::Union(u) = &field.ty {
                        for member in &u.fields {
                            if member.name.as_deref() == Some(name) {
                                return Some(&member.ty);
                            }
                        }
                    }
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub nested: Composite,
    pub methods: Vec<Method>,
    /// Base interfaces from the `extends (...)` clause.
    pub extends: Vec<Type>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumDecl {
    pub enumerants: Vec<Enumerant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstDecl {
    pub ty: Type,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDecl {
    /// Declaration kinds this annotation may be applied to.
    pub targets: Vec<AnnotationTarget>,
    /// Argument type; `None` means the annotation takes no argument.
    pub arg_type: Option<Type>,
}

/// `using` alias. `name` is `None` for the bare `using import "f";` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Using {
    pub name: Option<String>,
    pub target: Type,
}

/// A struct or union member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// `None` for an anonymous union member slot.
    pub name: Option<String>,
    /// Ordinal; absent for anonymous unions and groups, which are not numbered.
    pub number: Option<u32>,
    pub ty: Type,
    pub default: Option<Value>,
    pub annotation: Option<Annotation>,
}

/// An interface method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub number: u32,
    pub args: ParamList,
    /// Result shape; defaults to `Void` when no `->` clause is written.
    pub ret: ParamList,
    pub annotation: Option<Annotation>,
}

/// Either an explicit parameter list or a single struct-typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamList {
    Params(Vec<Parameter>),
    Type(Type),
}

/// A method parameter. No capitalization rule applies to parameter names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub default: Option<Value>,
    pub annotation: Option<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumerant {
    pub name: String,
    pub number: u32,
    pub annotation: Option<Annotation>,
}

/// An applied annotation: `$name` or `$name(argument)`.
///
/// `decl` starts as a `Type::Reference` and resolves to the annotation
/// declaration (possibly through a generic binding).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub decl: Type,
    pub argument: Option<Value>,
}

/// Declaration kinds an annotation declaration may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationTarget {
    File,
    Struct,
    Field,
    Union,
    Enumerant,
    Enum,
    Method,
    Param,
    Annotation,
    Const,
    Interface,
    Group,
    Any,
}

impl AnnotationTarget {
    /// Target keywords as written in an annotation declaration's target list.
    pub const KEYWORDS: &'static [(&'static str, AnnotationTarget)] = &[
        ("file", AnnotationTarget::File),
        ("struct", AnnotationTarget::Struct),
        ("field", AnnotationTarget::Field),
        ("union", AnnotationTarget::Union),
        ("enumerant", AnnotationTarget::Enumerant),
        ("enum", AnnotationTarget::Enum),
        ("method", AnnotationTarget::Method),
        ("param", AnnotationTarget::Param),
        ("annotation", AnnotationTarget::Annotation),
        ("const", AnnotationTarget::Const),
        ("interface", AnnotationTarget::Interface),
        ("group", AnnotationTarget::Group),
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            AnnotationTarget::Any => "*",
            other => Self::KEYWORDS
                .iter()
                .find(|(_, t)| *t == other)
                .map(|(k, _)| *k)
                .unwrap_or("*"),
        }
    }
}

impl fmt::Display for AnnotationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}
