//! Recursive-descent declaration parsing.
//!
//! One [`DeclParser`] parses one module into the shared [`Schema`] arena.
//! Declarations come out of the parser unresolved: type positions hold
//! `Type::Reference` / `Type::Import` placeholders and deferred literals hold
//! `Value::Unresolved`; the resolve pipeline rewrites them in place.

use crate::ast::decl::{
    Annotation, AnnotationDecl, AnnotationTarget, Composite, ConstDecl, Decl, DeclId, DeclKind,
    EnumDecl, Enumerant, Field, InterfaceDecl, Method, ModuleDecl, ParamList, Parameter, Schema,
    StructDecl, Using, MIN_UID,
};
use crate::ast::types::{GroupType, Primitive, Type, UnionType};
use crate::ast::value::Value;
use crate::error::Result;
use crate::foundation::{is_capitalized, FullName};
use crate::parser::scanner::Scanner;
use crate::parser::value;

/// Parses one module's source text into `schema`, returning the module's
/// declaration id. The module and everything nested in it are appended to the
/// arena; parents precede their children in arena order.
pub fn parse_module(schema: &mut Schema, source: &str) -> Result<DeclId> {
    let module_id = schema.alloc(Decl {
        name: String::new(),
        id: None,
        scope: None,
        annotations: Vec::new(),
        kind: DeclKind::Module(ModuleDecl::default()),
    });

    let mut p = DeclParser {
        sc: Scanner::new(source),
        schema,
        scope: module_id,
    };
    p.sc.advance_whitespace();

    let mut file_id: Option<u64> = None;
    let mut annotations = Vec::new();
    let mut nested = Composite::default();

    loop {
        if let Some(token) = p.sc.opt_advance_ident() {
            match token {
                "struct" => nested.structs.push(p.parse_struct()?),
                "interface" => nested.interfaces.push(p.parse_interface()?),
                "enum" => nested.enums.push(p.parse_enum()?),
                "const" => nested.consts.push(p.parse_const()?),
                "annotation" => nested.annotation_defs.push(p.parse_annotation_decl()?),
                "using" => nested.usings.push(p.parse_using()?),
                _ => return Err(p.sc.error(format!("Unexpected token '{token}'."))),
            }
        } else if p.sc.peek("$") {
            if let Some(a) = p.opt_parse_annotation()? {
                annotations.push(a);
            }
            p.sc.advance(";")?;
        } else if p.sc.peek("@") {
            if file_id.is_some() {
                return Err(p.sc.error("Multiple file ids found"));
            }
            file_id = Some(p.parse_id()?);
            p.sc.advance(";")?;
        } else {
            break;
        }
    }

    if !p.sc.at_end() {
        return Err(p.sc.error("Expected end of input."));
    }
    let Some(file_id) = file_id else {
        return Err(p.sc.error("Missing id in module"));
    };

    tracing::debug!(decls = schema.len(), "parsed module");

    let decl = schema.decl_mut(module_id);
    decl.id = Some(file_id);
    decl.annotations = annotations;
    decl.kind = DeclKind::Module(ModuleDecl { nested });
    Ok(module_id)
}

/// Declarations collected while parsing one brace-delimited body.
#[derive(Default)]
struct Block {
    composite: Composite,
    fields: Vec<Field>,
    methods: Vec<Method>,
}

struct DeclParser<'s, 'a> {
    sc: Scanner<'s>,
    schema: &'a mut Schema,
    /// Current lexical scope; new declarations are parented here.
    scope: DeclId,
}

impl DeclParser<'_, '_> {
    fn parse_default_value(&mut self, ty: Option<&Type>) -> Result<Value> {
        value::parse_default_value(&mut self.sc, self.schema, ty)
    }

    fn parse_full_name(&mut self) -> Result<FullName> {
        value::parse_full_name(&mut self.sc)
    }

    // ----- names and ids -----

    fn parse_capitalized_name(&mut self) -> Result<String> {
        let name = self.sc.advance_ident()?;
        if !is_capitalized(name) {
            return Err(self.sc.error("Name must be capitalized"));
        }
        Ok(name.to_string())
    }

    fn parse_non_capitalized_name(&mut self) -> Result<String> {
        let name = self.sc.advance_ident()?;
        if is_capitalized(name) {
            return Err(self.sc.error("Name must start with lower cased character."));
        }
        Ok(name.to_string())
    }

    /// `@id`, at least `MIN_UID`. The trailing `!` form is consumed but has
    /// no assigned meaning.
    fn parse_id(&mut self) -> Result<u64> {
        self.sc.advance_no_ws("@")?;
        let id = self.sc.parse_u64()?;
        if id < MIN_UID {
            return Err(self.sc.error("invalid id, too small"));
        }
        self.sc.opt_advance("!");
        Ok(id)
    }

    fn opt_parse_id(&mut self) -> Result<Option<u64>> {
        if self.sc.peek("@") {
            Ok(Some(self.parse_id()?))
        } else {
            Ok(None)
        }
    }

    /// `@number` ordinal on a field.
    fn opt_parse_ordinal(&mut self) -> Result<Option<u32>> {
        if !self.sc.opt_advance_no_ws("@") {
            return Ok(None);
        }
        let number = self.sc.parse_u32()?;
        self.sc.opt_advance("!");
        Ok(Some(number))
    }

    // ----- annotations -----

    /// `$name` or `$name(argument)`. The argument is always captured raw: the
    /// annotation's declaration is still an unresolved reference, so its
    /// argument type is unknown here.
    fn opt_parse_annotation(&mut self) -> Result<Option<Annotation>> {
        if !self.sc.opt_advance("$") {
            return Ok(None);
        }
        let name = self.parse_full_name()?;
        let decl = Type::Reference(name);
        let argument = if self.sc.peek("(") {
            Some(self.parse_default_value(None)?)
        } else {
            None
        };
        Ok(Some(Annotation { decl, argument }))
    }

    fn parse_annotation_decl(&mut self) -> Result<DeclId> {
        let name = self.parse_non_capitalized_name()?;
        let id = self.opt_parse_id()?;

        self.sc.advance("(")?;
        let mut targets = Vec::new();
        if self.sc.opt_advance("*") {
            targets.push(AnnotationTarget::Any);
        } else {
            'targets: loop {
                for (keyword, target) in AnnotationTarget::KEYWORDS {
                    if self.sc.opt_advance(keyword) {
                        targets.push(*target);
                        if self.sc.opt_advance(",") {
                            continue 'targets;
                        }
                        break 'targets;
                    }
                }
                break;
            }
        }
        self.sc.advance(")")?;

        let arg_type = if self.sc.opt_advance(":") {
            Some(self.parse_type()?)
        } else {
            None
        };
        let annotation = self.opt_parse_annotation()?;
        self.sc.advance(";")?;

        Ok(self.schema.alloc(Decl {
            name,
            id,
            scope: Some(self.scope),
            annotations: annotation.into_iter().collect(),
            kind: DeclKind::Annotation(AnnotationDecl { targets, arg_type }),
        }))
    }

    // ----- imports and usings -----

    fn parse_import(&mut self) -> Result<Type> {
        let file = self.sc.parse_text()?;
        let inner = if self.sc.opt_advance(".") {
            let ty = self.parse_type()?;
            if !matches!(ty, Type::Reference(_)) {
                return Err(self.sc.error("Expected reference to be imported."));
            }
            Some(Box::new(ty))
        } else {
            None
        };
        Ok(Type::Import { file, inner })
    }

    fn parse_import_or_type(&mut self) -> Result<Type> {
        if self.sc.opt_advance_keyword("import") {
            self.parse_import()
        } else {
            self.parse_type()
        }
    }

    /// The four alias forms:
    /// `using Foo.Bar;` (alias `Bar`), `using Foo = X;`,
    /// `using import "f";`, `using Foo = import "f".Type;`.
    fn parse_using(&mut self) -> Result<Using> {
        if self.sc.opt_advance_keyword("import") {
            let target = self.parse_import()?;
            self.sc.advance(";")?;
            return Ok(Using { name: None, target });
        }

        let name = self.parse_full_name()?;
        if name.has_generic_args() {
            return Err(self
                .sc
                .error("Generic parameters are not allowed on a using alias."));
        }

        if !self.sc.opt_advance("=") {
            // using Foo.Bar; aliases the last segment.
            let alias = name.last().name.clone();
            self.sc.advance(";")?;
            return Ok(Using {
                name: Some(alias),
                target: Type::Reference(name),
            });
        }

        if !name.is_simple() {
            return Err(self.sc.error("Expected simple name before '='."));
        }
        let target = self.parse_import_or_type()?;
        self.sc.advance(";")?;
        Ok(Using {
            name: Some(name.to_string()),
            target,
        })
    }

    // ----- composite declarations -----

    fn opt_parse_generic_parameters(&mut self) -> Result<Vec<String>> {
        let mut params = Vec::new();
        if self.sc.opt_advance("(") {
            loop {
                params.push(self.sc.advance_ident()?.to_string());
                if !self.sc.opt_advance(",") {
                    break;
                }
            }
            self.sc.advance(")")?;
        }
        Ok(params)
    }

    fn parse_struct(&mut self) -> Result<DeclId> {
        let name = self.parse_capitalized_name()?;

        // Allocate before the body so nested declarations can parent here.
        let struct_id = self.schema.alloc(Decl {
            name,
            id: None,
            scope: Some(self.scope),
            annotations: Vec::new(),
            kind: DeclKind::Struct(StructDecl::default()),
        });
        let previous_scope = std::mem::replace(&mut self.scope, struct_id);

        let type_params = self.opt_parse_generic_parameters()?;
        let id = self.opt_parse_id()?;
        let annotation = self.opt_parse_annotation()?;

        self.sc.advance("{")?;
        let mut block = self.parse_block(false)?;
        self.sc.advance("}")?;

        self.scope = previous_scope;

        block.composite.type_params = type_params;
        let decl = self.schema.decl_mut(struct_id);
        decl.id = id;
        decl.annotations = annotation.into_iter().collect();
        decl.kind = DeclKind::Struct(StructDecl {
            nested: block.composite,
            fields: block.fields,
        });
        Ok(struct_id)
    }

    fn parse_interface(&mut self) -> Result<DeclId> {
        let name = self.parse_capitalized_name()?;

        let interface_id = self.schema.alloc(Decl {
            name,
            id: None,
            scope: Some(self.scope),
            annotations: Vec::new(),
            kind: DeclKind::Interface(InterfaceDecl::default()),
        });
        let previous_scope = std::mem::replace(&mut self.scope, interface_id);

        let type_params = self.opt_parse_generic_parameters()?;
        let id = self.opt_parse_id()?;

        let mut extends = Vec::new();
        if self.sc.opt_advance("extends") {
            self.sc.advance("(")?;
            loop {
                extends.push(self.parse_type()?);
                if !self.sc.opt_advance(",") {
                    break;
                }
            }
            self.sc.advance(")")?;
        }

        let annotation = self.opt_parse_annotation()?;

        self.sc.advance("{")?;
        let mut block = self.parse_block(true)?;
        self.sc.advance("}")?;

        self.scope = previous_scope;

        block.composite.type_params = type_params;
        let decl = self.schema.decl_mut(interface_id);
        decl.id = id;
        decl.annotations = annotation.into_iter().collect();
        decl.kind = DeclKind::Interface(InterfaceDecl {
            nested: block.composite,
            methods: block.methods,
            extends,
        });
        Ok(interface_id)
    }

    /// Shared body parser for structs and interfaces: keyword dispatch for
    /// nested declarations, falling back to fields (structs) or methods
    /// (interfaces).
    fn parse_block(&mut self, is_interface: bool) -> Result<Block> {
        let mut block = Block::default();
        loop {
            if self.sc.peek("}") {
                return Ok(block);
            }
            let start = self.sc.pos();
            let name = self.sc.advance_ident()?;
            match name {
                "using" => block.composite.usings.push(self.parse_using()?),
                "struct" => block.composite.structs.push(self.parse_struct()?),
                "interface" => block.composite.interfaces.push(self.parse_interface()?),
                "enum" => block.composite.enums.push(self.parse_enum()?),
                "const" => block.composite.consts.push(self.parse_const()?),
                "annotation" => block
                    .composite
                    .annotation_defs
                    .push(self.parse_annotation_decl()?),
                "union" => {
                    if is_interface {
                        return Err(self.sc.error("Interfaces cannot contain anonymous unions"));
                    }
                    block.fields.push(self.parse_anonymous_union()?);
                }
                _ => {
                    self.sc.set_pos(start);
                    if is_interface {
                        block.methods.push(self.parse_method()?);
                    } else {
                        block.fields.push(self.parse_field()?);
                    }
                }
            }
        }
    }

    fn parse_enum(&mut self) -> Result<DeclId> {
        let name = self.parse_capitalized_name()?;
        let id = self.opt_parse_id()?;
        let annotation = self.opt_parse_annotation()?;

        self.sc.advance("{")?;
        let mut enumerants = Vec::new();
        while !self.sc.peek("}") {
            let field_name = self.parse_non_capitalized_name()?;
            self.sc.advance_no_ws("@")?;
            let number = self.sc.parse_u32()?;
            let enumerant_annotation = self.opt_parse_annotation()?;
            self.sc.advance(";")?;
            enumerants.push(Enumerant {
                name: field_name,
                number,
                annotation: enumerant_annotation,
            });
        }
        self.sc.advance("}")?;

        Ok(self.schema.alloc(Decl {
            name,
            id,
            scope: Some(self.scope),
            annotations: annotation.into_iter().collect(),
            kind: DeclKind::Enum(EnumDecl { enumerants }),
        }))
    }

    fn parse_const(&mut self) -> Result<DeclId> {
        let name = self.parse_non_capitalized_name()?;
        self.sc.advance(":")?;
        let ty = self.parse_type()?;
        self.sc.advance("=")?;
        let value = self.parse_default_value(Some(&ty))?;
        let annotation = self.opt_parse_annotation()?;
        self.sc.advance(";")?;

        Ok(self.schema.alloc(Decl {
            name,
            id: None,
            scope: Some(self.scope),
            annotations: annotation.into_iter().collect(),
            kind: DeclKind::Const(ConstDecl { ty, value }),
        }))
    }

    // ----- fields and methods -----

    fn parse_field(&mut self) -> Result<Field> {
        let name = self.parse_non_capitalized_name()?;
        let number = self.opt_parse_ordinal()?;

        self.sc.advance(":")?;
        let ty = self.parse_type()?;

        // Union and group bodies consume braces; no `=` default and no `;`.
        let is_union_or_group = ty.is_union_or_group();
        let default = if !is_union_or_group && self.sc.opt_advance("=") {
            Some(self.parse_default_value(Some(&ty))?)
        } else {
            None
        };
        let annotation = self.opt_parse_annotation()?;
        if !is_union_or_group {
            self.sc.advance(";")?;
        }

        Ok(Field {
            name: Some(name),
            number,
            ty,
            default,
            annotation,
        })
    }

    fn parse_method(&mut self) -> Result<Method> {
        let name = self.parse_non_capitalized_name()?;
        self.sc.advance_no_ws("@")?;
        let number = self.sc.parse_u32()?;

        if self.sc.opt_advance("[") {
            return Err(self.sc.error("Generic methods not yet supported."));
        }

        let args = self.parse_param_list()?;
        let ret = if self.sc.opt_advance("->") {
            self.parse_param_list()?
        } else {
            ParamList::Type(Type::VOID)
        };
        let annotation = self.opt_parse_annotation()?;
        self.sc.advance(";")?;

        Ok(Method {
            name,
            number,
            args,
            ret,
            annotation,
        })
    }

    /// Either `(a :T, b :U)` or a single struct-typed shape.
    fn parse_param_list(&mut self) -> Result<ParamList> {
        if !self.sc.peek("(") {
            return Ok(ParamList::Type(self.parse_type()?));
        }
        self.sc.advance("(")?;
        let mut params = Vec::new();
        while !self.sc.peek(")") {
            params.push(self.parse_parameter()?);
            if !self.sc.opt_advance(",") {
                break;
            }
        }
        self.sc.advance(")")?;
        Ok(ParamList::Params(params))
    }

    fn parse_parameter(&mut self) -> Result<Parameter> {
        // No case rule applies to parameter names.
        let name = self.sc.advance_ident()?.to_string();
        self.sc.advance(":")?;
        let ty = self.parse_type()?;
        let default = if self.sc.opt_advance("=") {
            Some(self.parse_default_value(Some(&ty))?)
        } else {
            None
        };
        let annotation = self.opt_parse_annotation()?;
        Ok(Parameter {
            name,
            ty,
            default,
            annotation,
        })
    }

    // ----- unions and groups -----

    fn parse_anonymous_union(&mut self) -> Result<Field> {
        Ok(Field {
            name: None,
            number: None,
            ty: self.parse_group_or_union(true)?,
            default: None,
            annotation: None,
        })
    }

    fn parse_group_or_union(&mut self, is_union: bool) -> Result<Type> {
        let annotations: Vec<_> = self.opt_parse_annotation()?.into_iter().collect();

        self.sc.advance("{")?;
        let mut fields = Vec::new();
        while !self.sc.opt_advance("}") {
            if !is_union {
                // A group may contain an anonymous union.
                let start = self.sc.pos();
                if self.sc.opt_advance_ident() == Some("union") {
                    fields.push(self.parse_anonymous_union()?);
                    continue;
                }
                self.sc.set_pos(start);
            }
            fields.push(self.parse_field()?);
        }

        if is_union {
            Ok(Type::Union(UnionType {
                fields,
                annotations,
            }))
        } else {
            Ok(Type::Group(GroupType { fields }))
        }
    }

    // ----- types -----

    fn parse_type(&mut self) -> Result<Type> {
        let name = self.parse_full_name()?;
        self.type_from_name(name)
    }

    fn type_from_name(&mut self, name: FullName) -> Result<Type> {
        if name.is_simple() {
            // Primitive keywords bind early at module scope only; nested
            // scopes may shadow them, so elsewhere they stay references.
            if self.schema.decl(self.scope).is_module() {
                if let Some(primitive) = Primitive::from_keyword(&name.first().name) {
                    return Ok(Type::Primitive(primitive));
                }
            }
            match name.first().name.as_str() {
                "union" => return self.parse_group_or_union(true),
                "group" => return self.parse_group_or_union(false),
                "import" => return self.parse_import(),
                _ => {}
            }
        }

        if name.len() == 1 && name.first().name == "List" && name.first().type_args.len() == 1 {
            let inner = self.type_from_name(name.first().type_args[0].clone())?;
            return Ok(Type::List(Box::new(inner)));
        }

        Ok(Type::Reference(name))
    }
}
