//! End-to-end pipeline tests.
//!
//! Each test compiles a complete module through the full pass sequence and
//! asserts on the resolved arena: bound types, substituted constants,
//! generated ids, and re-parsed default values.

use tessera_idl::{
    compile_source, deserialize_schema, process_parsed_source, serialize_schema, DeclId, DeclKind,
    InterfaceDecl, ParamList, Primitive, Schema, StructDecl, Type, Value, MIN_UID,
};

/// Helper to compile a single module with no importable files.
fn compile(source: &str) -> Schema {
    compile_source(source, &mut |_| None).expect("compile should succeed")
}

fn find(schema: &Schema, name: &str) -> DeclId {
    schema
        .iter_ids()
        .find(|&id| schema.decl(id).name == name)
        .unwrap_or_else(|| panic!("declaration '{name}' not found"))
}

fn struct_decl<'a>(schema: &'a Schema, name: &str) -> &'a StructDecl {
    match &schema.decl(find(schema, name)).kind {
        DeclKind::Struct(s) => s,
        other => panic!("'{name}' is not a struct: {other:?}"),
    }
}

fn interface_decl<'a>(schema: &'a Schema, name: &str) -> &'a InterfaceDecl {
    match &schema.decl(find(schema, name)).kind {
        DeclKind::Interface(i) => i,
        other => panic!("'{name}' is not an interface: {other:?}"),
    }
}

// =============================================================================
// Structs, fields, defaults
// =============================================================================

#[test]
fn struct_fields_resolve_to_primitives() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Person {
            name @0 :Text;
            age @1 :UInt8 = 42;
            email @2 :Text;
        }
        "#,
    );

    let person = struct_decl(&schema, "Person");
    assert_eq!(person.fields.len(), 3);
    assert_eq!(person.fields[0].ty, Type::Primitive(Primitive::Text));
    assert_eq!(person.fields[1].ty, Type::Primitive(Primitive::UInt8));
    assert_eq!(person.fields[1].default, Some(Value::UInt8(42)));
    assert_eq!(person.fields[2].number, Some(2));
}

#[test]
fn forward_references_resolve() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Chain {
            next @0 :Link;
        }
        struct Link {
            value @0 :Int64;
        }
        "#,
    );

    let chain = struct_decl(&schema, "Chain");
    assert_eq!(chain.fields[0].ty, Type::Decl(find(&schema, "Link")));
}

#[test]
fn union_default_picks_member_type() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Shape {
            union {
                circle @0 :Float64;
                square @1 :Float64;
            }
        }
        struct Drawing {
            shape @0 :Shape = (circle = 1.5);
        }
        "#,
    );

    let drawing = struct_decl(&schema, "Drawing");
    match &drawing.fields[0].default {
        Some(Value::Struct(fields)) => {
            assert_eq!(fields.get("circle"), Some(&Value::Float64(1.5)));
        }
        other => panic!("expected struct literal default, got {other:?}"),
    }
}

#[test]
fn union_typed_const_selects_one_member() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        const pick :union {
            num @0 :Int32;
            label @1 :Text;
        } = (num = 7);
        "#,
    );

    match &schema.decl(find(&schema, "pick")).kind {
        DeclKind::Const(c) => assert_eq!(
            c.value,
            Value::Union {
                field: "num".to_string(),
                value: Box::new(Value::Int32(7)),
            }
        ),
        other => panic!("expected const, got {other:?}"),
    }
}

#[test]
fn enum_default_resolves_enumerant() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        enum Color {
            red @0;
            green @1;
            blue @2;
        }
        struct Pixel {
            color @0 :Color = green;
        }
        "#,
    );

    let pixel = struct_decl(&schema, "Pixel");
    assert_eq!(
        pixel.fields[0].default,
        Some(Value::Enumerant {
            name: "green".to_string(),
            number: 1,
        })
    );
}

#[test]
fn text_escapes_and_data_literals() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        const greeting :Text = "a\tb\x41";
        const blob :Data = 0x"01 ff";
        const bytes :Data = "hi";
        "#,
    );

    let value = |name: &str| match &schema.decl(find(&schema, name)).kind {
        DeclKind::Const(c) => c.value.clone(),
        other => panic!("'{name}' is not a const: {other:?}"),
    };
    assert_eq!(value("greeting"), Value::Text("a\tbA".to_string()));
    assert_eq!(value("blob"), Value::Data(vec![0x01, 0xff]));
    assert_eq!(value("bytes"), Value::Data(b"hi".to_vec()));
}

// =============================================================================
// Constant references
// =============================================================================

#[test]
fn const_refs_substitute_values() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        const kLimit :Int32 = 5;
        const kAlias :Int32 = .kLimit;

        struct Config {
            limit @0 :Int32 = .kAlias;
        }
        "#,
    );

    match &schema.decl(find(&schema, "kAlias")).kind {
        DeclKind::Const(c) => assert_eq!(c.value, Value::Int32(5)),
        other => panic!("expected const, got {other:?}"),
    }
    let config = struct_decl(&schema, "Config");
    assert_eq!(config.fields[0].default, Some(Value::Int32(5)));
}

#[test]
fn struct_default_from_const_ref() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Point {
            x @0 :Int32;
            y @1 :Int32;
        }
        const kOrigin :Point = (x = 3, y = 4);
        struct Sprite {
            pos @0 :Point = .kOrigin;
        }
        "#,
    );

    let sprite = struct_decl(&schema, "Sprite");
    match &sprite.fields[0].default {
        Some(Value::Struct(fields)) => {
            assert_eq!(fields.get("x"), Some(&Value::Int32(3)));
            assert_eq!(fields.get("y"), Some(&Value::Int32(4)));
        }
        other => panic!("expected substituted struct literal, got {other:?}"),
    }
}

#[test]
fn scoped_const_ref() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Limits {
            const kMax :UInt16 = 1000;
        }
        struct Buffer {
            capacity @0 :UInt16 = Limits.kMax;
        }
        "#,
    );

    let buffer = struct_decl(&schema, "Buffer");
    assert_eq!(buffer.fields[0].default, Some(Value::UInt16(1000)));
}

// =============================================================================
// Generics
// =============================================================================

#[test]
fn generic_type_closes_with_arguments() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Box(T) {
            item @0 :T;
        }
        struct Holder {
            boxes @0 :List(Box(Int32));
        }
        "#,
    );

    // The open declaration keeps its parameter.
    let boxed = struct_decl(&schema, "Box");
    match &boxed.fields[0].ty {
        Type::GenericParameter(p) => assert_eq!(p.name, "T"),
        other => panic!("expected open generic parameter, got {other:?}"),
    }

    let holder = struct_decl(&schema, "Holder");
    match &holder.fields[0].ty {
        Type::List(inner) => match inner.as_ref() {
            Type::Bound(b) => {
                assert_eq!(b.open, find(&schema, "Box"));
                assert_eq!(b.args, vec![Type::Primitive(Primitive::Int32)]);
                assert!(b.is_fully_closed());
            }
            other => panic!("expected bound generic element, got {other:?}"),
        },
        other => panic!("expected list type, got {other:?}"),
    }
}

#[test]
fn generic_member_inherits_binding() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Map(K, V) {
            struct Entry {
                key @0 :K;
                value @1 :V;
            }
            entries @0 :List(Entry);
        }
        struct Index {
            byName @0 :Map(Text, UInt32).Entry;
        }
        "#,
    );

    let index = struct_decl(&schema, "Index");
    match &index.fields[0].ty {
        Type::Bound(b) => {
            assert_eq!(b.open, find(&schema, "Entry"));
            assert!(b.args.is_empty());
            let parent = b.parent.as_ref().expect("binding should carry its parent");
            assert_eq!(parent.open, find(&schema, "Map"));
            assert_eq!(
                parent.args,
                vec![
                    Type::Primitive(Primitive::Text),
                    Type::Primitive(Primitive::UInt32),
                ]
            );
        }
        other => panic!("expected bound member type, got {other:?}"),
    }
}

#[test]
fn generic_field_defaults_resolve_through_binding() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Pair(T) {
            first @0 :T;
            second @1 :T;
        }
        struct Wrapper(T) {
            inner @0 :Pair(T);
        }
        struct Config {
            flags @0 :Pair(Bool) = (first = true, second = false);
            nested @1 :Wrapper(Int32) = (inner = (first = 1, second = 2));
        }
        "#,
    );

    let config = struct_decl(&schema, "Config");
    match &config.fields[0].default {
        Some(Value::Struct(fields)) => {
            assert_eq!(fields.get("first"), Some(&Value::Bool(true)));
            assert_eq!(fields.get("second"), Some(&Value::Bool(false)));
        }
        other => panic!("expected struct literal, got {other:?}"),
    }
    // The inner field's type is itself generic and must close against the
    // outer binding before its literal can be parsed.
    match &config.fields[1].default {
        Some(Value::Struct(fields)) => match fields.get("inner") {
            Some(Value::Struct(inner)) => {
                assert_eq!(inner.get("first"), Some(&Value::Int32(1)));
                assert_eq!(inner.get("second"), Some(&Value::Int32(2)));
            }
            other => panic!("expected nested struct literal, got {other:?}"),
        },
        other => panic!("expected struct literal, got {other:?}"),
    }
}

// =============================================================================
// Interfaces
// =============================================================================

#[test]
fn interface_methods_and_extends() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        interface Calc {
            add @0 (a :Int32, b :Int32) -> (sum :Int32);
            reset @1 ();
        }
        interface Advanced extends (Calc) {
            pow @0 (base :Float64, exp :Float64) -> (result :Float64);
        }
        "#,
    );

    let calc = interface_decl(&schema, "Calc");
    assert_eq!(calc.methods.len(), 2);
    match &calc.methods[0].args {
        ParamList::Params(params) => {
            assert_eq!(params.len(), 2);
            assert_eq!(params[0].ty, Type::Primitive(Primitive::Int32));
        }
        other => panic!("expected parameter list, got {other:?}"),
    }
    // No `->` clause means a void result.
    assert_eq!(calc.methods[1].ret, ParamList::Type(Type::VOID));

    let advanced = interface_decl(&schema, "Advanced");
    assert_eq!(advanced.extends, vec![Type::Decl(find(&schema, "Calc"))]);
}

#[test]
fn method_parameter_defaults_and_annotations() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        annotation doc(method, param) :Text;

        interface Pager {
            page @0 (start :UInt32 = 0 $doc("offset"), count :UInt32 = 10) -> (total :UInt32) $doc("paged");
        }
        "#,
    );

    let pager = interface_decl(&schema, "Pager");
    let method = &pager.methods[0];
    match &method.args {
        ParamList::Params(params) => {
            assert_eq!(params[0].ty, Type::Primitive(Primitive::UInt32));
            assert_eq!(params[0].default, Some(Value::UInt32(0)));
            let note = params[0].annotation.as_ref().expect("parameter annotation");
            assert_eq!(note.argument, Some(Value::Text("offset".to_string())));
            assert_eq!(params[1].default, Some(Value::UInt32(10)));
            assert!(params[1].annotation.is_none());
        }
        other => panic!("expected parameter list, got {other:?}"),
    }
    let note = method.annotation.as_ref().expect("method annotation");
    assert_eq!(note.argument, Some(Value::Text("paged".to_string())));
}

#[test]
fn struct_shaped_method_arguments() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Request {
            query @0 :Text;
        }
        struct Response {
            hits @0 :UInt32;
        }
        interface Search {
            run @0 Request -> Response;
        }
        "#,
    );

    let search = interface_decl(&schema, "Search");
    let run = &search.methods[0];
    assert_eq!(run.args, ParamList::Type(Type::Decl(find(&schema, "Request"))));
    assert_eq!(run.ret, ParamList::Type(Type::Decl(find(&schema, "Response"))));
}

// =============================================================================
// Annotations
// =============================================================================

#[test]
fn annotation_arguments_resolve_deferred() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        annotation note(struct, field) :Text;

        struct Tagged $note("on struct") {
            x @0 :Int32 $note("on field");
        }
        "#,
    );

    let tagged_id = find(&schema, "Tagged");
    let tagged = schema.decl(tagged_id);
    assert_eq!(tagged.annotations.len(), 1);
    assert_eq!(
        tagged.annotations[0].decl,
        Type::Decl(find(&schema, "note"))
    );
    assert_eq!(
        tagged.annotations[0].argument,
        Some(Value::Text("on struct".to_string()))
    );

    let fields = &struct_decl(&schema, "Tagged").fields;
    let annotation = fields[0].annotation.as_ref().expect("field annotation");
    assert_eq!(annotation.argument, Some(Value::Text("on field".to_string())));
}

// =============================================================================
// Ids
// =============================================================================

#[test]
fn generated_ids_are_deterministic() {
    let source = r#"
        @0xbf97b02a43f96b7f;

        struct First {
            a @0 :Int32;
        }
        struct Second {
            b @0 :Int32;
        }
    "#;

    let one = compile(source);
    let two = compile(source);

    let first = one.decl(find(&one, "First")).id.expect("generated id");
    let second = one.decl(find(&one, "Second")).id.expect("generated id");
    assert_ne!(first, second);
    assert!(first >= MIN_UID);
    assert!(second >= MIN_UID);
    assert_eq!(first, two.decl(find(&two, "First")).id.unwrap());
    assert_eq!(second, two.decl(find(&two, "Second")).id.unwrap());
}

#[test]
fn explicit_id_is_preserved() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Fixed @0xea12aa6eb87c47b7 {
            x @0 :Int32;
        }
        "#,
    );
    assert_eq!(
        schema.decl(find(&schema, "Fixed")).id,
        Some(0xea12aa6eb87c47b7)
    );
}

#[test]
fn trailing_bang_on_ids_is_ignored() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        struct Fixed @0xea12aa6eb87c47b7! {
            x @0! :Int32;
        }
        "#,
    );
    assert_eq!(
        schema.decl(find(&schema, "Fixed")).id,
        Some(0xea12aa6eb87c47b7)
    );
    assert_eq!(struct_decl(&schema, "Fixed").fields[0].number, Some(0));
}

// =============================================================================
// Using aliases
// =============================================================================

#[test]
fn using_alias_resolves_through_nesting() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        using Inner = Deep.Inner;
        using Deep.Other;

        struct Deep {
            struct Inner {
                v @0 :Int32;
            }
            struct Other {
                w @0 :Int32;
            }
        }
        struct User {
            i @0 :Inner;
            o @1 :Other;
        }
        "#,
    );

    let user = struct_decl(&schema, "User");
    assert_eq!(user.fields[0].ty, Type::Decl(find(&schema, "Inner")));
    assert_eq!(user.fields[1].ty, Type::Decl(find(&schema, "Other")));
}

#[test]
fn standalone_value_parsing() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;
        enum Mode {
            off @0;
            on @1;
        }
        "#,
    );
    let mode = Type::Decl(find(&schema, "Mode"));
    let value = tessera_idl::parse_value(" on ", &mode, &schema).expect("parse value");
    assert_eq!(
        value,
        Value::Enumerant {
            name: "on".to_string(),
            number: 1,
        }
    );
}

// =============================================================================
// Round-trips
// =============================================================================

#[test]
fn schema_serialization_round_trips() {
    let schema = compile(
        r#"
        @0xbf97b02a43f96b7f;

        enum Mode {
            off @0;
            on @1;
        }
        struct Settings {
            mode @0 :Mode = on;
            labels @1 :List(Text) = ["a", "b"];
        }
        "#,
    );

    let json = serialize_schema(&schema).expect("serialize");
    let restored = deserialize_schema(&json).expect("deserialize");
    assert_eq!(serialize_schema(&restored).expect("serialize"), json);
}

#[test]
fn resolution_is_idempotent() {
    let source = r#"
        @0xbf97b02a43f96b7f;

        const kSize :UInt32 = 64;
        struct Page {
            size @0 :UInt32 = .kSize;
            next @1 :Page;
        }
    "#;

    let mut schema = compile(source);
    let before = serialize_schema(&schema).expect("serialize");
    // Running the pipeline over an already resolved schema changes nothing.
    process_parsed_source(&mut schema, &mut |_| None).expect("second run should succeed");
    assert_eq!(serialize_schema(&schema).expect("serialize"), before);
}
