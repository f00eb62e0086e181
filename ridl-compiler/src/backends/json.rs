// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON intermediate representation backend.
//!
//! Renders a resolved [`Library`](crate::ast::Library) into the canonical
//! JSON document consumed by the per language binding generators. The
//! document layout is part of the compiler's stable contract: key order is
//! fixed per node kind, optional keys are omitted entirely when a value is
//! absent (never emitted as `null`), and literal values keep their original
//! source spelling.

use crate::ast;
use thiserror::Error;

const INDENT: &str = "  ";

/// Input contract violations caught before any output is produced.
///
/// String literal source text is embedded in the document verbatim, so it
/// must form a valid quoted string on its own. The front end guarantees
/// this for well formed sources; the check here turns a front end defect
/// into an explicit failure instead of a malformed document.
#[derive(Debug, Error)]
pub enum Error {
    #[error("string literal {0:?} is not a valid quoted string")]
    InvalidStringLiteral(String),
    #[error("numeric literal has empty source text")]
    EmptyNumericLiteral,
}

/// Turn a resolved library into its JSON intermediate representation.
///
/// The returned document is terminated by exactly one newline. Generation
/// is deterministic: equal libraries produce byte identical documents.
pub fn generate(library: &ast::Library) -> Result<String, Error> {
    check_library(library)?;
    Ok(JsonGenerator::new(library).produce())
}

fn check_library(library: &ast::Library) -> Result<(), Error> {
    for decl in &library.const_declarations {
        check_type(&decl.ty)?;
        check_constant(&decl.value)?;
    }
    for decl in &library.enum_declarations {
        check_type(&decl.ty)?;
        for member in &decl.members {
            check_constant(&member.value)?;
        }
    }
    for decl in &library.interface_declarations {
        for method in &decl.methods {
            for payload in [&method.maybe_request, &method.maybe_response].into_iter().flatten() {
                for parameter in &payload.parameters {
                    check_type(&parameter.ty)?;
                }
            }
        }
    }
    for decl in &library.struct_declarations {
        for member in &decl.members {
            check_type(&member.ty)?;
            if let Some(value) = &member.maybe_default_value {
                check_constant(value)?;
            }
        }
    }
    for decl in &library.union_declarations {
        for member in &decl.members {
            check_type(&member.ty)?;
        }
    }
    Ok(())
}

fn check_type(ty: &ast::Type) -> Result<(), Error> {
    match ty {
        ast::Type::Array { element_type, element_count } => {
            check_type(element_type)?;
            check_constant(element_count)
        }
        ast::Type::Vector { element_type, maybe_element_count, .. } => {
            check_type(element_type)?;
            maybe_element_count.as_ref().map_or(Ok(()), check_constant)
        }
        ast::Type::String { maybe_element_count, .. } => {
            maybe_element_count.as_ref().map_or(Ok(()), check_constant)
        }
        ast::Type::Handle { .. }
        | ast::Type::Request { .. }
        | ast::Type::Primitive { .. }
        | ast::Type::Identifier { .. } => Ok(()),
    }
}

fn check_constant(constant: &ast::Constant) -> Result<(), Error> {
    match constant {
        ast::Constant::Identifier { .. } => Ok(()),
        ast::Constant::Literal { literal } => check_literal(literal),
    }
}

fn check_literal(literal: &ast::Literal) -> Result<(), Error> {
    match literal {
        ast::Literal::String { value } => match serde_json::from_str::<String>(value) {
            Ok(_) => Ok(()),
            Err(_) => Err(Error::InvalidStringLiteral(value.clone())),
        },
        ast::Literal::Numeric { value } if value.is_empty() => Err(Error::EmptyNumericLiteral),
        ast::Literal::Numeric { .. }
        | ast::Literal::True
        | ast::Literal::False
        | ast::Literal::Default => Ok(()),
    }
}

/// Minimal JSON surface writer. Holds the output buffer and the running
/// indentation level; knows nothing about the AST.
///
/// Non empty containers place every member on its own line, indented two
/// spaces per level. Empty containers render as `{}` or `[]` with no
/// interior whitespace.
struct Emitter {
    buffer: String,
    indent_level: usize,
}

impl Emitter {
    fn new() -> Emitter {
        Emitter { buffer: String::new(), indent_level: 0 }
    }

    fn begin_object(&mut self) {
        self.buffer.push('{');
    }

    fn end_object(&mut self) {
        self.buffer.push('}');
    }

    fn begin_array(&mut self) {
        self.buffer.push('[');
    }

    fn end_array(&mut self) {
        self.buffer.push(']');
    }

    fn newline(&mut self) {
        self.buffer.push('\n');
    }

    fn newline_and_indent(&mut self) {
        self.buffer.push('\n');
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
    }

    fn separator(&mut self) {
        self.buffer.push(',');
        self.newline_and_indent();
    }

    fn key(&mut self, name: &str) {
        self.string(name);
        self.buffer.push_str(": ");
    }

    fn boolean(&mut self, value: bool) {
        self.buffer.push_str(if value { "true" } else { "false" });
    }

    fn uint(&mut self, value: u64) {
        self.buffer.push_str(&value.to_string());
    }

    /// Write a quoted string, escaping the characters JSON requires:
    /// `"`, `\`, and all control characters below U+0020.
    fn string(&mut self, value: &str) {
        self.buffer.push('"');
        for c in value.chars() {
            match c {
                '"' => self.buffer.push_str("\\\""),
                '\\' => self.buffer.push_str("\\\\"),
                '\u{08}' => self.buffer.push_str("\\b"),
                '\u{0c}' => self.buffer.push_str("\\f"),
                '\n' => self.buffer.push_str("\\n"),
                '\r' => self.buffer.push_str("\\r"),
                '\t' => self.buffer.push_str("\\t"),
                c if c < ' ' => self.buffer.push_str(&format!("\\u{:04x}", c as u32)),
                c => self.buffer.push(c),
            }
        }
        self.buffer.push('"');
    }

    /// Copy preformatted literal text without quoting or escaping.
    fn literal(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Relative position of an object member, used to choose between opening
/// the indented member block and writing a separator.
#[derive(Debug, Copy, Clone)]
enum Position {
    First,
    Subsequent,
}

/// Values that know how to render themselves into the document.
///
/// Every node category with multiple shapes (Type, Literal, Constant) is
/// matched exhaustively below, with no wildcard arm: a new node kind must
/// be given a rendering before the crate compiles again.
trait GenerateValue {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>);
}

/// Walks a resolved library and drives the [`Emitter`] to produce one JSON
/// document.
struct JsonGenerator<'a> {
    library: &'a ast::Library,
    w: Emitter,
}

impl<'a> JsonGenerator<'a> {
    fn new(library: &'a ast::Library) -> JsonGenerator<'a> {
        JsonGenerator { library, w: Emitter::new() }
    }

    /// Render one object. The callback writes the members; the first
    /// member raises the indentation level, which is restored here before
    /// the closing delimiter. An object with no members renders as `{}`.
    fn object(&mut self, members: impl FnOnce(&mut Self)) {
        let original_indent_level = self.w.indent_level;
        self.w.begin_object();
        members(self);
        if self.w.indent_level > original_indent_level {
            self.w.indent_level -= 1;
            self.w.newline_and_indent();
        }
        self.w.end_object();
    }

    fn array<T: GenerateValue>(&mut self, items: &[T]) {
        self.w.begin_array();
        if !items.is_empty() {
            self.w.indent_level += 1;
            self.w.newline_and_indent();
        }
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.w.separator();
            }
            item.generate_value(self);
        }
        if !items.is_empty() {
            self.w.indent_level -= 1;
            self.w.newline_and_indent();
        }
        self.w.end_array();
    }

    fn begin_member(&mut self, key: &str, position: Position) {
        match position {
            Position::First => {
                self.w.indent_level += 1;
                self.w.newline_and_indent();
            }
            Position::Subsequent => self.w.separator(),
        }
        self.w.key(key);
    }

    fn member<T: GenerateValue + ?Sized>(&mut self, key: &str, value: &T, position: Position) {
        self.begin_member(key, position);
        value.generate_value(self);
    }

    /// Object member whose value is preformatted source text, copied
    /// verbatim. Only used for string literals, which are known to be
    /// valid quoted strings (checked in [`generate`]).
    fn literal_member(&mut self, key: &str, text: &str, position: Position) {
        self.begin_member(key, position);
        self.w.literal(text);
    }

    /// One entry of the trailing `declarations` index.
    fn declaration_map_entry(&mut self, count: usize, name: &ast::Name, kind: &str) {
        if count == 0 {
            self.w.indent_level += 1;
            self.w.newline_and_indent();
        } else {
            self.w.separator();
        }
        self.w.key(name.as_str());
        self.w.string(kind);
    }

    fn produce(mut self) -> String {
        let library = self.library;
        self.object(|gen| {
            gen.member("name", &library.name, Position::First);
            // Reserved for external dependency metadata.
            let no_dependencies: &[ast::Name] = &[];
            gen.member("library_dependencies", no_dependencies, Position::Subsequent);
            gen.member(
                "const_declarations",
                library.const_declarations.as_slice(),
                Position::Subsequent,
            );
            gen.member(
                "enum_declarations",
                library.enum_declarations.as_slice(),
                Position::Subsequent,
            );
            gen.member(
                "interface_declarations",
                library.interface_declarations.as_slice(),
                Position::Subsequent,
            );
            gen.member(
                "struct_declarations",
                library.struct_declarations.as_slice(),
                Position::Subsequent,
            );
            gen.member(
                "union_declarations",
                library.union_declarations.as_slice(),
                Position::Subsequent,
            );
            gen.member(
                "declaration_order",
                library.declaration_order.as_slice(),
                Position::Subsequent,
            );

            // The declarations index maps every qualified name to its
            // declaration kind, iterating the per kind lists in a fixed
            // order and each list in its own order.
            gen.w.separator();
            gen.w.key("declarations");
            gen.object(|gen| {
                let mut count = 0;
                for decl in &library.const_declarations {
                    gen.declaration_map_entry(count, &decl.name, "const");
                    count += 1;
                }
                for decl in &library.enum_declarations {
                    gen.declaration_map_entry(count, &decl.name, "enum");
                    count += 1;
                }
                for decl in &library.interface_declarations {
                    gen.declaration_map_entry(count, &decl.name, "interface");
                    count += 1;
                }
                for decl in &library.struct_declarations {
                    gen.declaration_map_entry(count, &decl.name, "struct");
                    count += 1;
                }
                for decl in &library.union_declarations {
                    gen.declaration_map_entry(count, &decl.name, "union");
                    count += 1;
                }
            });
        });
        self.w.newline();
        debug_assert_eq!(self.w.indent_level, 0);
        self.w.buffer
    }
}

impl GenerateValue for bool {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.w.boolean(*self);
    }
}

impl GenerateValue for u32 {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.w.uint(u64::from(*self));
    }
}

impl GenerateValue for u64 {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.w.uint(*self);
    }
}

impl GenerateValue for str {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.w.string(self);
    }
}

impl<T: GenerateValue> GenerateValue for [T] {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.array(self);
    }
}

impl GenerateValue for ast::Name {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.w.string(self.as_str());
    }
}

impl GenerateValue for ast::PrimitiveSubtype {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.w.string(self.name());
    }
}

impl GenerateValue for ast::HandleSubtype {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.w.string(self.name());
    }
}

impl GenerateValue for ast::Type {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("kind", self.kind(), Position::First);
            match self {
                ast::Type::Array { element_type, element_count } => {
                    gen.member("element_type", element_type.as_ref(), Position::Subsequent);
                    gen.member("element_count", element_count, Position::Subsequent);
                }
                ast::Type::Vector { element_type, maybe_element_count, nullable } => {
                    gen.member("element_type", element_type.as_ref(), Position::Subsequent);
                    if let Some(element_count) = maybe_element_count {
                        gen.member("maybe_element_count", element_count, Position::Subsequent);
                    }
                    gen.member("nullable", nullable, Position::Subsequent);
                }
                ast::Type::String { maybe_element_count, nullable } => {
                    if let Some(element_count) = maybe_element_count {
                        gen.member("maybe_element_count", element_count, Position::Subsequent);
                    }
                    gen.member("nullable", nullable, Position::Subsequent);
                }
                ast::Type::Handle { subtype, nullable }
                | ast::Type::Request { subtype, nullable } => {
                    gen.member("subtype", subtype, Position::Subsequent);
                    gen.member("nullable", nullable, Position::Subsequent);
                }
                ast::Type::Primitive { subtype } => {
                    gen.member("subtype", subtype, Position::Subsequent);
                }
                ast::Type::Identifier { identifier, nullable } => {
                    gen.member("identifier", identifier, Position::Subsequent);
                    gen.member("nullable", nullable, Position::Subsequent);
                }
            }
        });
    }
}

impl GenerateValue for ast::Literal {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("kind", self.kind(), Position::First);
            match self {
                // The source text is already a valid quoted string and is
                // copied through unchanged.
                ast::Literal::String { value } => {
                    gen.literal_member("value", value, Position::Subsequent);
                }
                ast::Literal::Numeric { value } => {
                    gen.member("value", value.as_str(), Position::Subsequent);
                }
                ast::Literal::True | ast::Literal::False | ast::Literal::Default => (),
            }
        });
    }
}

impl GenerateValue for ast::Constant {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("kind", self.kind(), Position::First);
            match self {
                ast::Constant::Identifier { identifier } => {
                    gen.member("identifier", identifier, Position::Subsequent);
                }
                ast::Constant::Literal { literal } => {
                    gen.member("literal", literal, Position::Subsequent);
                }
            }
        });
    }
}

impl GenerateValue for ast::Const {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("name", &self.name, Position::First);
            gen.member("type", &self.ty, Position::Subsequent);
            gen.member("value", &self.value, Position::Subsequent);
        });
    }
}

impl GenerateValue for ast::Enum {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("name", &self.name, Position::First);
            // The underlying type is only surfaced when primitive.
            if let ast::Type::Primitive { subtype } = &self.ty {
                gen.member("type", subtype, Position::Subsequent);
            }
            gen.member("members", self.members.as_slice(), Position::Subsequent);
        });
    }
}

impl GenerateValue for ast::EnumMember {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("name", &self.name, Position::First);
            gen.member("value", &self.value, Position::Subsequent);
        });
    }
}

impl GenerateValue for ast::Interface {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("name", &self.name, Position::First);
            gen.member("methods", self.methods.as_slice(), Position::Subsequent);
        });
    }
}

impl GenerateValue for ast::Method {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("ordinal", &self.ordinal, Position::First);
            gen.member("name", &self.name, Position::Subsequent);
            gen.member("has_request", &self.has_request(), Position::Subsequent);
            if let Some(request) = &self.maybe_request {
                gen.member("maybe_request", request.parameters.as_slice(), Position::Subsequent);
                gen.member("maybe_request_size", &request.size, Position::Subsequent);
            }
            gen.member("has_response", &self.has_response(), Position::Subsequent);
            if let Some(response) = &self.maybe_response {
                gen.member("maybe_response", response.parameters.as_slice(), Position::Subsequent);
                gen.member("maybe_response_size", &response.size, Position::Subsequent);
            }
        });
    }
}

impl GenerateValue for ast::Parameter {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("type", &self.ty, Position::First);
            gen.member("name", &self.name, Position::Subsequent);
            gen.member("offset", &self.offset, Position::Subsequent);
        });
    }
}

impl GenerateValue for ast::Struct {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("name", &self.name, Position::First);
            gen.member("members", self.members.as_slice(), Position::Subsequent);
            gen.member("size", &self.size, Position::Subsequent);
        });
    }
}

impl GenerateValue for ast::StructMember {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("type", &self.ty, Position::First);
            gen.member("name", &self.name, Position::Subsequent);
            if let Some(value) = &self.maybe_default_value {
                gen.member("maybe_default_value", value, Position::Subsequent);
            }
            gen.member("offset", &self.offset, Position::Subsequent);
        });
    }
}

impl GenerateValue for ast::Union {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("name", &self.name, Position::First);
            gen.member("members", self.members.as_slice(), Position::Subsequent);
            gen.member("size", &self.size, Position::Subsequent);
        });
    }
}

impl GenerateValue for ast::UnionMember {
    fn generate_value(&self, gen: &mut JsonGenerator<'_>) {
        gen.object(|gen| {
            gen.member("type", &self.ty, Position::First);
            gen.member("name", &self.name, Position::Subsequent);
            gen.member("offset", &self.offset, Position::Subsequent);
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::*;

    use googletest::prelude::{assert_that, eq};

    fn empty_library() -> Library {
        Library::new(Name::new("example"))
    }

    fn numeric(text: &str) -> Constant {
        Constant::Literal { literal: Literal::Numeric { value: text.to_owned() } }
    }

    fn uint32() -> Type {
        Type::Primitive { subtype: PrimitiveSubtype::Uint32 }
    }

    #[test]
    fn emitter_escapes_json_mandated_characters() {
        let mut w = Emitter::new();
        w.string("a\"b\\c\nd\u{7}");
        assert_eq!(w.buffer, r#""a\"b\\c\nd\u0007""#);
    }

    #[test]
    fn empty_library_renders_empty_containers() {
        let document = generate(&empty_library()).unwrap();
        assert_eq!(
            document,
            r#"{
  "name": "example",
  "library_dependencies": [],
  "const_declarations": [],
  "enum_declarations": [],
  "interface_declarations": [],
  "struct_declarations": [],
  "union_declarations": [],
  "declaration_order": [],
  "declarations": {}
}
"#
        );
    }

    #[test]
    fn document_ends_with_single_trailing_newline() {
        let document = generate(&empty_library()).unwrap();
        assert!(document.ends_with("}\n"));
        assert!(!document.ends_with("\n\n"));
    }

    #[test]
    fn enum_declaration_snapshot() {
        let mut library = empty_library();
        library.enum_declarations.push(Enum {
            name: Name::new("Direction"),
            ty: uint32(),
            members: vec![
                EnumMember { name: Name::new("Up"), value: numeric("0") },
                EnumMember { name: Name::new("Down"), value: numeric("1") },
            ],
        });
        library.declaration_order.push(Name::new("Direction"));

        let document = generate(&library).unwrap();
        assert_eq!(
            document,
            r#"{
  "name": "example",
  "library_dependencies": [],
  "const_declarations": [],
  "enum_declarations": [
    {
      "name": "Direction",
      "type": "uint32",
      "members": [
        {
          "name": "Up",
          "value": {
            "kind": "literal",
            "literal": {
              "kind": "numeric",
              "value": "0"
            }
          }
        },
        {
          "name": "Down",
          "value": {
            "kind": "literal",
            "literal": {
              "kind": "numeric",
              "value": "1"
            }
          }
        }
      ]
    }
  ],
  "interface_declarations": [],
  "struct_declarations": [],
  "union_declarations": [],
  "declaration_order": [
    "Direction"
  ],
  "declarations": {
    "Direction": "enum"
  }
}
"#
        );
    }

    #[test]
    fn enum_with_non_primitive_underlying_type_omits_the_type_key() {
        let mut library = empty_library();
        library.enum_declarations.push(Enum {
            name: Name::new("Direction"),
            ty: Type::Identifier { identifier: Name::new("Other"), nullable: false },
            members: vec![EnumMember { name: Name::new("Up"), value: numeric("0") }],
        });
        library.declaration_order.push(Name::new("Direction"));

        let document = generate(&library).unwrap();
        assert!(!document.contains("\"type\""));
        assert!(document.contains("\"name\": \"Direction\""));
    }

    #[test]
    fn numeric_literals_keep_their_source_text() {
        let mut library = empty_library();
        library.const_declarations.push(Const {
            name: Name::new("Answer"),
            ty: uint32(),
            value: numeric("0x2A"),
        });
        library.declaration_order.push(Name::new("Answer"));

        let document = generate(&library).unwrap();
        assert!(document.contains("\"value\": \"0x2A\""));
    }

    #[test]
    fn string_literals_are_copied_verbatim() {
        let mut library = empty_library();
        library.const_declarations.push(Const {
            name: Name::new("Greeting"),
            ty: Type::String { maybe_element_count: None, nullable: false },
            value: Constant::Literal {
                literal: Literal::String { value: r#""hello\nworld""#.to_owned() },
            },
        });
        library.declaration_order.push(Name::new("Greeting"));

        let document = generate(&library).unwrap();
        // The escape sequence comes straight from the source text; the
        // emitter does not escape it a second time.
        assert!(document.contains(r#""value": "hello\nworld""#));
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_that!(
            value["const_declarations"][0]["value"]["literal"]["value"].as_str().unwrap(),
            eq("hello\nworld")
        );
    }

    #[test]
    fn flag_literals_render_kind_only() {
        let mut library = empty_library();
        library.const_declarations.push(Const {
            name: Name::new("Enabled"),
            ty: Type::Primitive { subtype: PrimitiveSubtype::Bool },
            value: Constant::Literal { literal: Literal::True },
        });
        library.declaration_order.push(Name::new("Enabled"));

        let document = generate(&library).unwrap();
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_eq!(
            value["const_declarations"][0]["value"]["literal"],
            serde_json::json!({ "kind": "true" })
        );
    }

    #[test]
    fn invalid_string_literal_text_is_rejected() {
        let mut library = empty_library();
        library.const_declarations.push(Const {
            name: Name::new("Broken"),
            ty: Type::String { maybe_element_count: None, nullable: false },
            value: Constant::Literal {
                literal: Literal::String { value: "missing quotes".to_owned() },
            },
        });
        library.declaration_order.push(Name::new("Broken"));

        assert!(matches!(generate(&library), Err(Error::InvalidStringLiteral(_))));
    }

    #[test]
    fn empty_numeric_literal_text_is_rejected() {
        let mut library = empty_library();
        library.const_declarations.push(Const {
            name: Name::new("Broken"),
            ty: uint32(),
            value: numeric(""),
        });
        library.declaration_order.push(Name::new("Broken"));

        assert!(matches!(generate(&library), Err(Error::EmptyNumericLiteral)));
    }

    #[test]
    fn names_escape_and_round_trip() {
        let mut library = empty_library();
        library.name = Name::new(r#"we"ird\lib"#);

        let document = generate(&library).unwrap();
        assert!(document.contains(r#""name": "we\"ird\\lib""#));
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_eq!(value["name"].as_str(), Some(r#"we"ird\lib"#));
    }

    #[test]
    fn control_characters_in_names_are_escaped() {
        let mut library = empty_library();
        library.name = Name::new("line\nbreak\u{1}");

        let document = generate(&library).unwrap();
        assert!(document.contains(r#""name": "line\nbreak\u0001""#));
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_eq!(value["name"].as_str(), Some("line\nbreak\u{1}"));
    }

    #[test]
    fn struct_member_without_default_value_has_no_default_key() {
        let mut library = empty_library();
        library.struct_declarations.push(Struct {
            name: Name::new("Point"),
            members: vec![
                StructMember {
                    ty: uint32(),
                    name: Name::new("x"),
                    maybe_default_value: None,
                    offset: 0,
                },
                StructMember {
                    ty: uint32(),
                    name: Name::new("y"),
                    maybe_default_value: Some(numeric("7")),
                    offset: 4,
                },
            ],
            size: 8,
        });
        library.declaration_order.push(Name::new("Point"));

        let document = generate(&library).unwrap();
        // Only the member that has a default carries the key.
        assert_eq!(document.matches("maybe_default_value").count(), 1);
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        let members = value["struct_declarations"][0]["members"].as_array().unwrap();
        assert!(!members[0].as_object().unwrap().contains_key("maybe_default_value"));
        assert!(members[1].as_object().unwrap().contains_key("maybe_default_value"));
    }

    #[test]
    fn method_without_response_renders_only_the_flag() {
        let mut library = empty_library();
        library.interface_declarations.push(Interface {
            name: Name::new("Pinger"),
            methods: vec![Method {
                ordinal: 1,
                name: Name::new("Ping"),
                maybe_request: Some(MethodPayload { parameters: vec![], size: 16 }),
                maybe_response: None,
            }],
        });
        library.declaration_order.push(Name::new("Pinger"));

        let document = generate(&library).unwrap();
        assert!(document.contains("\"has_request\": true"));
        assert!(document.contains("\"maybe_request\": []"));
        assert!(document.contains("\"maybe_request_size\": 16"));
        assert!(document.contains("\"has_response\": false"));
        assert!(!document.contains("maybe_response"));
    }

    #[test]
    fn declaration_index_follows_per_kind_order() {
        let mut library = empty_library();
        library.const_declarations.push(Const {
            name: Name::new("C"),
            ty: uint32(),
            value: numeric("0"),
        });
        library.struct_declarations.push(Struct {
            name: Name::new("S"),
            members: vec![],
            size: 8,
        });
        // Dependency order lists the struct first; the index must still
        // iterate consts before structs.
        library.declaration_order = vec![Name::new("S"), Name::new("C")];

        let document = generate(&library).unwrap();
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_that!(value["declarations"]["C"].as_str().unwrap(), eq("const"));
        assert_that!(value["declarations"]["S"].as_str().unwrap(), eq("struct"));

        let const_entry = document.find("\"C\": \"const\"").unwrap();
        let struct_entry = document.find("\"S\": \"struct\"").unwrap();
        assert!(const_entry < struct_entry);
    }

    #[test]
    fn declaration_order_is_passed_through() {
        let mut library = empty_library();
        library.const_declarations.push(Const {
            name: Name::new("C"),
            ty: uint32(),
            value: numeric("0"),
        });
        library.struct_declarations.push(Struct {
            name: Name::new("S"),
            members: vec![],
            size: 8,
        });
        library.declaration_order = vec![Name::new("S"), Name::new("C")];

        let document = generate(&library).unwrap();
        let value: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_eq!(value["declaration_order"], serde_json::json!(["S", "C"]));
    }
}
