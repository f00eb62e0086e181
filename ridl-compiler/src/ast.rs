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

//! Resolved representation of a RIDL library.
//!
//! The values in this module are built by the front end (parser and
//! resolution pass) and are only read by the compiler backends. They form
//! a tree, not a graph: references to other declarations appear as
//! [`Name`]s, never as owning links.

use std::fmt;

/// Unique numeric discriminant identifying a method within an interface.
pub type Ordinal = u32;

/// Qualified identifier, library relative or fully qualified.
///
/// Backends only see the rendered text; component structure is resolved
/// away by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Name {
        Name(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builtin scalar types.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimitiveSubtype {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    Status,
    Float32,
    Float64,
}

impl PrimitiveSubtype {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveSubtype::Int8 => "int8",
            PrimitiveSubtype::Int16 => "int16",
            PrimitiveSubtype::Int32 => "int32",
            PrimitiveSubtype::Int64 => "int64",
            PrimitiveSubtype::Uint8 => "uint8",
            PrimitiveSubtype::Uint16 => "uint16",
            PrimitiveSubtype::Uint32 => "uint32",
            PrimitiveSubtype::Uint64 => "uint64",
            PrimitiveSubtype::Bool => "bool",
            PrimitiveSubtype::Status => "status",
            PrimitiveSubtype::Float32 => "float32",
            PrimitiveSubtype::Float64 => "float64",
        }
    }
}

/// Object classes a handle type can be constrained to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HandleSubtype {
    Handle,
    Process,
    Thread,
    Vmo,
    Channel,
    Event,
    Port,
    Interrupt,
    Iomap,
    Pci,
    Log,
    Socket,
    Resource,
    Eventpair,
    Job,
    Vmar,
    Fifo,
    Hypervisor,
    Guest,
    Timer,
}

impl HandleSubtype {
    pub fn name(&self) -> &'static str {
        match self {
            HandleSubtype::Handle => "handle",
            HandleSubtype::Process => "process",
            HandleSubtype::Thread => "thread",
            HandleSubtype::Vmo => "vmo",
            HandleSubtype::Channel => "channel",
            HandleSubtype::Event => "event",
            HandleSubtype::Port => "port",
            HandleSubtype::Interrupt => "interrupt",
            HandleSubtype::Iomap => "iomap",
            HandleSubtype::Pci => "pci",
            HandleSubtype::Log => "log",
            HandleSubtype::Socket => "socket",
            HandleSubtype::Resource => "resource",
            HandleSubtype::Eventpair => "eventpair",
            HandleSubtype::Job => "job",
            HandleSubtype::Vmar => "vmar",
            HandleSubtype::Fifo => "fifo",
            HandleSubtype::Hypervisor => "hypervisor",
            HandleSubtype::Guest => "guest",
            HandleSubtype::Timer => "timer",
        }
    }
}

/// Use of a type in a declaration.
///
/// Array bounds and vector/string limits are [`Constant`]s so that bounds
/// may name const declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Array { element_type: Box<Type>, element_count: Constant },
    Vector { element_type: Box<Type>, maybe_element_count: Option<Constant>, nullable: bool },
    String { maybe_element_count: Option<Constant>, nullable: bool },
    Handle { subtype: HandleSubtype, nullable: bool },
    Request { subtype: HandleSubtype, nullable: bool },
    Primitive { subtype: PrimitiveSubtype },
    Identifier { identifier: Name, nullable: bool },
}

impl Type {
    pub fn kind(&self) -> &'static str {
        match self {
            Type::Array { .. } => "array",
            Type::Vector { .. } => "vector",
            Type::String { .. } => "string",
            Type::Handle { .. } => "handle",
            Type::Request { .. } => "request",
            Type::Primitive { .. } => "primitive",
            Type::Identifier { .. } => "identifier",
        }
    }
}

/// Literal value as written in the source file.
///
/// String and Numeric keep the original source text so that the exact
/// spelling (hex bases, leading zeros, float formatting) survives into the
/// generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Quoted string literal. The text includes the surrounding quotes.
    String { value: String },
    Numeric { value: String },
    True,
    False,
    Default,
}

impl Literal {
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::String { .. } => "string",
            Literal::Numeric { .. } => "numeric",
            Literal::True => "true",
            Literal::False => "false",
            Literal::Default => "default",
        }
    }
}

/// Constant expression appearing in declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Identifier { identifier: Name },
    Literal { literal: Literal },
}

impl Constant {
    pub fn kind(&self) -> &'static str {
        match self {
            Constant::Identifier { .. } => "identifier",
            Constant::Literal { .. } => "literal",
        }
    }
}

/// Top level `const` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Const {
    pub name: Name,
    pub ty: Type,
    pub value: Constant,
}

/// Top level `enum` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub name: Name,
    /// Declared underlying type. Only primitive underlying types are
    /// surfaced in the generated document.
    pub ty: Type,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: Name,
    pub value: Constant,
}

/// Top level `interface` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: Name,
    pub methods: Vec<Method>,
}

/// Request or response payload of an interface method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPayload {
    pub parameters: Vec<Parameter>,
    /// Total byte size of the encoded payload.
    pub size: u64,
}

/// Interface method. A method with no request is an event; a method with
/// no response is fire and forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub ordinal: Ordinal,
    pub name: Name,
    pub maybe_request: Option<MethodPayload>,
    pub maybe_response: Option<MethodPayload>,
}

impl Method {
    pub fn has_request(&self) -> bool {
        self.maybe_request.is_some()
    }

    pub fn has_response(&self) -> bool {
        self.maybe_response.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: Type,
    pub name: Name,
    /// Byte offset of the parameter within its payload.
    pub offset: u64,
}

/// Top level `struct` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub name: Name,
    pub members: Vec<StructMember>,
    /// Total byte size of the encoded struct.
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember {
    pub ty: Type,
    pub name: Name,
    pub maybe_default_value: Option<Constant>,
    pub offset: u64,
}

/// Top level `union` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    pub name: Name,
    pub members: Vec<UnionMember>,
    /// Total byte size of the encoded union, including the tag.
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionMember {
    pub ty: Type,
    pub name: Name,
    pub offset: u64,
}

/// Fully resolved RIDL library.
///
/// The five declaration lists keep source declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub name: Name,
    pub const_declarations: Vec<Const>,
    pub enum_declarations: Vec<Enum>,
    pub interface_declarations: Vec<Interface>,
    pub struct_declarations: Vec<Struct>,
    pub union_declarations: Vec<Union>,
    /// Dependency respecting order in which downstream generators must
    /// consider the declarations. Every listed name belongs to exactly one
    /// of the declaration lists above.
    pub declaration_order: Vec<Name>,
}

impl Library {
    pub fn new(name: Name) -> Library {
        Library {
            name,
            const_declarations: vec![],
            enum_declarations: vec![],
            interface_declarations: vec![],
            struct_declarations: vec![],
            union_declarations: vec![],
            declaration_order: vec![],
        }
    }
}
