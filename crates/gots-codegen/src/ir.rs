//! Intermediate representation of a Go package ready for TypeScript emission.
//!
//! The IR is produced by the [builder](crate::builder) from resolved source
//! declarations (or constructed directly by library users) and is immutable
//! once a [`PackageUnit`] has been built.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Location, Result};

/// Go predeclared types the mapper knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Byte,
    Rune,
    Any,
}

impl Primitive {
    /// Look up a primitive by its Go spelling.
    pub fn from_go_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "bool" => Primitive::Bool,
            "string" => Primitive::String,
            "int" => Primitive::Int,
            "int8" => Primitive::Int8,
            "int16" => Primitive::Int16,
            "int32" => Primitive::Int32,
            "int64" => Primitive::Int64,
            "uint" => Primitive::Uint,
            "uint8" => Primitive::Uint8,
            "uint16" => Primitive::Uint16,
            "uint32" => Primitive::Uint32,
            "uint64" => Primitive::Uint64,
            "uintptr" => Primitive::Uintptr,
            "float32" => Primitive::Float32,
            "float64" => Primitive::Float64,
            "complex64" => Primitive::Complex64,
            "complex128" => Primitive::Complex128,
            "byte" => Primitive::Byte,
            "rune" => Primitive::Rune,
            "any" | "interface{}" => Primitive::Any,
            _ => return None,
        };
        Some(primitive)
    }

    pub fn go_name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::String => "string",
            Primitive::Int => "int",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Uint => "uint",
            Primitive::Uint8 => "uint8",
            Primitive::Uint16 => "uint16",
            Primitive::Uint32 => "uint32",
            Primitive::Uint64 => "uint64",
            Primitive::Uintptr => "uintptr",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::Complex64 => "complex64",
            Primitive::Complex128 => "complex128",
            Primitive::Byte => "byte",
            Primitive::Rune => "rune",
            Primitive::Any => "any",
        }
    }

    /// Whether the primitive renders as a TypeScript `number`.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Primitive::Bool | Primitive::String | Primitive::Any)
    }

    /// `uint8` and its `byte` alias; a slice of these is base64 text on the wire.
    pub fn is_byte(self) -> bool {
        matches!(self, Primitive::Uint8 | Primitive::Byte)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.go_name())
    }
}

/// A type expression in the IR.
///
/// Named types are always referenced by name, never inlined, so a
/// self-referential declaration cannot make mapping recurse without bound.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Primitive(Primitive),
    /// Reference to an exported declaration of the same package.
    Named(String),
    /// Anonymous struct.
    Struct(Vec<FieldDecl>),
    Map(Box<TypeNode>, Box<TypeNode>),
    /// Slice or array.
    Sequence(Box<TypeNode>),
    /// Value that may be absent: `inner | undefined`.
    Optional(Box<TypeNode>),
    /// Go pointer: `inner | null`.
    Pointer(Box<TypeNode>),
    /// Reference the resolver could not tie to a declaration in this package.
    Unresolved(String),
}

impl TypeNode {
    pub fn primitive(primitive: Primitive) -> Self {
        TypeNode::Primitive(primitive)
    }

    pub fn bool() -> Self {
        TypeNode::Primitive(Primitive::Bool)
    }

    pub fn string() -> Self {
        TypeNode::Primitive(Primitive::String)
    }

    pub fn int() -> Self {
        TypeNode::Primitive(Primitive::Int)
    }

    pub fn any() -> Self {
        TypeNode::Primitive(Primitive::Any)
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeNode::Named(name.into())
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        TypeNode::Unresolved(name.into())
    }

    pub fn object(fields: Vec<FieldDecl>) -> Self {
        TypeNode::Struct(fields)
    }

    pub fn map(key: TypeNode, value: TypeNode) -> Self {
        TypeNode::Map(Box::new(key), Box::new(value))
    }

    pub fn sequence(elem: TypeNode) -> Self {
        TypeNode::Sequence(Box::new(elem))
    }

    pub fn optional(inner: TypeNode) -> Self {
        TypeNode::Optional(Box::new(inner))
    }

    pub fn pointer(inner: TypeNode) -> Self {
        TypeNode::Pointer(Box::new(inner))
    }

    /// The Go spelling used to group constants and key override rules.
    ///
    /// Only meaningful for terminal nodes; composite nodes yield `None`.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            TypeNode::Primitive(p) => Some(p.go_name()),
            TypeNode::Named(name) | TypeNode::Unresolved(name) => Some(name),
            _ => None,
        }
    }
}

/// A struct member before naming and optionality rules are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub source_name: String,
    /// Name taken from a `json`/`yaml` tag.
    pub override_name: Option<String>,
    pub ty: TypeNode,
    pub optional: bool,
    pub readonly: bool,
    /// Dropped from the emitted interface (`json:"-"` and friends).
    pub skip: bool,
    /// Verbatim TypeScript from a `tstype` tag.
    pub type_override: Option<String>,
    pub doc: Option<String>,
    pub inline_comment: Option<String>,
}

impl FieldDecl {
    pub fn new(source_name: impl Into<String>, ty: TypeNode) -> Self {
        Self {
            source_name: source_name.into(),
            override_name: None,
            ty,
            optional: false,
            readonly: false,
            skip: false,
            type_override: None,
            doc: None,
            inline_comment: None,
        }
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.override_name = Some(name.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn with_type_override(mut self, expr: impl Into<String>) -> Self {
        self.type_override = Some(expr.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.inline_comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Struct,
    Alias,
    /// Interface made only of methods; emitted with an empty body.
    InterfaceShape,
}

/// A type an interface extends, from an embedded field tagged `tstype:",extends"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heritage {
    pub name: String,
    /// The embedded field was a pointer, so every inherited member is optional.
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: DeclKind,
    pub body: TypeNode,
    pub heritage: Vec<Heritage>,
    pub doc: Option<String>,
    pub inline_comment: Option<String>,
    pub location: Location,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: DeclKind, body: TypeNode, location: Location) -> Self {
        Self {
            name: name.into(),
            kind,
            body,
            heritage: Vec::new(),
            doc: None,
            inline_comment: None,
            location,
        }
    }

    pub fn structure(name: impl Into<String>, fields: Vec<FieldDecl>, location: Location) -> Self {
        Self::new(name, DeclKind::Struct, TypeNode::Struct(fields), location)
    }

    pub fn alias(name: impl Into<String>, target: TypeNode, location: Location) -> Self {
        Self::new(name, DeclKind::Alias, target, location)
    }

    pub fn with_heritage(mut self, heritage: Vec<Heritage>) -> Self {
        self.heritage = heritage;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.inline_comment = Some(comment.into());
        self
    }
}

/// A constant's value as written in the source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Anything that is not a plain literal (`1 << iota`, `0o755`, ...).
    Expr { expr: String },
}

impl Literal {
    pub fn expr(text: impl Into<String>) -> Self {
        Literal::Expr { expr: text.into() }
    }

    /// The Go default type of an untyped constant holding this literal.
    pub fn default_type(&self) -> Primitive {
        match self {
            Literal::Bool(_) => Primitive::Bool,
            Literal::Int(_) | Literal::Expr { .. } => Primitive::Int,
            Literal::Float(_) => Primitive::Float64,
            Literal::String(_) => Primitive::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    /// The constant's type: a primitive, a named declaration, or an
    /// unresolved reference.
    pub ty: TypeNode,
    pub value: Literal,
    pub doc: Option<String>,
    pub inline_comment: Option<String>,
    pub location: Location,
}

impl ConstDecl {
    pub fn new(name: impl Into<String>, ty: TypeNode, value: Literal, location: Location) -> Self {
        Self {
            name: name.into(),
            ty,
            value,
            doc: None,
            inline_comment: None,
            location,
        }
    }

    /// Constant with no declared type; its type follows the literal.
    pub fn untyped(name: impl Into<String>, value: Literal, location: Location) -> Self {
        let ty = TypeNode::Primitive(value.default_type());
        Self::new(name, ty, value, location)
    }

    pub fn underlying_type_name(&self) -> &str {
        self.ty.type_name().unwrap_or_default()
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.inline_comment = Some(comment.into());
        self
    }
}

/// One entry of a [`PackageUnit`], in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitItem {
    Type(TypeDecl),
    Const(ConstDecl),
    /// TypeScript carried through verbatim.
    Emit(String),
}

impl UnitItem {
    fn declared(&self) -> Option<(&str, &Location)> {
        match self {
            UnitItem::Type(decl) => Some((decl.name.as_str(), &decl.location)),
            UnitItem::Const(decl) => Some((decl.name.as_str(), &decl.location)),
            UnitItem::Emit(_) => None,
        }
    }
}

/// The declarations of one Go source file.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageUnit {
    package: String,
    file_name: String,
    items: Vec<UnitItem>,
}

impl PackageUnit {
    /// Build a unit, rejecting names declared twice.
    pub fn new(
        package: impl Into<String>,
        file_name: impl Into<String>,
        items: Vec<UnitItem>,
    ) -> Result<Self> {
        let mut seen: HashMap<&str, &Location> = HashMap::new();
        for (name, location) in items.iter().filter_map(UnitItem::declared) {
            if let Some(first) = seen.insert(name, location) {
                return Err(Error::DuplicateDeclaration {
                    name: name.to_string(),
                    first: first.clone(),
                    second: location.clone(),
                });
            }
        }

        Ok(Self {
            package: package.into(),
            file_name: file_name.into(),
            items,
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn items(&self) -> &[UnitItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn type_decls(&self) -> impl Iterator<Item = &TypeDecl> {
        self.items.iter().filter_map(|item| match item {
            UnitItem::Type(decl) => Some(decl),
            _ => None,
        })
    }
}
