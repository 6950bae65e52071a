//! # gots-codegen
//!
//! TypeScript declaration generator for Go packages. The crate takes
//! package-level Go declarations, already resolved by an external Go type
//! checker, and renders them as TypeScript `interface`, `type` and `const`
//! declarations that mirror how `encoding/json` puts the values on the wire.
//!
//! ## Features
//!
//! - Structs become interfaces, honouring `json`/`yaml` names, `omitempty`
//!   and `omitzero` optionality, and `tstype` overrides
//! - Runs of constants become a type alias plus typed bindings, a union of
//!   `typeof` members, or an `enum`
//! - Doc and inline comments are carried over, minus Go tool directives
//! - Types the generator cannot resolve degrade to a configurable fallback
//!   annotated with the original name
//! - Override rules map any Go type name to hand-written TypeScript
//!
//! ## Quick Start
//!
//! ### Building the IR directly
//!
//! ```rust
//! # fn main() -> gots_codegen::Result<()> {
//! use gots_codegen::{CodeGenerator, ConstDecl, FieldDecl, Literal, Location, PackageUnit, TypeDecl, TypeNode, UnitItem};
//!
//! let loc = |i| Location::new("simple.go", i);
//! let items = vec![
//!     UnitItem::Type(TypeDecl::structure(
//!         "User",
//!         vec![
//!             FieldDecl::new("ID", TypeNode::pointer(TypeNode::unresolved("uuid.NullUUID")))
//!                 .renamed("id")
//!                 .optional(),
//!             FieldDecl::new("Name", TypeNode::string()).renamed("name"),
//!         ],
//!         loc(1),
//!     )),
//!     UnitItem::Const(ConstDecl::untyped("RoleViewer", Literal::String("viewer".into()), loc(2))),
//!     UnitItem::Const(ConstDecl::untyped("RoleEditor", Literal::String("editor".into()), loc(3))),
//! ];
//!
//! let mut generator = CodeGenerator::new();
//! generator.add_unit(PackageUnit::new("simple", "simple.go", items)?);
//!
//! let code = generator.generate()?;
//! assert!(code.contains("  id?: unknown /* uuid.NullUUID */ | null;\n"));
//! assert!(code.contains("export type Role = string;\n"));
//! assert!(code.contains("export const RoleViewer: Role = \"viewer\";\n"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading resolved packages
//!
//! The external resolver writes one JSON or YAML document per package (see
//! [`source`] for the format):
//!
//! ```no_run
//! # fn main() -> gots_codegen::Result<()> {
//! use gots_codegen::{CodeGenerator, Config, OverrideRules};
//!
//! let overrides = OverrideRules::from_rules([
//!     ("time.Time", "string"),
//!     ("uuid.NullUUID", "string"),
//! ])?;
//!
//! CodeGenerator::with_config(Config::new().with_overrides(overrides))?
//!     .add_source_file("build/models.json")?
//!     .write_to_file("web/src/models/index.ts")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Type Mappings
//!
//! | Go type | TypeNode | TypeScript |
//! |---------|----------|------------|
//! | `bool` | `TypeNode::bool()` | `boolean` |
//! | `string` | `TypeNode::string()` | `string` |
//! | `int`, `uint32`, `float64`, ... | `TypeNode::primitive(..)` | `number /* uint32 */` |
//! | `any`, `interface{}`, `func`, `chan` | `TypeNode::any()` | fallback |
//! | `[]T`, `[N]T` | `TypeNode::sequence(T)` | `T[]` |
//! | `[]byte` | `TypeNode::sequence(byte)` | `string` |
//! | `map[K]V` | `TypeNode::map(K, V)` | `{ [key: K]: V \| undefined }` |
//! | `*T` | `TypeNode::pointer(T)` | `T \| null` |
//! | `struct { ... }` | `TypeNode::object(fields)` | `{ ... }` |
//! | declared type | `TypeNode::named(name)` | `Name` |
//! | unknown type | `TypeNode::unresolved(name)` | `unknown /* name */` |

pub mod builder;
mod comments;
pub mod config;
pub mod constants;
pub mod error;
mod fields;
mod generator;
mod ident;
pub mod ir;
pub mod mapper;
pub mod source;
pub mod tags;

pub use config::{CommentMode, Config, ConstStyle, FallbackPolicy, Flavor, OverrideRules};
pub use error::{Error, Location, Result};
pub use generator::CodeGenerator;
pub use ir::{ConstDecl, DeclKind, FieldDecl, Heritage, Literal, PackageUnit, Primitive, TypeDecl, TypeNode, UnitItem};
pub use mapper::{MapContext, TargetExpr};
pub use source::{SourceFormat, SourcePackage};
