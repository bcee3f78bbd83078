//! # gen-base
//!
//! Go source type introspection for code generators.
//!
//! Load a Go package, find its type declarations by name or by an annotation
//! tag in their doc comments, and classify the fields of struct types by
//! shape (pointer, collection and their nestings) and primitive kind.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project → Loader, build file discovery, //go:build constraints
//!   ↓
//! model   → PackageModel, TypeDeclaration, RecordShape, FieldDeclaration
//!   ↓
//! hir     → Source units, importers, declaration binder, diagnostics
//!   ↓
//! syntax  → Lexer, declaration parser, typed AST, type rendering
//!   ↓
//! base    → Primitives (FileId, TextRange, LineIndex)
//! ```
//!
//! ## Example
//!
//! ```
//! use genbase::Parser;
//!
//! let src = r#"package shop
//!
//! // +gen
//! type Item struct {
//!     Name  string
//!     Price *float64
//!     Tags  []string
//! }
//! "#;
//!
//! let pkg = Parser::default().parse_string_source("item.go", src).unwrap();
//! let item = &pkg.by_tag("+gen")[0];
//! let fields = item.as_record().unwrap().fields();
//!
//! assert!(fields[0].is_string());
//! assert!(fields[1].is_ptr() && !fields[1].is_float64());
//! assert!(fields[2].is_array());
//! ```

/// Foundation types: FileId, text ranges, line index
pub mod base;

/// Error types returned by the loader
pub mod error;

/// Resolution: source units, importers, binder
pub mod hir;

/// The package model queried by generators
pub mod model;

/// Package loading and build file discovery
pub mod project;

/// Go lexer, parser and AST
pub mod syntax;

pub use base::{FileId, LineCol, LineIndex, TextRange, TextSize};
pub use error::{Error, LoadCause, LoadError};
pub use hir::{Importer, ResolutionError, SourceImporter, SourceUnit, StaticImporter, StdImporter, TypeTable};
pub use model::{
    Annotation, FieldDeclaration, FieldShape, NotRecordShape, PackageModel, PrimitiveKind, RecordShape,
    TypeDeclaration,
};
pub use project::{BuildContext, Parser};
