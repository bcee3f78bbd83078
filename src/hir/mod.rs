//! HIR: the resolved view of a package.
//!
//! Parsed [`SourceUnit`]s go in, a [`TypeTable`] comes out. Resolution is
//! a single pass over the declarations of all units:
//!
//! 1. **Package clause**: every unit must agree with the first one
//! 2. **Package scope**: top-level names are collected and checked for
//!    redeclaration
//! 3. **File scopes**: imports are handed to an [`Importer`]
//! 4. **Methods**: attached to their receiver base types
//! 5. **Binding**: each identifier in a top-level type expression is looked
//!    up through type parameters, package, universe and dot imports
//!
//! Failures are gathered as [`Diagnostic`]s rather than returned early.

mod diagnostics;
mod ids;
mod importer;
mod input;
mod resolve;

pub use diagnostics::{Diagnostic, DiagnosticCollector, RelatedInfo, ResolutionError, codes};
pub use ids::{DeclId, LocalDeclId};
pub use importer::{
    ImportError, ImportedPackage, Importer, SourceImporter, StaticImporter, StdImporter, default_package_name,
};
pub use input::SourceUnit;
pub(crate) use resolve::declared_names;
pub use resolve::{
    Binding, CGO_PATH, Method, Object, ObjectKind, Reference, TypeTable, UNIVERSE_TYPES, check_package,
};
