//! Getting a package off disk.
//!
//! [`build`] picks the files of a directory that belong to a build,
//! [`constraint`] evaluates their `//go:build` lines, and [`loader`] turns
//! the chosen files into a [`PackageModel`](crate::model::PackageModel).

pub mod build;
pub mod constraint;
pub mod loader;

pub use build::{BuildContext, BuildError, BuildPackage};
pub use constraint::{Constraint, ConstraintError};
pub use loader::Parser;
