//! The queryable package model code generators consume.
//!
//! ```text
//! PackageModel ──all_declarations / by_name / by_tag──▶ TypeDeclaration
//!                                                          │ as_record
//!                                                          ▼
//!                                     RecordShape ──fields──▶ FieldDeclaration
//! ```
//!
//! Everything here borrows from the [`PackageModel`]; declarations and
//! fields are cheap views recomputed on each call.

mod annotation;
mod declarations;
mod imports;
mod package;
mod record;
mod shape;

pub use annotation::{Annotation, AnnotationOption};
pub use declarations::{NotRecordShape, TypeDeclaration};
pub use package::PackageModel;
pub use record::{FieldDeclaration, RecordShape, lookup_struct_tag};
pub use shape::{FieldShape, PrimitiveKind, ShapeError, Wrapper};
