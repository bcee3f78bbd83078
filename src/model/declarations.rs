//! Top-level type declarations.

use smol_str::SmolStr;
use thiserror::Error;

use super::annotation::Annotation;
use super::record::RecordShape;
use crate::base::LineCol;
use crate::hir::{DeclId, SourceUnit};
use crate::syntax::{CommentGroup, Field, GenDecl, TypeExpr, TypeSpec};

/// The declaration is not a struct type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{name} is not a struct type")]
pub struct NotRecordShape {
    pub name: SmolStr,
}

/// One type spec of a `type` declaration, with the unit and group it
/// belongs to.
#[derive(Clone, Debug)]
pub struct TypeDeclaration<'a> {
    id: DeclId,
    unit: &'a SourceUnit,
    decl: &'a GenDecl,
    spec: &'a TypeSpec,
    annotation: Option<Annotation<'a>>,
}

impl<'a> TypeDeclaration<'a> {
    pub(crate) fn new(id: DeclId, unit: &'a SourceUnit, decl: &'a GenDecl, spec: &'a TypeSpec) -> Self {
        Self {
            id,
            unit,
            decl,
            spec,
            annotation: None,
        }
    }

    pub(crate) fn with_annotation(mut self, annotation: Annotation<'a>) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn name(&self) -> &'a str {
        self.spec.name.as_str()
    }

    /// The governing doc comment: the spec's own, else the group's.
    ///
    /// `// doc` above `type T struct{}` belongs to the group; inside
    /// `type ( ... )` each spec carries its own.
    pub fn doc(&self) -> Option<&'a CommentGroup> {
        self.spec.doc.as_ref().or(self.decl.doc.as_ref())
    }

    /// The definition as a struct, if it is one.
    pub fn as_record(&self) -> Result<RecordShape<'a>, NotRecordShape> {
        match &self.spec.ty {
            TypeExpr::Struct(st) => Ok(RecordShape::new(self.name(), st)),
            _ => Err(NotRecordShape {
                name: self.spec.name.name.clone(),
            }),
        }
    }

    /// Set only on declarations selected by tag.
    pub fn annotation(&self) -> Option<&Annotation<'a>> {
        self.annotation.as_ref()
    }

    pub fn id(&self) -> DeclId {
        self.id
    }

    pub fn unit(&self) -> &'a SourceUnit {
        self.unit
    }

    pub fn spec(&self) -> &'a TypeSpec {
        self.spec
    }

    pub fn decl(&self) -> &'a GenDecl {
        self.decl
    }

    pub fn is_alias(&self) -> bool {
        self.spec.is_alias
    }

    pub fn is_exported(&self) -> bool {
        self.spec.name.is_exported()
    }

    pub fn type_params(&self) -> &'a [Field] {
        &self.spec.type_params
    }

    /// Where the type's name is declared.
    pub fn position(&self) -> LineCol {
        self.unit.position(self.spec.name.range)
    }
}
