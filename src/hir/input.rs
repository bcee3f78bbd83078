//! Parsed source units, the input every later stage reads.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::base::{FileId, LineCol, LineIndex, TextRange};
use crate::syntax::{SourceFile, SyntaxError, parse_file};

/// One parsed Go source file of a package.
///
/// Immutable once parsed; owned by the package model.
pub struct SourceUnit {
    id: FileId,
    path: PathBuf,
    text: String,
    line_index: LineIndex,
    file: SourceFile,
}

impl SourceUnit {
    /// Parse `text` as the unit `id`, recording `path` for messages.
    pub fn parse(id: FileId, path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, SyntaxError> {
        let text = text.into();
        let file = parse_file(&text)?;
        Ok(Self {
            id,
            path: path.into(),
            line_index: LineIndex::new(&text),
            text,
            file,
        })
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// The declaration tree.
    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    /// Name from the unit's package clause.
    pub fn package_name(&self) -> &str {
        self.file.package.as_str()
    }

    /// Start position of `range`.
    pub fn position(&self, range: TextRange) -> LineCol {
        self.line_index.line_col(range.start())
    }

    /// Source text covered by `range`.
    pub fn slice(&self, range: TextRange) -> &str {
        &self.text[range]
    }
}

impl fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceUnit")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("package", &self.package_name())
            .field("decls", &self.file.decls.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unit_parse() {
        let unit = SourceUnit::parse(FileId::new(0), "a.go", "package a\n\ntype T int\n").unwrap();

        assert_eq!(unit.package_name(), "a");
        assert_eq!(unit.path(), Path::new("a.go"));
        assert_eq!(unit.file().decls.len(), 1);

        let name = match &unit.file().decls[0] {
            crate::syntax::Decl::Gen(decl) => match &decl.specs[0] {
                crate::syntax::Spec::Type(spec) => spec.name.range,
                other => panic!("unexpected spec {other:?}"),
            },
            other => panic!("unexpected decl {other:?}"),
        };
        assert_eq!(unit.slice(name), "T");
        assert_eq!(unit.position(name).to_string(), "3:6");
    }

    #[test]
    fn test_source_unit_syntax_error() {
        let err = SourceUnit::parse(FileId::new(0), "a.go", "package\n").unwrap_err();
        assert_eq!(err.message, "expected identifier, found EOF");
    }
}
