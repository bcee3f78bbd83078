//! Diagnostics: binder error reporting.
//!
//! The binder never stops at the first problem. Every error is recorded in
//! a [`DiagnosticCollector`]; if any were found the package fails to resolve
//! with a [`ResolutionError`] carrying all of them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::input::SourceUnit;
use crate::base::{FileId, LineCol, TextRange};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// A binder error with its location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The unit containing this diagnostic.
    pub file: FileId,
    /// Path of that unit, for display.
    pub path: Arc<Path>,
    pub position: LineCol,
    /// Error code (e.g., "E0001").
    pub code: Option<&'static str>,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
}

/// A secondary location attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub file: FileId,
    pub position: LineCol,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create an error at the start of `range` in `unit`.
    pub fn error(unit: &SourceUnit, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            file: unit.id(),
            path: Arc::from(unit.path()),
            position: unit.position(range),
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.position, self.message)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for binder errors.
pub mod codes {
    /// Name not found in any enclosing scope.
    pub const UNDEFINED: &str = "E0001";
    /// Name declared twice in the package block.
    pub const REDECLARED: &str = "E0002";
    /// Method declared twice on one receiver type.
    pub const METHOD_REDECLARED: &str = "E0003";
    /// Package clause differs from the first unit's.
    pub const PACKAGE_MISMATCH: &str = "E0004";
    /// The importer could not provide a package.
    pub const IMPORT_FAILED: &str = "E0005";
    /// Qualifier of `p.T` is not an imported package.
    pub const NOT_A_PACKAGE: &str = "E0006";
    /// Receiver does not name a package-level type.
    pub const INVALID_RECEIVER: &str = "E0007";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn undefined(&mut self, unit: &SourceUnit, range: TextRange, name: &str) {
        self.add(Diagnostic::error(unit, range, format!("undefined: {name}")).with_code(codes::UNDEFINED));
    }

    /// `name` declared at `range` although `previous` already declares it.
    pub fn redeclared(&mut self, unit: &SourceUnit, range: TextRange, name: &str, previous: (FileId, LineCol)) {
        self.add(
            Diagnostic::error(unit, range, format!("{name} redeclared in this block"))
                .with_code(codes::REDECLARED)
                .with_related(RelatedInfo {
                    file: previous.0,
                    position: previous.1,
                    message: Arc::from(format!("other declaration of {name}")),
                }),
        );
    }

    pub fn method_redeclared(&mut self, unit: &SourceUnit, range: TextRange, receiver: &str, method: &str) {
        self.add(
            Diagnostic::error(unit, range, format!("method {receiver}.{method} already declared"))
                .with_code(codes::METHOD_REDECLARED),
        );
    }

    pub fn package_mismatch(&mut self, unit: &SourceUnit, range: TextRange, expected: &str) {
        let message = format!("package {}; expected {expected}", unit.package_name());
        self.add(Diagnostic::error(unit, range, message).with_code(codes::PACKAGE_MISMATCH));
    }

    pub fn import_failed(&mut self, unit: &SourceUnit, range: TextRange, path: &str, reason: &str) {
        self.add(
            Diagnostic::error(unit, range, format!("could not import {path} ({reason})"))
                .with_code(codes::IMPORT_FAILED),
        );
    }

    pub fn not_a_package(&mut self, unit: &SourceUnit, range: TextRange, name: &str) {
        self.add(
            Diagnostic::error(unit, range, format!("{name} is not a package")).with_code(codes::NOT_A_PACKAGE),
        );
    }

    pub fn invalid_receiver(&mut self, unit: &SourceUnit, range: TextRange, name: &str) {
        self.add(
            Diagnostic::error(unit, range, format!("invalid receiver type {name}"))
                .with_code(codes::INVALID_RECEIVER),
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file == file).collect()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// `Err` with every collected diagnostic if any error was recorded.
    pub fn finish(self) -> Result<(), ResolutionError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(ResolutionError {
                diagnostics: self.diagnostics,
            })
        }
    }
}

// ============================================================================
// RESOLUTION ERROR
// ============================================================================

/// A package that failed to resolve.
///
/// Displays as its first diagnostic, `path:line:col: message`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionError {
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolutionError {
    pub fn first(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    /// Paths of the units with at least one diagnostic, in report order.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for diagnostic in &self.diagnostics {
            if !paths.iter().any(|p| p.as_path() == &*diagnostic.path) {
                paths.push(diagnostic.path.to_path_buf());
            }
        }
        paths
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first() {
            Some(first) => fmt::Display::fmt(first, f),
            None => f.write_str("package failed to resolve"),
        }
    }
}

impl std::error::Error for ResolutionError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    fn unit(id: u32, path: &str, text: &str) -> SourceUnit {
        SourceUnit::parse(FileId::new(id), path, text).unwrap()
    }

    fn at(offset: u32) -> TextRange {
        TextRange::empty(TextSize::from(offset))
    }

    #[test]
    fn test_diagnostic_display() {
        let a = unit(0, "dir/a.go", "package a\n\ntype T Missing\n");
        let diag = Diagnostic::error(&a, at(18), "undefined: Missing");

        assert_eq!(diag.to_string(), "dir/a.go:3:8: undefined: Missing");
        assert_eq!(diag.code, None);
    }

    #[test]
    fn test_collector_counts_and_files() {
        let a = unit(0, "a.go", "package a\n");
        let b = unit(1, "b.go", "package b\n");
        let mut collector = DiagnosticCollector::new();
        collector.undefined(&a, at(0), "X");
        collector.package_mismatch(&b, at(8), "a");
        collector.undefined(&a, at(0), "Y");

        assert_eq!(collector.error_count(), 3);
        assert_eq!(collector.diagnostics_for_file(FileId::new(0)).len(), 2);
        assert_eq!(collector.diagnostics()[1].message.as_ref(), "package b; expected a");
        assert_eq!(collector.diagnostics()[1].code, Some(codes::PACKAGE_MISMATCH));
    }

    #[test]
    fn test_finish_reports_first() {
        let a = unit(0, "a.go", "package a\n");
        let mut collector = DiagnosticCollector::new();
        collector.import_failed(&a, at(0), "example.com/x", "cannot find package");
        collector.undefined(&a, at(0), "x");

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics.len(), 2);
        assert_eq!(
            err.to_string(),
            "a.go:1:1: could not import example.com/x (cannot find package)"
        );
        assert_eq!(err.paths(), vec![PathBuf::from("a.go")]);
    }

    #[test]
    fn test_finish_without_errors() {
        assert!(DiagnosticCollector::new().finish().is_ok());
    }
}
