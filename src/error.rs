//! Errors returned when loading a package.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::hir::ResolutionError;
use crate::project::build::BuildError;
use crate::syntax::SyntaxError;

/// Top-level failure of [`Parser`](crate::Parser).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{}: no buildable Go source files", dir.display())]
    NoSourceFiles { dir: PathBuf },
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// A file or directory that could not be turned into declaration trees.
///
/// File failures display as `parsing package: <file>: <cause>`. Discovery
/// failures already name the directory, so they display as
/// `cannot process directory: <cause>`.
#[derive(Debug)]
pub struct LoadError {
    pub path: PathBuf,
    pub cause: LoadCause,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            LoadCause::Discovery(err) => write!(f, "cannot process directory: {err}"),
            cause => write!(f, "parsing package: {}: {cause}", self.path.display()),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, cause: impl Into<LoadCause>) -> Self {
        Self {
            path: path.into(),
            cause: cause.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadCause {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Discovery(#[from] BuildError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::LineCol;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::new("pkg/a.go", SyntaxError::new(LineCol::new(2, 4), "expected ';', found 'type'"));
        assert_eq!(err.to_string(), "parsing package: pkg/a.go: 3:5: expected ';', found 'type'");

        let err = Error::from(err);
        assert!(matches!(err, Error::Load(LoadError { cause: LoadCause::Syntax(_), .. })));
    }

    #[test]
    fn test_discovery_error_names_directory_once() {
        let err = LoadError::new("pkg", BuildError::NotFound("pkg".into()));
        assert_eq!(err.to_string(), "cannot process directory: cannot find package directory pkg");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_no_source_files_display() {
        let err = Error::NoSourceFiles { dir: "empty".into() };
        assert_eq!(err.to_string(), "empty: no buildable Go source files");
    }
}
