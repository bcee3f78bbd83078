//! Loading a package: read, parse, resolve.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use super::build::BuildContext;
use crate::base::FileId;
use crate::error::{Error, LoadCause, LoadError};
use crate::hir::{Importer, SourceUnit, StdImporter, check_package};
use crate::model::PackageModel;

/// Loads one Go package into a [`PackageModel`].
///
/// Files are read and parsed one after another in input order, and the
/// first file that fails stops the load. By default a package that does
/// not resolve is an error; with `skip_semantics_check` the failure is
/// logged and the model comes back without a type table.
///
/// ```
/// use genbase::Parser;
///
/// let pkg = Parser::default()
///     .parse_string_source("point.go", "package geo\n\ntype Point struct { X, Y int }\n")
///     .unwrap();
/// assert_eq!(pkg.package_name(), "geo");
/// assert_eq!(pkg.by_name(&["Point"]).len(), 1);
/// ```
#[derive(Debug)]
pub struct Parser {
    pub skip_semantics_check: bool,
    /// Decides which files of a directory are built.
    pub build_context: BuildContext,
    pub importer: Box<dyn Importer>,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            skip_semantics_check: false,
            build_context: BuildContext::default(),
            importer: Box::new(StdImporter),
        }
    }
}

enum Input<'s> {
    File(PathBuf),
    Text(PathBuf, &'s str),
}

impl Input<'_> {
    fn path(&self) -> &Path {
        match self {
            Input::File(path) | Input::Text(path, _) => path,
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_semantics_check(mut self, skip: bool) -> Self {
        self.skip_semantics_check = skip;
        self
    }

    pub fn with_build_context(mut self, context: BuildContext) -> Self {
        self.build_context = context;
        self
    }

    pub fn with_importer(mut self, importer: impl Importer + 'static) -> Self {
        self.importer = Box::new(importer);
        self
    }

    /// Load the files of `dir` that the build context selects: Go files,
    /// then cgo files, then assembly files.
    pub fn parse_package_dir(&self, dir: impl AsRef<Path>) -> Result<PackageModel, Error> {
        let dir = dir.as_ref();
        let pkg = self
            .build_context
            .import_dir(dir)
            .map_err(|err| LoadError::new(dir, LoadCause::Discovery(err)))?;
        let inputs = pkg.source_paths().into_iter().map(Input::File).collect();
        self.parse_package(dir, inputs)
    }

    /// Load exactly `files`, as a package in `.`.
    pub fn parse_package_files<P: AsRef<Path>>(&self, files: &[P]) -> Result<PackageModel, Error> {
        let inputs = files.iter().map(|p| Input::File(p.as_ref().to_path_buf())).collect();
        self.parse_package(Path::new("."), inputs)
    }

    /// Load a single in-memory file named `name`, as a package in `.`.
    pub fn parse_string_source(&self, name: impl AsRef<Path>, code: &str) -> Result<PackageModel, Error> {
        let inputs = vec![Input::Text(name.as_ref().to_path_buf(), code)];
        self.parse_package(Path::new("."), inputs)
    }

    fn parse_package(&self, dir: &Path, inputs: Vec<Input<'_>>) -> Result<PackageModel, Error> {
        let mut units: Vec<SourceUnit> = Vec::with_capacity(inputs.len());
        for input in inputs {
            if !is_go_file(input.path()) {
                trace!(path = %input.path().display(), "skipping non-Go file");
                continue;
            }
            let (path, text) = match input {
                Input::File(path) => {
                    let text = fs::read_to_string(&path).map_err(|err| LoadError::new(&path, err))?;
                    (path, text)
                }
                Input::Text(path, text) => (path, text.to_string()),
            };

            let id = FileId::from(units.len());
            let unit = SourceUnit::parse(id, &path, text).map_err(|err| LoadError::new(&path, err))?;
            debug!(path = %path.display(), ?id, decls = unit.file().decls.len(), "parsed file");
            units.push(unit);
        }
        if units.is_empty() {
            return Err(Error::NoSourceFiles { dir: dir.to_path_buf() });
        }

        let path = dir.to_string_lossy();
        let types = match check_package(&path, &units, &*self.importer) {
            Ok(types) => Some(types),
            Err(err) if self.skip_semantics_check => {
                warn!(
                    dir = %dir.display(),
                    errors = err.diagnostics.len(),
                    first = %err,
                    "package did not resolve; continuing without types"
                );
                None
            }
            Err(err) => return Err(err.into()),
        };
        PackageModel::new(dir, units, types)
    }
}

fn is_go_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::StaticImporter;

    const UNRESOLVED: &str = "package p\n\nimport \"example.com/missing\"\n\ntype T struct { M missing.Thing }\n";

    #[test]
    fn test_string_source() {
        let pkg = Parser::new()
            .parse_string_source("a.go", "package a\n\ntype T int\n")
            .unwrap();

        assert_eq!(pkg.dir(), Path::new("."));
        assert_eq!(pkg.units()[0].path(), Path::new("a.go"));
        assert!(pkg.types().is_some());
    }

    #[test]
    fn test_non_go_name_is_skipped() {
        let err = Parser::new().parse_string_source("a.txt", "package a\n").unwrap_err();
        assert!(matches!(err, Error::NoSourceFiles { .. }));
    }

    #[test]
    fn test_strict_resolution_error() {
        let err = Parser::new().parse_string_source("a.go", UNRESOLVED).unwrap_err();

        let Error::Resolution(resolution) = &err else {
            panic!("expected resolution error, got {err:?}");
        };
        assert_eq!(resolution.diagnostics.len(), 1);
        assert!(err.to_string().starts_with("a.go:3:8: could not import example.com/missing"));
    }

    #[test]
    fn test_lenient_resolution() {
        let pkg = Parser::new()
            .with_skip_semantics_check(true)
            .parse_string_source("a.go", UNRESOLVED)
            .unwrap();

        assert!(pkg.types().is_none());
        assert_eq!(pkg.all_declarations().len(), 1);
    }

    #[test]
    fn test_custom_importer() {
        let pkg = Parser::new()
            .with_importer(StaticImporter::new().with_path("example.com/missing"))
            .parse_string_source("a.go", UNRESOLVED)
            .unwrap();

        let types = pkg.types().unwrap();
        assert_eq!(types.imports().count(), 1);
    }

    #[test]
    fn test_syntax_error_names_file() {
        let err = Parser::new()
            .parse_string_source("bad.go", "package a\n\ntype T struct {\n")
            .unwrap_err();

        assert!(matches!(&err, Error::Load(LoadError { cause: LoadCause::Syntax(_), .. })));
        assert!(err.to_string().starts_with("parsing package: bad.go: "));
    }

    #[test]
    fn test_missing_file() {
        let err = Parser::new().parse_package_files(&["does/not/exist.go"]).unwrap_err();
        assert!(matches!(err, Error::Load(LoadError { cause: LoadCause::Io(_), .. })));
    }
}
