//! Importers: how the binder learns about imported packages.
//!
//! The binder only needs an imported package's name, used as the default
//! binding of an import without an alias. An [`Importer`] maps an import
//! path to that name, or explains why it cannot.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::trace;

use crate::project::build::{BuildContext, BuildError};

/// A package an import path resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImportedPackage {
    pub path: SmolStr,
    pub name: SmolStr,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot find package \"{0}\"")]
    NotFound(SmolStr),
    #[error("no buildable Go source files in {}", .0.display())]
    NoGoFiles(PathBuf),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Resolves import paths to packages.
pub trait Importer: fmt::Debug + Send + Sync {
    /// Import `path` as seen from a package in `from_dir`.
    fn import(&self, path: &str, from_dir: &Path) -> Result<ImportedPackage, ImportError>;
}

impl<I: Importer + ?Sized> Importer for Box<I> {
    fn import(&self, path: &str, from_dir: &Path) -> Result<ImportedPackage, ImportError> {
        (**self).import(path, from_dir)
    }
}

// ============================================================================
// STANDARD LIBRARY
// ============================================================================

const STD_PACKAGES: &[&str] = &[
    "archive/tar", "archive/zip", "bufio", "bytes", "cmp", "compress/bzip2", "compress/flate",
    "compress/gzip", "compress/lzw", "compress/zlib", "container/heap", "container/list",
    "container/ring", "context", "crypto", "crypto/aes", "crypto/cipher", "crypto/des",
    "crypto/dsa", "crypto/ecdh", "crypto/ecdsa", "crypto/ed25519", "crypto/elliptic",
    "crypto/hmac", "crypto/md5", "crypto/rand", "crypto/rc4", "crypto/rsa", "crypto/sha1",
    "crypto/sha256", "crypto/sha512", "crypto/subtle", "crypto/tls", "crypto/x509",
    "crypto/x509/pkix", "database/sql", "database/sql/driver", "debug/buildinfo", "debug/dwarf",
    "debug/elf", "debug/gosym", "debug/macho", "debug/pe", "debug/plan9obj", "embed", "encoding",
    "encoding/ascii85", "encoding/asn1", "encoding/base32", "encoding/base64", "encoding/binary",
    "encoding/csv", "encoding/gob", "encoding/hex", "encoding/json", "encoding/pem",
    "encoding/xml", "errors", "expvar", "flag", "fmt", "go/ast", "go/build", "go/build/constraint",
    "go/constant", "go/doc", "go/format", "go/importer", "go/parser", "go/printer", "go/scanner",
    "go/token", "go/types", "hash", "hash/adler32", "hash/crc32", "hash/crc64", "hash/fnv",
    "hash/maphash", "html", "html/template", "image", "image/color", "image/color/palette",
    "image/draw", "image/gif", "image/jpeg", "image/png", "index/suffixarray", "io", "io/fs",
    "io/ioutil", "iter", "log", "log/slog", "log/syslog", "maps", "math", "math/big", "math/bits",
    "math/cmplx", "math/rand", "math/rand/v2", "mime", "mime/multipart", "mime/quotedprintable",
    "net", "net/http", "net/http/cookiejar", "net/http/httptest", "net/http/httptrace",
    "net/http/httputil", "net/http/pprof", "net/mail", "net/netip", "net/rpc", "net/rpc/jsonrpc",
    "net/smtp", "net/textproto", "net/url", "os", "os/exec", "os/signal", "os/user", "path",
    "path/filepath", "plugin", "reflect", "regexp", "regexp/syntax", "runtime", "runtime/debug",
    "runtime/pprof", "runtime/trace", "slices", "sort", "strconv", "strings", "sync",
    "sync/atomic", "syscall", "testing", "testing/fstest", "testing/iotest", "testing/quick",
    "text/scanner", "text/tabwriter", "text/template", "text/template/parse", "time",
    "time/tzdata", "unicode", "unicode/utf16", "unicode/utf8", "unique", "unsafe",
];

/// Default package name for an import path: its last element, skipping a
/// trailing major-version element such as `v2`.
pub fn default_package_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].bytes().all(|b| b.is_ascii_digit());
    if is_version {
        if let Some(prev) = segments.next() {
            return prev;
        }
    }
    last
}

/// Knows the import paths of the Go standard library.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdImporter;

impl StdImporter {
    pub fn contains(path: &str) -> bool {
        STD_PACKAGES.binary_search(&path).is_ok()
    }
}

impl Importer for StdImporter {
    fn import(&self, path: &str, _from_dir: &Path) -> Result<ImportedPackage, ImportError> {
        if !Self::contains(path) {
            return Err(ImportError::NotFound(path.into()));
        }
        Ok(ImportedPackage {
            path: path.into(),
            name: default_package_name(path).into(),
        })
    }
}

// ============================================================================
// STATIC TABLE
// ============================================================================

/// Caller-supplied table of import path to package name.
#[derive(Clone, Debug, Default)]
pub struct StaticImporter {
    packages: IndexMap<SmolStr, SmolStr>,
}

impl StaticImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path`, named after its last element.
    pub fn with_path(self, path: &str) -> Self {
        let name = default_package_name(path).to_string();
        self.with_package(path, name)
    }

    pub fn with_package(mut self, path: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        self.packages.insert(path.into(), name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl Importer for StaticImporter {
    fn import(&self, path: &str, _from_dir: &Path) -> Result<ImportedPackage, ImportError> {
        self.packages
            .get_key_value(path)
            .map(|(path, name)| ImportedPackage {
                path: path.clone(),
                name: name.clone(),
            })
            .ok_or_else(|| ImportError::NotFound(path.into()))
    }
}

// ============================================================================
// SOURCE TREES
// ============================================================================

/// Finds packages as source directories.
///
/// Relative paths (`./x`, `../x`) resolve against the importing package's
/// directory; other paths are looked up under each source root in turn,
/// GOPATH style (`<root>/<path>`). Anything not found falls back to the
/// standard library.
#[derive(Clone, Debug, Default)]
pub struct SourceImporter {
    roots: Vec<PathBuf>,
    context: BuildContext,
}

impl SourceImporter {
    pub fn new(context: BuildContext) -> Self {
        Self {
            roots: Vec::new(),
            context,
        }
    }

    /// Source roots taken from `$GOPATH` (`<entry>/src` for each entry).
    pub fn from_env() -> Self {
        let mut importer = Self::new(BuildContext::from_env());
        if let Some(gopath) = std::env::var_os("GOPATH") {
            for entry in std::env::split_paths(&gopath) {
                importer.roots.push(entry.join("src"));
            }
        }
        importer
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn import_dir(&self, path: &str, dir: &Path) -> Result<ImportedPackage, ImportError> {
        let pkg = self.context.import_dir(dir)?;
        if !pkg.has_go_files() {
            return Err(ImportError::NoGoFiles(dir.to_path_buf()));
        }
        Ok(ImportedPackage {
            path: path.into(),
            name: pkg.name,
        })
    }
}

impl Importer for SourceImporter {
    fn import(&self, path: &str, from_dir: &Path) -> Result<ImportedPackage, ImportError> {
        if path.starts_with("./") || path.starts_with("../") {
            return self.import_dir(path, &from_dir.join(path));
        }
        for root in &self.roots {
            let dir = root.join(path);
            if dir.is_dir() {
                trace!(path, dir = %dir.display(), "import found under source root");
                return self.import_dir(path, &dir);
            }
        }
        StdImporter.import(path, from_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_std_package_list_is_sorted() {
        assert!(STD_PACKAGES.windows(2).all(|w| w[0] < w[1]));
    }

    #[rstest]
    #[case("fmt", "fmt")]
    #[case("encoding/json", "json")]
    #[case("math/rand/v2", "rand")]
    #[case("github.com/favclip/genbase", "genbase")]
    #[case("gopkg.in/yaml.v3", "yaml.v3")]
    #[case("example.com/v2", "example.com")]
    fn test_default_package_name(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(default_package_name(path), expected);
    }

    #[test]
    fn test_std_importer() {
        let pkg = StdImporter.import("time", Path::new(".")).unwrap();
        assert_eq!(pkg.name, "time");
        assert!(matches!(
            StdImporter.import("github.com/x/y", Path::new(".")),
            Err(ImportError::NotFound(_))
        ));
    }

    #[test]
    fn test_static_importer() {
        let importer = StaticImporter::new()
            .with_path("google.golang.org/appengine/datastore")
            .with_package("gopkg.in/yaml.v3", "yaml");

        let pkg = importer.import("gopkg.in/yaml.v3", Path::new(".")).unwrap();
        assert_eq!(pkg.name, "yaml");
        assert_eq!(importer.len(), 2);
        assert!(importer.import("fmt", Path::new(".")).is_err());
    }

    #[test]
    fn test_source_importer_finds_root_package() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("example.com/shapes");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("shapes.go"), "package geometry\n").unwrap();

        let importer = SourceImporter::new(BuildContext::new("linux", "amd64")).with_root(root.path());
        let pkg = importer.import("example.com/shapes", Path::new(".")).unwrap();

        assert_eq!(pkg.name, "geometry");
        assert_eq!(importer.import("strings", Path::new(".")).unwrap().name, "strings");
    }

    #[test]
    fn test_source_importer_relative_path() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("app/sub")).unwrap();
        std::fs::write(root.path().join("app/sub/sub.go"), "package sub\n").unwrap();

        let importer = SourceImporter::new(BuildContext::new("linux", "amd64"));
        let pkg = importer.import("./sub", &root.path().join("app")).unwrap();
        assert_eq!(pkg.name, "sub");

        let err = importer.import("./missing", &root.path().join("app")).unwrap_err();
        assert!(matches!(err, ImportError::Build(BuildError::NotFound(_))));
    }
}
