//! Build metadata discovery for one package directory.
//!
//! Decides which files of a directory take part in a build for a given
//! [`BuildContext`]: file-name GOOS/GOARCH suffixes, `//go:build` lines,
//! cgo usage and test files all filter the listing. The directory is read
//! non-recursively and entries are visited in name order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, trace};

use super::constraint::{ConstraintError, file_constraint};
use crate::syntax::{SyntaxError, parse_header};

/// Newest Go release whose `go1.N` tag is satisfied.
pub const RELEASE_MINOR: u32 = 23;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const OTHER_SOURCE_EXTS: &[&str] = &[
    "c", "h", "cc", "cpp", "cxx", "hh", "hpp", "hxx", "m", "f", "F", "for", "f90", "swig",
    "swigcxx", "syso",
];

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot find package directory {}", .0.display())]
    NotFound(PathBuf),
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },
    #[error("{}: {source}", path.display())]
    Constraint {
        path: PathBuf,
        #[source]
        source: ConstraintError,
    },
    #[error("found packages {first} ({first_file}) and {second} ({second_file}) in {}", dir.display())]
    MultiplePackages {
        dir: PathBuf,
        first: SmolStr,
        first_file: String,
        second: SmolStr,
        second_file: String,
    },
}

impl BuildError {
    fn io(path: &Path, source: io::Error) -> Self {
        BuildError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Target platform and tags that decide which files are built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildContext {
    pub goos: SmolStr,
    pub goarch: SmolStr,
    pub cgo_enabled: bool,
    /// Extra tags satisfied in addition to the platform ones.
    pub build_tags: Vec<SmolStr>,
    pub compiler: SmolStr,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::host()
    }
}

impl BuildContext {
    pub fn new(goos: impl Into<SmolStr>, goarch: impl Into<SmolStr>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
            cgo_enabled: false,
            build_tags: Vec::new(),
            compiler: SmolStr::new_inline("gc"),
        }
    }

    /// The platform this process runs on, with cgo enabled.
    pub fn host() -> Self {
        let mut ctx = Self::new(host_goos(), host_goarch());
        ctx.cgo_enabled = true;
        ctx
    }

    /// [`BuildContext::host`] overridden by `GOOS`, `GOARCH` and `CGO_ENABLED`.
    pub fn from_env() -> Self {
        let mut ctx = Self::host();
        if let Some(goos) = non_empty_var("GOOS") {
            ctx.goos = goos.into();
        }
        if let Some(goarch) = non_empty_var("GOARCH") {
            ctx.goarch = goarch.into();
        }
        if let Some(cgo) = non_empty_var("CGO_ENABLED") {
            ctx.cgo_enabled = cgo == "1";
        }
        ctx
    }

    pub fn with_cgo(mut self, enabled: bool) -> Self {
        self.cgo_enabled = enabled;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.build_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Whether a single build tag is satisfied.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || tag == self.compiler {
            return true;
        }
        match tag {
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            "cgo" => self.cgo_enabled,
            _ => {
                if let Some(minor) = tag.strip_prefix("go1.") {
                    return minor
                        .parse::<u32>()
                        .is_ok_and(|minor| (1..=RELEASE_MINOR).contains(&minor));
                }
                self.build_tags.iter().any(|t| t == tag)
            }
        }
    }

    /// Whether the `_GOOS`, `_GOARCH` or `_GOOS_GOARCH` suffix of a file
    /// name matches this context. Names without such a suffix always match.
    pub fn matches_file_name(&self, name: &str) -> bool {
        let stem = name.split('.').next().unwrap_or(name);
        let Some(underscore) = stem.find('_') else {
            return true;
        };
        let mut parts: Vec<&str> = stem[underscore..].split('_').collect();
        if parts.last() == Some(&"test") {
            parts.pop();
        }

        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.matches_tag(parts[n - 2]) && self.matches_tag(parts[n - 1]);
        }
        if n >= 1 && (KNOWN_OS.contains(&parts[n - 1]) || KNOWN_ARCH.contains(&parts[n - 1])) {
            return self.matches_tag(parts[n - 1]);
        }
        true
    }

    /// List the build files of the package in `dir`.
    ///
    /// A directory with no Go files is not an error here: the returned
    /// package simply has empty file lists.
    pub fn import_dir(&self, dir: &Path) -> Result<BuildPackage, BuildError> {
        if !dir.is_dir() {
            return Err(BuildError::NotFound(dir.to_path_buf()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))? {
            let entry = entry.map_err(|e| BuildError::io(dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut pkg = BuildPackage {
            dir: dir.to_path_buf(),
            ..BuildPackage::default()
        };
        let mut first_file = String::new();

        for name in names {
            if name.starts_with('_') || name.starts_with('.') {
                trace!(file = %name, "hidden file");
                continue;
            }
            let ext = name.rsplit_once('.').map_or("", |(_, ext)| ext);
            if !self.matches_file_name(&name) {
                debug!(file = %name, goos = %self.goos, goarch = %self.goarch, "excluded by file name");
                if ext == "go" {
                    pkg.ignored_go_files.push(name);
                }
                continue;
            }
            match ext {
                "go" => {}
                "s" | "S" | "sx" => {
                    pkg.s_files.push(name);
                    continue;
                }
                ext if OTHER_SOURCE_EXTS.contains(&ext) => {
                    pkg.other_files.push(name);
                    continue;
                }
                _ => continue,
            }
            if name.ends_with("_test.go") {
                trace!(file = %name, "test file");
                continue;
            }

            let path = dir.join(&name);
            let text = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;

            let constraint = file_constraint(&text).map_err(|source| BuildError::Constraint {
                path: path.clone(),
                source,
            })?;
            if let Some(constraint) = constraint {
                if !constraint.eval(&|tag: &str| self.matches_tag(tag)) {
                    debug!(file = %name, "excluded by build constraint");
                    pkg.ignored_go_files.push(name);
                    continue;
                }
            }

            let header = parse_header(&text).map_err(|source| BuildError::Syntax {
                path: path.clone(),
                source,
            })?;
            let package = header.package.name.clone();
            if package == "documentation" {
                pkg.ignored_go_files.push(name);
                continue;
            }

            let is_cgo = header.imports().any(|import| import.path_value() == "C");
            if is_cgo && !self.cgo_enabled {
                debug!(file = %name, "excluded: cgo disabled");
                pkg.ignored_go_files.push(name);
                continue;
            }

            if pkg.name.is_empty() {
                pkg.name = package;
                first_file.clone_from(&name);
            } else if pkg.name != package {
                return Err(BuildError::MultiplePackages {
                    dir: dir.to_path_buf(),
                    first: pkg.name,
                    first_file,
                    second: package,
                    second_file: name,
                });
            }

            if is_cgo {
                pkg.cgo_files.push(name);
            } else {
                pkg.go_files.push(name);
            }
        }

        debug!(
            dir = %dir.display(),
            package = %pkg.name,
            go_files = pkg.go_files.len(),
            cgo_files = pkg.cgo_files.len(),
            s_files = pkg.s_files.len(),
            "discovered package"
        );
        Ok(pkg)
    }
}

/// Files of one package directory, grouped by role. Names are relative to
/// `dir` and sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildPackage {
    pub dir: PathBuf,
    /// Package name; empty when no Go file was kept.
    pub name: SmolStr,
    pub go_files: Vec<String>,
    pub cgo_files: Vec<String>,
    pub s_files: Vec<String>,
    pub other_files: Vec<String>,
    /// Go files excluded by the build context.
    pub ignored_go_files: Vec<String>,
}

impl BuildPackage {
    /// Go files, then cgo files, then assembly files, joined to `dir`.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.go_files
            .iter()
            .chain(&self.cgo_files)
            .chain(&self.s_files)
            .map(|name| self.dir.join(name))
            .collect()
    }

    pub fn has_go_files(&self) -> bool {
        !self.go_files.is_empty() || !self.cgo_files.is_empty()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn host_goos() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_goarch() -> &'static str {
    match std::env::consts::ARCH {
        "x86" => "386",
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        "powerpc64" => "ppc64",
        "wasm32" => "wasm",
        other => other,
    }
}
