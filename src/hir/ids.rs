//! Identifiers for package-level declarations.

use std::fmt;

use crate::base::FileId;

/// A package-unique identifier for a top-level declaration.
///
/// Combines the unit the declaration lives in with its position among the
/// unit's declared names.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DeclId {
    /// The unit containing this declaration
    pub file: FileId,
    /// The local ID within the unit
    pub local: LocalDeclId,
}

impl DeclId {
    #[inline]
    pub const fn new(file: FileId, local: LocalDeclId) -> Self {
        Self { file, local }
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({:?}:{})", self.file, self.local.0)
    }
}

/// A unit-local declaration identifier.
///
/// Assigned sequentially, in textual order, to every name a unit declares
/// at the top level (types, funcs, methods, vars and consts alike).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LocalDeclId(pub u32);

impl LocalDeclId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LocalDeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalDeclId({})", self.0)
    }
}

impl From<u32> for LocalDeclId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}
