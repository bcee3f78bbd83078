//! Identifiers for the source units of a package.

use std::fmt;

/// Handle for one loaded source file.
///
/// Ids are handed out in input order while a package is loaded, so the id
/// doubles as the file's position in [`PackageModel::units`].
///
/// [`PackageModel::units`]: crate::model::PackageModel::units
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a FileId from its load position.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Position of the file in load order.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

impl From<usize> for FileId {
    #[inline]
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}
