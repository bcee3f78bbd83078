//! Foundation types shared by every layer of the pipeline.
//!
//! - [`FileId`] - position of a source unit inside its package
//! - [`TextRange`], [`TextSize`] - byte offsets into source text
//! - [`LineCol`], [`LineIndex`] - offset to line/column conversion
//!
//! Nothing in here depends on the other modules of the crate.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{LineCol, LineIndex, TextRange, TextSize};

pub use text_size;
