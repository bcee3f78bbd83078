//! Go syntax: lexer, declaration tree, parser and type rendering.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod render;

use thiserror::Error;

use crate::base::LineCol;

pub use ast::{
    ChanDir, Comment, CommentGroup, Decl, DeclKeyword, Field, FuncDecl, GenDecl, Ident,
    ImportSpec, InterfaceElem, InterfaceType, Signature, SourceFile, Spec, StringLit, StructType,
    TypeExpr, TypeName, TypeSpec, UnionTerm, ValueSpec,
};
pub use parser::{parse_file, parse_header};
pub use render::{RenderError, render_type};

/// A lexical or grammatical error in one file.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{position}: {message}")]
pub struct SyntaxError {
    pub position: LineCol,
    pub message: String,
}

impl SyntaxError {
    pub fn new(position: LineCol, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}
