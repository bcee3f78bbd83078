//! Declaration tree for Go source files.
//!
//! The tree keeps everything a generator needs at the declaration level and
//! nothing below it: function bodies and initializer expressions are skipped
//! by the parser and only recorded as present or absent.
//!
//! Type expressions are an explicit sum type ([`TypeExpr`]) so shape checks
//! are a `match`, not a chain of downcasts.

use smol_str::SmolStr;

use crate::base::TextRange;

// ============================================================================
// LEAVES
// ============================================================================

/// An identifier and where it was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub name: SmolStr,
    pub range: TextRange,
}

impl Ident {
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Exported identifiers start with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// A string literal exactly as written, quotes included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringLit {
    pub raw: String,
    pub range: TextRange,
}

impl StringLit {
    /// The literal's value with quotes removed and escapes decoded.
    ///
    /// Returns `None` for a malformed escape sequence.
    pub fn value(&self) -> Option<String> {
        unquote(&self.raw)
    }
}

/// Decode a Go string literal (interpreted `"..."` or raw `` `...` ``).
pub fn unquote(raw: &str) -> Option<String> {
    if let Some(inner) = raw.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return Some(inner.replace('\r', ""));
    }
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => out.push(hex_escape(&mut chars, 8)?),
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                out.push(char::from_u32(value)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}

/// A single `//` or `/* */` comment, markers included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub range: TextRange,
}

impl Comment {
    pub fn is_block(&self) -> bool {
        self.text.starts_with("/*")
    }

    /// The comment's text lines with markers stripped.
    ///
    /// A `//` comment is one line. Each line of a `/* */` comment is one
    /// line, with a leading `*` (the usual block decoration) removed.
    pub fn lines(&self) -> Vec<&str> {
        if let Some(body) = self.text.strip_prefix("//") {
            return vec![body];
        }
        let body = self
            .text
            .strip_prefix("/*")
            .and_then(|s| s.strip_suffix("*/"))
            .unwrap_or(&self.text);
        body.lines()
            .map(|line| {
                let trimmed = line.trim_start();
                trimmed.strip_prefix('*').unwrap_or(line)
            })
            .collect()
    }
}

/// Adjacent comments with no blank line or token between them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    pub fn range(&self) -> Option<TextRange> {
        let first = self.comments.first()?;
        let last = self.comments.last()?;
        Some(first.range.cover(last.range))
    }

    /// Text of the group in the form `go/ast.CommentGroup.Text` produces.
    ///
    /// Markers and the first space of a line comment are removed, as are
    /// directives such as `//go:generate`. Trailing spaces are trimmed,
    /// runs of blank lines collapse to one, and leading and trailing blank
    /// lines are dropped. A non-empty result ends with a newline.
    pub fn text(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for comment in &self.comments {
            if !comment.is_block() {
                let body = &comment.text[2..];
                if is_directive(body) {
                    continue;
                }
                lines.push(body.strip_prefix(' ').unwrap_or(body).trim_end());
            } else {
                let body = &comment.text[2..comment.text.len().saturating_sub(2).max(2)];
                lines.extend(body.lines().map(str::trim_end));
            }
        }

        let mut out = String::new();
        let mut blank_run = false;
        for line in lines {
            if line.is_empty() {
                blank_run = !out.is_empty();
                continue;
            }
            if blank_run {
                out.push('\n');
                blank_run = false;
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// `//go:generate`, `//line ...`, `//export ...` style comments.
fn is_directive(body: &str) -> bool {
    if body.starts_with("line ") || body.starts_with("extern ") || body.starts_with("export ") {
        return true;
    }
    let Some((word, rest)) = body.split_once(':') else {
        return false;
    };
    !word.is_empty()
        && word.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        && rest.starts_with(|c: char| c.is_ascii_alphanumeric())
}

// ============================================================================
// FILE & DECLARATIONS
// ============================================================================

/// One parsed Go source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Package documentation (lead comment of the package clause).
    pub doc: Option<CommentGroup>,
    pub package: Ident,
    /// Top-level declarations in textual order, import groups included.
    pub decls: Vec<Decl>,
    /// Every comment group in the file, in textual order.
    pub comments: Vec<CommentGroup>,
}

impl SourceFile {
    /// Import specs of the file in textual order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.gen_decls(DeclKeyword::Import).flat_map(|decl| {
            decl.specs.iter().filter_map(|spec| match spec {
                Spec::Import(import) => Some(import),
                _ => None,
            })
        })
    }

    /// Generic declarations introduced by `keyword`.
    pub fn gen_decls(&self, keyword: DeclKeyword) -> impl Iterator<Item = &GenDecl> {
        self.decls.iter().filter_map(move |decl| match decl {
            Decl::Gen(gen_decl) if gen_decl.keyword == keyword => Some(gen_decl),
            _ => None,
        })
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            Decl::Gen(_) => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclKeyword {
    Import,
    Const,
    Type,
    Var,
}

/// An `import`, `const`, `type` or `var` declaration, grouped or not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenDecl {
    pub doc: Option<CommentGroup>,
    pub keyword: DeclKeyword,
    /// Whether the specs were written inside `( ... )`.
    pub grouped: bool,
    pub specs: Vec<Spec>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSpec {
    pub doc: Option<CommentGroup>,
    /// Explicit name: an alias, `.` or `_`.
    pub name: Option<Ident>,
    pub path: StringLit,
    pub comment: Option<CommentGroup>,
}

impl ImportSpec {
    /// The import path without quotes.
    pub fn path_value(&self) -> String {
        self.path
            .value()
            .unwrap_or_else(|| self.path.raw.trim_matches(|c| c == '"' || c == '`').to_string())
    }
}

/// A `const` or `var` spec. Initializer expressions are not kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueSpec {
    pub doc: Option<CommentGroup>,
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub has_values: bool,
    pub comment: Option<CommentGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSpec {
    pub doc: Option<CommentGroup>,
    pub name: Ident,
    pub type_params: Vec<Field>,
    /// `type A = B`
    pub is_alias: bool,
    pub ty: TypeExpr,
    pub comment: Option<CommentGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncDecl {
    pub doc: Option<CommentGroup>,
    /// Receiver parameter list for methods.
    pub recv: Option<Vec<Field>>,
    pub name: Ident,
    pub type_params: Vec<Field>,
    pub signature: Signature,
    pub has_body: bool,
    pub range: TextRange,
}

// ============================================================================
// TYPE EXPRESSIONS
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// A struct field, parameter, result or type parameter entry.
///
/// `names` is empty for embedded fields and unnamed parameters; one entry
/// may declare several names sharing a type (`X, Y int`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub doc: Option<CommentGroup>,
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub tag: Option<StringLit>,
    pub comment: Option<CommentGroup>,
}

impl Field {
    pub fn new(names: Vec<Ident>, ty: TypeExpr) -> Self {
        Self {
            doc: None,
            names,
            ty,
            tag: None,
            comment: None,
        }
    }
}

/// A possibly package-qualified type name: `T` or `pkg.T`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeName {
    pub package: Option<Ident>,
    pub name: Ident,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T`, `pkg.T`
    Named(TypeName),
    /// `T[A, B]`
    Instance { base: TypeName, args: Vec<TypeExpr> },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T` when `len` is `None`, otherwise `[len]T` with the length
    /// expression kept as written.
    Array { len: Option<SmolStr>, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func(Signature),
    Struct(StructType),
    Interface(InterfaceType),
    /// A constraint union `~int | string`.
    Union(Vec<UnionTerm>),
    Paren(Box<TypeExpr>),
    /// Variadic parameter type `...T`.
    Ellipsis(Box<TypeExpr>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnionTerm {
    pub tilde: bool,
    pub ty: TypeExpr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructType {
    pub fields: Vec<Field>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceType {
    pub elems: Vec<InterfaceElem>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterfaceElem {
    Method {
        doc: Option<CommentGroup>,
        name: Ident,
        signature: Signature,
        comment: Option<CommentGroup>,
    },
    Embedded(TypeExpr),
}
