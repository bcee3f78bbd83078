//! Go lexer.
//!
//! Raw tokens come from a `logos` lexer. On top of that this module applies
//! Go's automatic semicolon insertion and sorts comments into groups, noting
//! which group is the *lead* comment of a token (the doc comment) and which
//! is a *line* comment trailing a token.

use logos::{Lexer, Logos};

use super::SyntaxError;
use super::ast::{Comment, CommentGroup};
use crate::base::{LineIndex, TextRange, TextSize};

/// Kind of a lexical token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f\x{feff}]+")]
pub enum TokenKind {
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("chan")]
    Chan,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("defer")]
    Defer,
    #[token("else")]
    Else,
    #[token("fallthrough")]
    Fallthrough,
    #[token("for")]
    For,
    #[token("func")]
    Func,
    #[token("go")]
    Go,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("package")]
    Package,
    #[token("range")]
    Range,
    #[token("return")]
    Return,
    #[token("select")]
    Select,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("type")]
    Type,
    #[token("var")]
    Var,

    // U+FEFF is skipped as a byte order mark, so it never starts or
    // continues a name.
    #[regex(r"[a-zA-Z_\x{80}-\x{fefe}\x{ff00}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{fefe}\x{ff00}-\x{10FFFF}]*")]
    Ident,
    // Numeric literals only ever get skipped or echoed back, so the
    // pattern is deliberately loose.
    #[regex(r"[0-9]([0-9a-zA-Z_.]|[eEpP][+-])*")]
    #[regex(r"\.[0-9]([0-9a-zA-Z_]|[eEpP][+-])*")]
    Number,
    #[regex(r"'([^'\\\n]|\\[^\n][^'\n]*)'")]
    Rune,
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,
    #[regex(r"`[^`]*`")]
    RawString,

    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("*")]
    Star,
    #[token("|")]
    Pipe,
    #[token("~")]
    Tilde,
    #[token("<-")]
    Arrow,
    #[token("=")]
    Assign,
    #[token(":=")]
    Define,
    #[token("++")]
    #[token("--")]
    IncDec,
    #[token("+")]
    #[token("-")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("^")]
    #[token("<<")]
    #[token(">>")]
    #[token("&^")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("&^=")]
    #[token("&&")]
    #[token("||")]
    #[token("==")]
    #[token("!=")]
    #[token("<")]
    #[token("<=")]
    #[token(">")]
    #[token(">=")]
    #[token("!")]
    Operator,

    /// End of input; appended by [`tokenize`], never produced by logos.
    Eof,
}

fn block_comment(lex: &mut Lexer<TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

impl TokenKind {
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// Whether a line break after this token ends the statement.
    fn inserts_semicolon(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::Rune
                | TokenKind::String
                | TokenKind::RawString
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::IncDec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    /// Whether a token of this kind can begin a type expression.
    pub fn starts_type(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Arrow
                | TokenKind::Func
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::LParen
        )
    }
}

/// A significant (non-comment) token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
    /// 0-indexed line the token starts on.
    pub line: u32,
    /// Set for semicolons inserted at a line break.
    pub implicit: bool,
}

/// Tokens of one file plus the comment groups found between them.
#[derive(Debug)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub comments: Vec<CommentGroup>,
    /// Per token: index into `comments` of its lead comment group.
    pub lead: Vec<Option<usize>>,
    /// Per token: index into `comments` of the line comment trailing it.
    pub trailing: Vec<Option<usize>>,
    pub line_index: LineIndex,
}

impl TokenStream {
    pub fn lead_comment(&self, token: usize) -> Option<&CommentGroup> {
        self.lead.get(token).copied().flatten().map(|idx| &self.comments[idx])
    }

    pub fn line_comment(&self, token: usize) -> Option<&CommentGroup> {
        self.trailing.get(token).copied().flatten().map(|idx| &self.comments[idx])
    }
}

#[derive(Clone, Copy, Debug)]
struct RawItem {
    kind: TokenKind,
    range: TextRange,
    start_line: u32,
    end_line: u32,
    implicit: bool,
}

/// Lex `text` into a [`TokenStream`].
pub fn tokenize(text: &str) -> Result<TokenStream, SyntaxError> {
    let line_index = LineIndex::new(text);
    let items = insert_semicolons(lex_raw(text, &line_index)?, text, &line_index);

    let mut stream = TokenStream {
        tokens: Vec::with_capacity(items.len()),
        comments: Vec::new(),
        lead: Vec::new(),
        trailing: Vec::new(),
        line_index,
    };

    let mut run: Vec<RawItem> = Vec::new();
    for item in items {
        if item.kind.is_comment() {
            run.push(item);
            continue;
        }
        stream.tokens.push(Token {
            kind: item.kind,
            range: item.range,
            line: item.start_line,
            implicit: item.implicit,
        });
        stream.lead.push(None);
        stream.trailing.push(None);
        if !run.is_empty() {
            attach_comments(&mut stream, std::mem::take(&mut run), text);
        }
    }

    Ok(stream)
}

fn lex_raw(text: &str, line_index: &LineIndex) -> Result<Vec<RawItem>, SyntaxError> {
    let mut items = Vec::new();
    let mut lexer = TokenKind::lexer(text);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let range = TextRange::new(TextSize::from(span.start as u32), TextSize::from(span.end as u32));
        let kind = result.map_err(|()| {
            let snippet: String = lexer.slice().chars().take(16).collect();
            SyntaxError::new(
                line_index.line_col(range.start()),
                format!("illegal token {snippet:?}"),
            )
        })?;
        items.push(RawItem {
            kind,
            range,
            start_line: line_index.line(range.start()),
            end_line: line_index.line(range.end()),
            implicit: false,
        });
    }
    Ok(items)
}

fn insert_semicolons(raw: Vec<RawItem>, text: &str, line_index: &LineIndex) -> Vec<RawItem> {
    let mut items = Vec::with_capacity(raw.len() + raw.len() / 4 + 2);
    let mut pending: Option<(TextSize, u32)> = None;

    let semicolon = |end: TextSize, line: u32| RawItem {
        kind: TokenKind::Semicolon,
        range: TextRange::empty(end),
        start_line: line,
        end_line: line,
        implicit: true,
    };

    for item in raw {
        if let Some((end, line)) = pending {
            let breaks_line = item.start_line > line
                || item.kind == TokenKind::LineComment
                || (item.kind == TokenKind::BlockComment && item.end_line > item.start_line);
            if breaks_line {
                items.push(semicolon(end, line));
                pending = None;
            }
        }
        if !item.kind.is_comment() {
            pending = item
                .kind
                .inserts_semicolon()
                .then_some((item.range.end(), item.end_line));
        }
        items.push(item);
    }

    if let Some((end, line)) = pending {
        items.push(semicolon(end, line));
    }

    let eof = TextSize::of(text);
    let eof_line = line_index.line(eof);
    items.push(RawItem {
        kind: TokenKind::Eof,
        range: TextRange::empty(eof),
        start_line: eof_line,
        end_line: eof_line,
        implicit: false,
    });
    items
}

/// Group the comments that sit between the last two tokens of `stream`.
///
/// `prev` is the token before the run (if any), `next` the token just
/// pushed. Mirrors the way go/parser assigns line and lead comments.
fn attach_comments(stream: &mut TokenStream, run: Vec<RawItem>, text: &str) {
    let next_idx = stream.tokens.len() - 1;
    let next = stream.tokens[next_idx];
    let prev_idx = next_idx.checked_sub(1);
    let mut rest = run.as_slice();

    if let Some(prev_idx) = prev_idx {
        let prev_line = stream.line_index.line(stream.tokens[prev_idx].range.end());
        if rest[0].start_line == prev_line {
            let (group, end_line, remaining) = take_group(rest, 0, text);
            let idx = push_group(stream, group);
            if next.line != end_line || next.kind == TokenKind::Semicolon || next.kind == TokenKind::Eof {
                stream.trailing[prev_idx] = Some(idx);
            }
            rest = remaining;
        }
    }

    let mut last = None;
    while !rest.is_empty() {
        let (group, end_line, remaining) = take_group(rest, 1, text);
        last = Some((push_group(stream, group), end_line));
        rest = remaining;
    }

    if let Some((idx, end_line)) = last {
        if end_line + 1 == next.line {
            stream.lead[next_idx] = Some(idx);
        }
    }
}

/// Take comments while each starts at most `gap` lines after the previous ends.
fn take_group<'r>(run: &'r [RawItem], gap: u32, text: &str) -> (CommentGroup, u32, &'r [RawItem]) {
    let mut end_line = run[0].start_line;
    let mut comments = Vec::new();
    let mut taken = 0;
    for item in run {
        if item.start_line > end_line + gap {
            break;
        }
        comments.push(Comment {
            text: text[item.range].to_string(),
            range: item.range,
        });
        end_line = item.end_line;
        taken += 1;
    }
    (CommentGroup { comments }, end_line, &run[taken..])
}

fn push_group(stream: &mut TokenStream, group: CommentGroup) -> usize {
    stream.comments.push(group);
    stream.comments.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .unwrap()
            .tokens
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_and_idents() {
        use TokenKind::*;
        assert_eq!(
            kinds("package types"),
            vec![Package, Ident, Semicolon, Eof]
        );
    }

    #[test]
    fn test_byte_order_mark_and_unicode_names() {
        use TokenKind::*;
        assert_eq!(
            kinds("\u{feff}package größe"),
            vec![Package, Ident, Semicolon, Eof]
        );
    }

    #[test]
    fn test_semicolon_inserted_at_line_end() {
        use TokenKind::*;
        let stream = tokenize("type T struct {\n\tX int\n}\n").unwrap();
        let kinds: Vec<_> = stream.tokens.iter().map(|t| t.kind).collect();

        assert_eq!(
            kinds,
            vec![Type, Ident, Struct, LBrace, Ident, Ident, Semicolon, RBrace, Semicolon, Eof]
        );
        assert!(stream.tokens[6].implicit);
    }

    #[test]
    fn test_no_semicolon_after_operator() {
        use TokenKind::*;
        assert_eq!(kinds("x *\ny"), vec![Ident, Star, Ident, Semicolon, Eof]);
    }

    #[test]
    fn test_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"... `raw` "a\"b" 'x' '\'' 1.5e-3 0x1F"#),
            vec![Ellipsis, RawString, String, Rune, Rune, Number, Number, Semicolon, Eof]
        );
    }

    #[test]
    fn test_channel_arrows() {
        use TokenKind::*;
        assert_eq!(kinds("chan<- int"), vec![Chan, Arrow, Ident, Semicolon, Eof]);
        assert_eq!(kinds("<-chan int"), vec![Arrow, Chan, Ident, Semicolon, Eof]);
    }

    #[test]
    fn test_lead_comment_attaches_to_next_token() {
        let text = "package a\n\n// T is a thing.\n// +gen\ntype T int\n";
        let stream = tokenize(text).unwrap();
        let type_tok = stream
            .tokens
            .iter()
            .position(|t| t.kind == TokenKind::Type)
            .unwrap();

        let lead = stream.lead_comment(type_tok).unwrap();
        assert_eq!(lead.comments.len(), 2);
        assert_eq!(lead.comments[1].text, "// +gen");
    }

    #[test]
    fn test_comment_separated_by_blank_line_is_not_lead() {
        let text = "package a\n\n// floating\n\ntype T int\n";
        let stream = tokenize(text).unwrap();
        let type_tok = stream
            .tokens
            .iter()
            .position(|t| t.kind == TokenKind::Type)
            .unwrap();

        assert!(stream.lead_comment(type_tok).is_none());
        assert_eq!(stream.comments.len(), 1);
    }

    #[test]
    fn test_line_comment_trails_semicolon() {
        let text = "package a\ntype T int // trailing\n";
        let stream = tokenize(text).unwrap();
        let semi = stream
            .tokens
            .iter()
            .rposition(|t| t.kind == TokenKind::Semicolon)
            .unwrap();

        let comment = stream.line_comment(semi).unwrap();
        assert_eq!(comment.comments[0].text, "// trailing");
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        use TokenKind::*;
        let stream = tokenize("x /* a\nb */ y").unwrap();
        let kinds: Vec<_> = stream.tokens.iter().map(|t| t.kind).collect();

        assert_eq!(kinds, vec![Ident, Semicolon, Ident, Semicolon, Eof]);
        assert_eq!(stream.comments.len(), 1);
    }

    #[test]
    fn test_unterminated_block_comment_is_error() {
        let err = tokenize("package a\n/* never closed").unwrap_err();
        assert_eq!(err.position.line_one_indexed(), 2);
    }
}
