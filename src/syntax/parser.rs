//! Recursive-descent parser for Go declarations.
//!
//! Parses the package clause, imports and every top-level declaration with
//! the full type grammar (generics included). Function bodies and
//! `const`/`var` initializers are skipped as balanced token runs.

use smol_str::SmolStr;

use super::SyntaxError;
use super::ast::*;
use super::lexer::{Token, TokenKind, TokenStream, tokenize};
use crate::base::{TextRange, TextSize};

type PResult<T> = Result<T, SyntaxError>;

/// Parse one Go source file.
pub fn parse_file(text: &str) -> Result<SourceFile, SyntaxError> {
    let stream = tokenize(text)?;
    Parser {
        text,
        stream,
        pos: 0,
        header_only: false,
    }
    .source_file()
}

/// Parse only the package clause and the imports of a file.
///
/// The declarations after the import block are not looked at, so syntax
/// errors further down the file go unnoticed.
pub fn parse_header(text: &str) -> Result<SourceFile, SyntaxError> {
    let stream = tokenize(text)?;
    Parser {
        text,
        stream,
        pos: 0,
        header_only: true,
    }
    .source_file()
}

struct Parser<'t> {
    text: &'t str,
    stream: TokenStream,
    pos: usize,
    header_only: bool,
}

impl<'t> Parser<'t> {
    // ========================================================================
    // CURSOR
    // ========================================================================

    fn current(&self) -> Token {
        self.stream.tokens[self.pos]
    }

    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn nth(&self, n: usize) -> TokenKind {
        self.stream
            .tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |tok| tok.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn bump(&mut self) -> Token {
        let tok = self.current();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn prev_end(&self) -> TextSize {
        self.stream.tokens[self.pos.saturating_sub(1)].range.end()
    }

    fn slice(&self, tok: Token) -> &'t str {
        &self.text[tok.range]
    }

    fn error_at(&self, offset: TextSize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.stream.line_index.line_col(offset), message)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let tok = self.current();
        let found = match tok.kind {
            TokenKind::Semicolon if tok.implicit => "newline".to_string(),
            TokenKind::Eof => "EOF".to_string(),
            TokenKind::Ident
            | TokenKind::Number
            | TokenKind::Rune
            | TokenKind::String
            | TokenKind::RawString => self.slice(tok).to_string(),
            _ => format!("'{}'", self.slice(tok)),
        };
        self.error_at(tok.range.start(), format!("expected {expected}, found {found}"))
    }

    fn lead(&self) -> Option<CommentGroup> {
        self.stream.lead_comment(self.pos).cloned()
    }

    /// Consume a statement terminator, returning the line comment after it.
    ///
    /// The terminator may be omitted before a closing `)` or `}`.
    fn expect_semi(&mut self) -> PResult<Option<CommentGroup>> {
        match self.kind() {
            TokenKind::Semicolon => {
                let comment = self.stream.line_comment(self.pos).cloned();
                self.bump();
                Ok(comment)
            }
            TokenKind::RParen | TokenKind::RBrace | TokenKind::Eof => Ok(None),
            _ => Err(self.unexpected("';'")),
        }
    }

    /// Line comment after the upcoming terminator, without consuming it.
    fn trailing_comment(&self) -> Option<CommentGroup> {
        if self.at(TokenKind::Semicolon) {
            self.stream.line_comment(self.pos).cloned()
        } else {
            None
        }
    }

    fn ident(&mut self) -> PResult<Ident> {
        let tok = self.expect(TokenKind::Ident, "identifier")?;
        Ok(Ident {
            name: SmolStr::new(self.slice(tok)),
            range: tok.range,
        })
    }

    fn ident_list(&mut self) -> PResult<Vec<Ident>> {
        let mut names = vec![self.ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    fn string_lit(&mut self) -> Option<StringLit> {
        if !matches!(self.kind(), TokenKind::String | TokenKind::RawString) {
            return None;
        }
        let tok = self.bump();
        Some(StringLit {
            raw: self.slice(tok).to_string(),
            range: tok.range,
        })
    }

    // ========================================================================
    // FILE & DECLARATIONS
    // ========================================================================

    fn source_file(mut self) -> PResult<SourceFile> {
        let doc = self.lead();
        self.expect(TokenKind::Package, "'package'")?;
        let package = self.ident()?;
        if package.is_blank() {
            return Err(self.error_at(package.range.start(), "invalid package name _"));
        }
        self.expect_semi()?;

        let mut decls = Vec::new();
        while self.at(TokenKind::Import) {
            decls.push(Decl::Gen(self.gen_decl(DeclKeyword::Import)?));
            self.expect_semi()?;
        }

        while !self.header_only && !self.at(TokenKind::Eof) {
            let decl = match self.kind() {
                TokenKind::Const => Decl::Gen(self.gen_decl(DeclKeyword::Const)?),
                TokenKind::Var => Decl::Gen(self.gen_decl(DeclKeyword::Var)?),
                TokenKind::Type => Decl::Gen(self.gen_decl(DeclKeyword::Type)?),
                TokenKind::Func => Decl::Func(self.func_decl()?),
                TokenKind::Import => {
                    let start = self.current().range.start();
                    return Err(self.error_at(start, "imports must appear before other declarations"));
                }
                _ => return Err(self.unexpected("declaration")),
            };
            decls.push(decl);
            self.expect_semi()?;
        }

        Ok(SourceFile {
            doc,
            package,
            decls,
            comments: std::mem::take(&mut self.stream.comments),
        })
    }

    fn gen_decl(&mut self, keyword: DeclKeyword) -> PResult<GenDecl> {
        let doc = self.lead();
        let start = self.bump().range.start();
        let grouped = self.eat(TokenKind::LParen);

        let mut specs = Vec::new();
        if grouped {
            while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                specs.push(self.spec(keyword, true)?);
            }
            self.expect(TokenKind::RParen, "')'")?;
        } else {
            specs.push(self.spec(keyword, false)?);
        }

        Ok(GenDecl {
            doc,
            keyword,
            grouped,
            specs,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    fn spec(&mut self, keyword: DeclKeyword, grouped: bool) -> PResult<Spec> {
        let doc = self.lead();
        let mut spec = match keyword {
            DeclKeyword::Import => Spec::Import(self.import_spec(doc)?),
            DeclKeyword::Type => Spec::Type(self.type_spec(doc)?),
            DeclKeyword::Const | DeclKeyword::Var => Spec::Value(self.value_spec(doc)?),
        };

        let comment = if grouped {
            self.expect_semi()?
        } else {
            self.trailing_comment()
        };
        match &mut spec {
            Spec::Import(s) => s.comment = comment,
            Spec::Type(s) => s.comment = comment,
            Spec::Value(s) => s.comment = comment,
        }
        Ok(spec)
    }

    fn import_spec(&mut self, doc: Option<CommentGroup>) -> PResult<ImportSpec> {
        let name = match self.kind() {
            TokenKind::Ident => Some(self.ident()?),
            TokenKind::Dot => {
                let tok = self.bump();
                Some(Ident {
                    name: SmolStr::new_inline("."),
                    range: tok.range,
                })
            }
            _ => None,
        };
        let path = match self.string_lit() {
            Some(path) => path,
            None => return Err(self.unexpected("import path")),
        };
        Ok(ImportSpec {
            doc,
            name,
            path,
            comment: None,
        })
    }

    fn type_spec(&mut self, doc: Option<CommentGroup>) -> PResult<TypeSpec> {
        let name = self.ident()?;
        let type_params = if self.at(TokenKind::LBracket) && self.type_params_follow() {
            self.type_parameters()?
        } else {
            Vec::new()
        };
        let is_alias = self.eat(TokenKind::Assign);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            doc,
            name,
            type_params,
            is_alias,
            ty,
            comment: None,
        })
    }

    /// At `[` after a type name: type parameters rather than an array length?
    ///
    /// `[N * X]` is a product unless `X` starts a composite type or a
    /// trailing comma forces a parameter list, as in `[T *C,]`.
    fn type_params_follow(&self) -> bool {
        if self.nth(1) != TokenKind::Ident {
            return false;
        }
        match self.nth(2) {
            TokenKind::Star => match self.nth(3) {
                TokenKind::LBracket
                | TokenKind::Struct
                | TokenKind::Func
                | TokenKind::Interface
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Arrow => true,
                _ => self.comma_before_close(),
            },
            TokenKind::Ident
            | TokenKind::Comma
            | TokenKind::LBracket
            | TokenKind::Tilde
            | TokenKind::Interface
            | TokenKind::Func
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Struct
            | TokenKind::Arrow => true,
            _ => false,
        }
    }

    /// At `[`: is there a comma at bracket depth zero before its `]`?
    fn comma_before_close(&self) -> bool {
        let mut depth = 0usize;
        for tok in self.stream.tokens.get(self.pos + 1..).unwrap_or_default() {
            match tok.kind {
                TokenKind::Comma if depth == 0 => return true,
                TokenKind::LBracket | TokenKind::LParen | TokenKind::LBrace => depth += 1,
                TokenKind::RBracket | TokenKind::RParen | TokenKind::RBrace => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon | TokenKind::Eof => return false,
                _ => {}
            }
        }
        false
    }

    fn value_spec(&mut self, doc: Option<CommentGroup>) -> PResult<ValueSpec> {
        let names = self.ident_list()?;
        let ty = match self.kind() {
            TokenKind::Assign | TokenKind::Semicolon | TokenKind::RParen | TokenKind::Eof => None,
            _ => Some(self.parse_type()?),
        };
        let has_values = self.eat(TokenKind::Assign);
        if has_values {
            self.skip_expr_list()?;
        }
        Ok(ValueSpec {
            doc,
            names,
            ty,
            has_values,
            comment: None,
        })
    }

    /// Skip an initializer expression list up to the end of the spec.
    fn skip_expr_list(&mut self) -> PResult<()> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon if depth == 0 => break,
                TokenKind::Eof => {
                    if depth > 0 {
                        return Err(self.unexpected("expression"));
                    }
                    break;
                }
                _ => {}
            }
            self.bump();
        }
        if self.pos == start {
            return Err(self.unexpected("expression"));
        }
        Ok(())
    }

    fn func_decl(&mut self) -> PResult<FuncDecl> {
        let doc = self.lead();
        let start = self.bump().range.start();
        let recv = if self.at(TokenKind::LParen) {
            Some(self.parameters()?)
        } else {
            None
        };
        let name = self.ident()?;
        let type_params = if self.at(TokenKind::LBracket) {
            self.type_parameters()?
        } else {
            Vec::new()
        };
        let signature = self.signature()?;
        let has_body = self.at(TokenKind::LBrace);
        if has_body {
            self.skip_block()?;
        }
        Ok(FuncDecl {
            doc,
            recv,
            name,
            type_params,
            signature,
            has_body,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    fn skip_block(&mut self) -> PResult<()> {
        let open = self.bump();
        let mut depth = 1usize;
        while depth > 0 {
            match self.kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => {
                    return Err(self.error_at(open.range.start(), "function body is not closed"));
                }
                _ => {}
            }
            self.bump();
        }
        Ok(())
    }

    // ========================================================================
    // PARAMETERS
    // ========================================================================

    fn parameters(&mut self) -> PResult<Vec<Field>> {
        self.expect(TokenKind::LParen, "'('")?;
        self.field_list(TokenKind::RParen, false)
    }

    fn type_parameters(&mut self) -> PResult<Vec<Field>> {
        let open = self.expect(TokenKind::LBracket, "'['")?;
        if self.at(TokenKind::RBracket) {
            return Err(self.error_at(open.range.start(), "empty type parameter list"));
        }
        self.field_list(TokenKind::RBracket, true)
    }

    /// Parse entries up to `close`, then group names with the type after them.
    ///
    /// `(a, b int, c string)` and `(int, string)` are both valid; a list
    /// mixing the two forms is not.
    fn field_list(&mut self, close: TokenKind, type_params: bool) -> PResult<Vec<Field>> {
        let start = self.current().range.start();
        let mut entries = Vec::new();
        while !self.at(close) && !self.at(TokenKind::Eof) {
            entries.push(if type_params {
                self.type_param_entry(close)?
            } else {
                self.param_entry()?
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let what = if close == TokenKind::RParen { "')'" } else { "']'" };
        self.expect(close, what)?;

        let named = type_params || entries.iter().any(|(name, ty)| name.is_some() && ty.is_some());
        if !named {
            return Ok(entries
                .into_iter()
                .filter_map(|(_, ty)| ty)
                .map(|ty| Field::new(Vec::new(), ty))
                .collect());
        }

        let mut fields = Vec::new();
        let mut pending = Vec::new();
        for entry in entries {
            match entry {
                (Some(name), Some(ty)) => {
                    pending.push(name);
                    fields.push(Field::new(std::mem::take(&mut pending), ty));
                }
                (Some(name), None) => pending.push(name),
                (None, Some(TypeExpr::Named(TypeName { package: None, name }))) => pending.push(name),
                (None, _) => {
                    return Err(self.error_at(start, "mixed named and unnamed parameters"));
                }
            }
        }
        if !pending.is_empty() {
            let message = if type_params {
                "missing type constraint"
            } else {
                "mixed named and unnamed parameters"
            };
            return Err(self.error_at(start, message));
        }
        Ok(fields)
    }

    fn param_entry(&mut self) -> PResult<(Option<Ident>, Option<TypeExpr>)> {
        if !self.at(TokenKind::Ident) {
            return Ok((None, Some(self.param_type()?)));
        }
        if self.nth(1) == TokenKind::LBracket && self.array_follows_name() {
            let name = self.ident()?;
            return Ok((Some(name), Some(self.param_type()?)));
        }
        let ty = self.parse_type()?;
        if self.at(TokenKind::Comma) || self.at(TokenKind::RParen) {
            return Ok((None, Some(ty)));
        }
        match ty {
            TypeExpr::Named(TypeName { package: None, name }) => Ok((Some(name), Some(self.param_type()?))),
            _ => Err(self.unexpected("',' or ')'")),
        }
    }

    fn type_param_entry(&mut self, close: TokenKind) -> PResult<(Option<Ident>, Option<TypeExpr>)> {
        let name = self.ident()?;
        if self.at(TokenKind::Comma) || self.at(close) {
            return Ok((Some(name), None));
        }
        Ok((Some(name), Some(self.constraint()?)))
    }

    fn param_type(&mut self) -> PResult<TypeExpr> {
        if self.eat(TokenKind::Ellipsis) {
            return Ok(TypeExpr::Ellipsis(Box::new(self.parse_type()?)));
        }
        self.parse_type()
    }

    /// At `name [`: is this a name followed by an array type, as opposed
    /// to a generic instantiation `Name[Args]`?
    ///
    /// Decided by what follows the matching `]`: an array type continues
    /// with its element type.
    fn array_follows_name(&self) -> bool {
        if self.nth(2) == TokenKind::RBracket {
            return true;
        }
        let mut depth = 0usize;
        for (offset, tok) in self.stream.tokens[self.pos + 1..].iter().enumerate() {
            match tok.kind {
                TokenKind::LBracket | TokenKind::LParen | TokenKind::LBrace => depth += 1,
                TokenKind::RBracket | TokenKind::RParen | TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let after = self.pos + 1 + offset + 1;
                        return self
                            .stream
                            .tokens
                            .get(after)
                            .is_some_and(|next| next.kind.starts_type());
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
        }
        false
    }

    fn signature(&mut self) -> PResult<Signature> {
        let params = self.parameters()?;
        let results = if self.at(TokenKind::LParen) {
            self.parameters()?
        } else if self.kind().starts_type() {
            vec![Field::new(Vec::new(), self.parse_type()?)]
        } else {
            Vec::new()
        };
        Ok(Signature { params, results })
    }

    // ========================================================================
    // TYPES
    // ========================================================================

    fn parse_type(&mut self) -> PResult<TypeExpr> {
        match self.kind() {
            TokenKind::Ident => {
                let name = self.type_name()?;
                self.maybe_instance(name)
            }
            TokenKind::Star => {
                self.bump();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::LBracket => {
                self.bump();
                let len = if self.eat(TokenKind::RBracket) {
                    None
                } else {
                    let len = self.array_len()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    Some(len)
                };
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Map => {
                self.bump();
                self.expect(TokenKind::LBracket, "'['")?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Chan => {
                self.bump();
                let dir = if self.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Arrow => {
                self.bump();
                self.expect(TokenKind::Chan, "'chan'")?;
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Func => {
                self.bump();
                Ok(TypeExpr::Func(self.signature()?))
            }
            TokenKind::Struct => Ok(TypeExpr::Struct(self.struct_type()?)),
            TokenKind::Interface => Ok(TypeExpr::Interface(self.interface_type()?)),
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn type_name(&mut self) -> PResult<TypeName> {
        let first = self.ident()?;
        if self.eat(TokenKind::Dot) {
            let name = self.ident()?;
            return Ok(TypeName {
                package: Some(first),
                name,
            });
        }
        Ok(TypeName {
            package: None,
            name: first,
        })
    }

    fn maybe_instance(&mut self, base: TypeName) -> PResult<TypeExpr> {
        if !self.at(TokenKind::LBracket) || self.nth(1) == TokenKind::RBracket {
            return Ok(TypeExpr::Named(base));
        }
        self.bump();
        let mut args = Vec::new();
        while !self.at(TokenKind::RBracket) {
            args.push(self.parse_type()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(TypeExpr::Instance { base, args })
    }

    /// Array length kept as written: `4`, `N`, `...`, `2*N`.
    fn array_len(&mut self) -> PResult<SmolStr> {
        let start = self.current().range.start();
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::RBracket if depth == 0 => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        return Err(self.unexpected("']'"));
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon | TokenKind::Eof => return Err(self.unexpected("']'")),
                _ => {}
            }
            self.bump();
        }
        Ok(SmolStr::new(&self.text[TextRange::new(start, self.prev_end())]))
    }

    fn struct_type(&mut self) -> PResult<StructType> {
        let start = self.bump().range.start();
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            fields.push(self.field_decl()?);
        }
        let end = self.expect(TokenKind::RBrace, "'}'")?.range.end();
        Ok(StructType {
            fields,
            range: TextRange::new(start, end),
        })
    }

    fn field_decl(&mut self) -> PResult<Field> {
        let doc = self.lead();
        let (names, ty) = match self.kind() {
            TokenKind::Star => {
                self.bump();
                let base = self.type_name()?;
                (Vec::new(), TypeExpr::Pointer(Box::new(self.maybe_instance(base)?)))
            }
            TokenKind::Ident => match self.nth(1) {
                TokenKind::Dot
                | TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::String
                | TokenKind::RawString => {
                    let base = self.type_name()?;
                    (Vec::new(), self.maybe_instance(base)?)
                }
                TokenKind::LBracket if !self.array_follows_name() => {
                    let base = self.type_name()?;
                    (Vec::new(), self.maybe_instance(base)?)
                }
                _ => {
                    let names = self.ident_list()?;
                    (names, self.parse_type()?)
                }
            },
            _ => return Err(self.unexpected("field name or embedded type")),
        };
        let tag = self.string_lit();
        let comment = self.expect_semi()?;
        Ok(Field {
            doc,
            names,
            ty,
            tag,
            comment,
        })
    }

    fn interface_type(&mut self) -> PResult<InterfaceType> {
        let start = self.bump().range.start();
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut elems = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let doc = self.lead();
            if self.at(TokenKind::Ident) && self.nth(1) == TokenKind::LParen {
                let name = self.ident()?;
                let signature = self.signature()?;
                let comment = self.expect_semi()?;
                elems.push(InterfaceElem::Method {
                    doc,
                    name,
                    signature,
                    comment,
                });
            } else {
                let ty = self.constraint()?;
                self.expect_semi()?;
                elems.push(InterfaceElem::Embedded(ty));
            }
        }
        let end = self.expect(TokenKind::RBrace, "'}'")?.range.end();
        Ok(InterfaceType {
            elems,
            range: TextRange::new(start, end),
        })
    }

    /// A type constraint: a type, or a union of `~T` / `T` terms.
    fn constraint(&mut self) -> PResult<TypeExpr> {
        let mut terms = vec![self.union_term()?];
        while self.eat(TokenKind::Pipe) {
            terms.push(self.union_term()?);
        }
        if terms.len() == 1 && !terms[0].tilde {
            return Ok(terms.remove(0).ty);
        }
        Ok(TypeExpr::Union(terms))
    }

    fn union_term(&mut self) -> PResult<UnionTerm> {
        let tilde = self.eat(TokenKind::Tilde);
        Ok(UnionTerm {
            tilde,
            ty: self.parse_type()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn type_specs(file: &SourceFile) -> Vec<&TypeSpec> {
        file.gen_decls(DeclKeyword::Type)
            .flat_map(|decl| decl.specs.iter())
            .filter_map(|spec| match spec {
                Spec::Type(ts) => Some(ts),
                _ => None,
            })
            .collect()
    }

    fn struct_fields(spec: &TypeSpec) -> &[Field] {
        match &spec.ty {
            TypeExpr::Struct(st) => &st.fields,
            other => panic!("not a struct: {other:?}"),
        }
    }

    #[test]
    fn test_package_clause_and_imports() {
        let file = parse_file(
            r#"// Package model holds things.
package model

import "fmt"

import (
    "time"
    ds "google.golang.org/appengine/datastore"
    . "strings"
    _ "embed"
)
"#,
        )
        .unwrap();

        assert_eq!(file.package.as_str(), "model");
        assert_eq!(file.doc.as_ref().unwrap().text(), "Package model holds things.\n");

        let imports: Vec<_> = file.imports().collect();
        assert_eq!(imports.len(), 5);
        assert_eq!(imports[0].path_value(), "fmt");
        assert_eq!(imports[2].name.as_ref().unwrap().as_str(), "ds");
        assert_eq!(imports[3].name.as_ref().unwrap().as_str(), ".");
        assert_eq!(imports[4].path_value(), "embed");
    }

    #[test]
    fn test_point_struct() {
        let file = parse_file("package p\ntype Point struct { X int; Y *int; Tags []string }\n").unwrap();
        let specs = type_specs(&file);

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name.as_str(), "Point");
        let fields = struct_fields(specs[0]);
        assert_eq!(fields.len(), 3);
        assert!(matches!(fields[1].ty, TypeExpr::Pointer(_)));
        assert!(matches!(fields[2].ty, TypeExpr::Array { len: None, .. }));
    }

    #[test]
    fn test_grouped_type_decl_docs() {
        let file = parse_file(
            r#"package p

// Group doc.
type (
    // A doc.
    A struct{}

    B int // B trailing
)
"#,
        )
        .unwrap();
        let decl = file.gen_decls(DeclKeyword::Type).next().unwrap();
        let specs = type_specs(&file);

        assert!(decl.grouped);
        assert_eq!(decl.doc.as_ref().unwrap().text(), "Group doc.\n");
        assert_eq!(specs[0].doc.as_ref().unwrap().text(), "A doc.\n");
        assert!(specs[1].doc.is_none());
        assert_eq!(specs[1].comment.as_ref().unwrap().text(), "B trailing\n");
    }

    #[test]
    fn test_struct_fields_tags_and_embedding() {
        let file = parse_file(
            r#"package p
type T struct {
    time.Time
    *Base
    List[int] `json:"list"`
    // Name doc.
    Name, Alias string `json:"name"` // trailing
    buf [4]byte
    items [N]Item
    next func(x int) (bool, error)
}
"#,
        )
        .unwrap();
        let fields = struct_fields(type_specs(&file)[0]);

        assert_eq!(fields.len(), 7);
        assert!(fields[0].names.is_empty());
        assert!(matches!(&fields[0].ty, TypeExpr::Named(TypeName { package: Some(p), .. }) if p.as_str() == "time"));
        assert!(matches!(fields[1].ty, TypeExpr::Pointer(_)));
        assert!(matches!(fields[2].ty, TypeExpr::Instance { .. }));
        assert_eq!(fields[2].tag.as_ref().unwrap().value().as_deref(), Some("json:\"list\""));
        assert_eq!(fields[3].names.len(), 2);
        assert_eq!(fields[3].doc.as_ref().unwrap().text(), "Name doc.\n");
        assert_eq!(fields[3].comment.as_ref().unwrap().text(), "trailing\n");
        assert!(matches!(&fields[4].ty, TypeExpr::Array { len: Some(len), .. } if len == "4"));
        assert!(matches!(&fields[5].ty, TypeExpr::Array { len: Some(len), .. } if len == "N"));
        match &fields[6].ty {
            TypeExpr::Func(sig) => {
                assert_eq!(sig.params.len(), 1);
                assert_eq!(sig.results.len(), 2);
            }
            other => panic!("expected func type, got {other:?}"),
        }
    }

    #[test]
    fn test_generics() {
        let file = parse_file(
            r#"package p
type Pair[K comparable, V any] struct { Key K; Value V }
type Num interface { ~int | ~float64 }
type Arr [N]int
func (p *Pair[K, V]) Swap() {}
func Map[S ~[]E, E any](s S) S { return s }
"#,
        )
        .unwrap();
        let specs = type_specs(&file);

        assert_eq!(specs[0].type_params.len(), 2);
        assert!(specs[2].type_params.is_empty());
        match &specs[1].ty {
            TypeExpr::Interface(iface) => {
                assert!(matches!(&iface.elems[0], InterfaceElem::Embedded(TypeExpr::Union(terms)) if terms.len() == 2));
            }
            other => panic!("expected interface, got {other:?}"),
        }

        let funcs: Vec<_> = file.funcs().collect();
        assert_eq!(funcs[0].name.as_str(), "Swap");
        assert!(matches!(&funcs[0].recv.as_ref().unwrap()[0].ty, TypeExpr::Pointer(inner) if matches!(**inner, TypeExpr::Instance { .. })));
        assert_eq!(funcs[1].type_params.len(), 2);
        assert_eq!(funcs[1].signature.params[0].names[0].as_str(), "s");
    }

    #[rstest]
    #[case("type Buf [N * 2]byte", 0, Some("N * 2"))]
    #[case("type Buf [N * (K + 1)]byte", 0, Some("N * (K + 1)"))]
    #[case("type Buf [N * K]byte", 0, Some("N * K"))]
    #[case("type Buf [N]byte", 0, Some("N"))]
    #[case("type Ptr[T *int,] struct{}", 1, None)]
    #[case("type Ptr[T *[]int] struct{}", 1, None)]
    #[case("type Ptr[T *struct{}] struct{}", 1, None)]
    #[case("type List[T []int] struct{}", 1, None)]
    #[case("type Fixed[T [4]int] struct{}", 1, None)]
    fn test_array_length_or_type_params(
        #[case] decl: &str,
        #[case] params: usize,
        #[case] len: Option<&str>,
    ) {
        let file = parse_file(&format!("package p\nconst N, K = 4, 1\n{decl}\n")).unwrap();
        let spec = type_specs(&file)[0];

        assert_eq!(spec.type_params.len(), params);
        match &spec.ty {
            TypeExpr::Array { len: found, .. } => assert_eq!(found.as_deref(), len),
            _ => assert_eq!(len, None),
        }
    }

    #[test]
    fn test_parameter_grouping() {
        let file = parse_file("package p\nfunc f(a, b int, c ...string) (n int, err error)\nfunc g(int, string)\n").unwrap();
        let funcs: Vec<_> = file.funcs().collect();

        let params = &funcs[0].signature.params;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].names.len(), 2);
        assert!(matches!(params[1].ty, TypeExpr::Ellipsis(_)));
        assert!(!funcs[0].has_body);
        assert!(funcs[1].signature.params.iter().all(|p| p.names.is_empty()));
    }

    #[test]
    fn test_bodies_and_initializers_are_skipped() {
        let file = parse_file(
            r#"package p

var defaults = map[string]T{
    "a": {X: 1},
}

const (
    A = iota
    B
)

func run() {
    type local struct{}
    s := "}{"
    if true { _ = s }
}

type After int
"#,
        )
        .unwrap();
        let specs = type_specs(&file);

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name.as_str(), "After");
        let consts = file.gen_decls(DeclKeyword::Const).next().unwrap();
        assert_eq!(consts.specs.len(), 2);
    }

    #[test]
    fn test_maps_channels_and_aliases() {
        let file = parse_file(
            "package p\ntype A = map[string][]*int\ntype C struct { in <-chan int; out chan<- string }\n",
        )
        .unwrap();
        let specs = type_specs(&file);

        assert!(specs[0].is_alias);
        assert!(matches!(specs[0].ty, TypeExpr::Map { .. }));
        let fields = struct_fields(specs[1]);
        assert!(matches!(fields[0].ty, TypeExpr::Chan { dir: ChanDir::Recv, .. }));
        assert!(matches!(fields[1].ty, TypeExpr::Chan { dir: ChanDir::Send, .. }));
    }

    #[test]
    fn test_header_stops_after_imports() {
        let file = parse_header("package p\nimport \"C\"\nfunc broken( {\n").unwrap();

        assert_eq!(file.package.as_str(), "p");
        assert_eq!(file.imports().count(), 1);
        assert_eq!(file.funcs().count(), 0);
    }

    #[test]
    fn test_missing_package_clause() {
        let err = parse_file("type T int\n").unwrap_err();
        assert_eq!(err.message, "expected 'package', found 'type'");
    }

    #[test]
    fn test_import_after_declaration() {
        let err = parse_file("package p\ntype T int\nimport \"fmt\"\n").unwrap_err();
        assert_eq!(err.position.line_one_indexed(), 3);
        assert!(err.message.contains("imports must appear before"));
    }

    #[test]
    fn test_unclosed_struct() {
        let err = parse_file("package p\ntype T struct {\n X int\n").unwrap_err();
        assert!(err.message.contains("found EOF"), "{}", err.message);
    }

    #[test]
    fn test_newline_in_unexpected_position() {
        let err = parse_file("package p\ntype T\n").unwrap_err();
        assert_eq!(err.message, "expected type, found newline");
    }
}
