//! Render type expressions back to Go spelling.

use thiserror::Error;

use super::ast::{ChanDir, Field, Signature, TypeExpr, TypeName};

/// A type expression that has no single-line Go spelling here.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("inline struct type with fields is not supported")]
    InlineStruct,
    #[error("inline interface type with methods is not supported")]
    InlineInterface,
}

/// Render `ty` the way it would be written in Go source.
///
/// ```
/// # use genbase::syntax::{parse_file, render_type, Decl, Spec};
/// let file = parse_file("package p\ntype T map[string][]*time.Time\n").unwrap();
/// let Decl::Gen(decl) = &file.decls[0] else { unreachable!() };
/// let Spec::Type(spec) = &decl.specs[0] else { unreachable!() };
/// assert_eq!(render_type(&spec.ty).unwrap(), "map[string][]*time.Time");
/// ```
pub fn render_type(ty: &TypeExpr) -> Result<String, RenderError> {
    let mut out = String::new();
    write_type(&mut out, ty)?;
    Ok(out)
}

fn write_type(out: &mut String, ty: &TypeExpr) -> Result<(), RenderError> {
    match ty {
        TypeExpr::Named(name) => write_name(out, name),
        TypeExpr::Instance { base, args } => {
            write_name(out, base);
            out.push('[');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(out, arg)?;
            }
            out.push(']');
        }
        TypeExpr::Pointer(elem) => {
            out.push('*');
            write_type(out, elem)?;
        }
        TypeExpr::Array { len, elem } => {
            out.push('[');
            if let Some(len) = len {
                out.push_str(len);
            }
            out.push(']');
            write_type(out, elem)?;
        }
        TypeExpr::Map { key, value } => {
            out.push_str("map[");
            write_type(out, key)?;
            out.push(']');
            write_type(out, value)?;
        }
        TypeExpr::Chan { dir, elem } => {
            out.push_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            write_type(out, elem)?;
        }
        TypeExpr::Func(sig) => {
            out.push_str("func");
            write_signature(out, sig)?;
        }
        TypeExpr::Struct(st) => {
            if !st.fields.is_empty() {
                return Err(RenderError::InlineStruct);
            }
            out.push_str("struct{}");
        }
        TypeExpr::Interface(iface) => {
            if !iface.elems.is_empty() {
                return Err(RenderError::InlineInterface);
            }
            out.push_str("interface{}");
        }
        TypeExpr::Union(terms) => {
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                if term.tilde {
                    out.push('~');
                }
                write_type(out, &term.ty)?;
            }
        }
        TypeExpr::Paren(inner) => {
            out.push('(');
            write_type(out, inner)?;
            out.push(')');
        }
        TypeExpr::Ellipsis(elem) => {
            out.push_str("...");
            write_type(out, elem)?;
        }
    }
    Ok(())
}

fn write_name(out: &mut String, name: &TypeName) {
    if let Some(package) = &name.package {
        out.push_str(package.as_str());
        out.push('.');
    }
    out.push_str(name.name.as_str());
}

fn write_signature(out: &mut String, sig: &Signature) -> Result<(), RenderError> {
    out.push('(');
    write_fields(out, &sig.params)?;
    out.push(')');

    match sig.results.as_slice() {
        [] => {}
        [single] if single.names.is_empty() => {
            out.push(' ');
            write_type(out, &single.ty)?;
        }
        results => {
            out.push_str(" (");
            write_fields(out, results)?;
            out.push(')');
        }
    }
    Ok(())
}

fn write_fields(out: &mut String, fields: &[Field]) -> Result<(), RenderError> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        for (j, name) in field.names.iter().enumerate() {
            if j > 0 {
                out.push_str(", ");
            }
            out.push_str(name.as_str());
        }
        if !field.names.is_empty() {
            out.push(' ');
        }
        write_type(out, &field.ty)?;
    }
    Ok(())
}
