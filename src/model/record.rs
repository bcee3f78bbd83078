//! Struct declarations and their fields.

use super::shape::{FieldShape, PrimitiveKind, ShapeError};
use crate::syntax::ast::unquote;
use crate::syntax::{CommentGroup, Field, Ident, StructType, TypeExpr, TypeName, render_type};

/// A type declaration whose definition is a struct.
#[derive(Clone, Copy, Debug)]
pub struct RecordShape<'a> {
    name: &'a str,
    st: &'a StructType,
}

impl<'a> RecordShape<'a> {
    pub(crate) fn new(name: &'a str, st: &'a StructType) -> Self {
        Self { name, st }
    }

    /// Name of the declared type.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Field entries in source order. `X, Y int` is one entry with two names.
    pub fn fields(&self) -> Vec<FieldDeclaration<'a>> {
        self.st.fields.iter().map(FieldDeclaration::new).collect()
    }

    /// The entry declaring `name`, embedded fields included.
    pub fn field(&self, name: &str) -> Option<FieldDeclaration<'a>> {
        self.fields().into_iter().find(|f| f.name() == Some(name) || f.names().iter().any(|n| n.as_str() == name))
    }

    pub fn len(&self) -> usize {
        self.st.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.st.fields.is_empty()
    }

    pub fn ast(&self) -> &'a StructType {
        self.st
    }
}

/// One field entry of a struct.
///
/// Shape predicates look at the outermost layers of the declared type
/// exactly as written. Primitive predicates look at the base type under all
/// pointer and array layers, and hold only when no layer is a pointer.
#[derive(Clone, Copy, Debug)]
pub struct FieldDeclaration<'a> {
    field: &'a Field,
}

impl<'a> FieldDeclaration<'a> {
    pub(crate) fn new(field: &'a Field) -> Self {
        Self { field }
    }

    /// Declared names; empty for an embedded field.
    pub fn names(&self) -> &'a [Ident] {
        &self.field.names
    }

    /// The first declared name, or the type name of an embedded field.
    pub fn name(&self) -> Option<&'a str> {
        if let Some(first) = self.field.names.first() {
            return Some(first.as_str());
        }
        let ty = match &self.field.ty {
            TypeExpr::Pointer(inner) => inner.as_ref(),
            ty => ty,
        };
        match ty {
            TypeExpr::Named(TypeName { name, .. }) | TypeExpr::Instance { base: TypeName { name, .. }, .. } => {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.field.names.is_empty()
    }

    pub fn ty(&self) -> &'a TypeExpr {
        &self.field.ty
    }

    pub fn doc(&self) -> Option<&'a CommentGroup> {
        self.field.doc.as_ref()
    }

    /// Trailing comment on the field's line.
    pub fn comment(&self) -> Option<&'a CommentGroup> {
        self.field.comment.as_ref()
    }

    /// The struct tag, unquoted.
    pub fn tag(&self) -> Option<String> {
        self.field.tag.as_ref().and_then(|tag| tag.value())
    }

    /// Value for `key` in the conventional `key:"value" key2:"value2"` tag
    /// format.
    pub fn tag_lookup(&self, key: &str) -> Option<String> {
        lookup_struct_tag(&self.tag()?, key)
    }

    /// The declared type in Go spelling, or `!!<reason>!!` when it cannot
    /// be rendered.
    pub fn type_name(&self) -> String {
        render_type(&self.field.ty).unwrap_or_else(|err| format!("!!{err}!!"))
    }

    pub fn shape(&self) -> Result<FieldShape, ShapeError> {
        FieldShape::of(&self.field.ty)
    }

    /// `*T`
    pub fn is_ptr(&self) -> bool {
        matches!(self.field.ty, TypeExpr::Pointer(_))
    }

    /// `[]T` or `[N]T`
    pub fn is_array(&self) -> bool {
        matches!(self.field.ty, TypeExpr::Array { .. })
    }

    /// `*[]T`
    pub fn is_ptr_array(&self) -> bool {
        match &self.field.ty {
            TypeExpr::Pointer(inner) => matches!(inner.as_ref(), TypeExpr::Array { .. }),
            _ => false,
        }
    }

    /// `[]*T`
    pub fn is_array_ptr(&self) -> bool {
        is_array_of_ptr(&self.field.ty)
    }

    /// `*[]*T`
    pub fn is_ptr_array_ptr(&self) -> bool {
        match &self.field.ty {
            TypeExpr::Pointer(inner) => is_array_of_ptr(inner),
            _ => false,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        self.shape().ok()?.primitive()
    }

    pub fn is_int(&self) -> bool {
        self.primitive_kind() == Some(PrimitiveKind::Int)
    }

    pub fn is_int64(&self) -> bool {
        self.primitive_kind() == Some(PrimitiveKind::Int64)
    }

    pub fn is_float32(&self) -> bool {
        self.primitive_kind() == Some(PrimitiveKind::Float32)
    }

    pub fn is_float64(&self) -> bool {
        self.primitive_kind() == Some(PrimitiveKind::Float64)
    }

    /// Any of `int`, `int64`, `float32`, `float64`.
    pub fn is_number(&self) -> bool {
        self.primitive_kind().is_some_and(PrimitiveKind::is_number)
    }

    pub fn is_string(&self) -> bool {
        self.primitive_kind() == Some(PrimitiveKind::String)
    }

    pub fn is_bool(&self) -> bool {
        self.primitive_kind() == Some(PrimitiveKind::Bool)
    }

    /// `time.Time`, by its qualified spelling.
    pub fn is_time(&self) -> bool {
        self.primitive_kind() == Some(PrimitiveKind::Time)
    }

    pub fn ast(&self) -> &'a Field {
        self.field
    }
}

fn is_array_of_ptr(ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Array { elem, .. } => matches!(elem.as_ref(), TypeExpr::Pointer(_)),
        _ => false,
    }
}

/// Look `key` up in a struct tag the way Go's `reflect.StructTag` does.
///
/// The scan stops at the first malformed pair.
pub fn lookup_struct_tag(tag: &str, key: &str) -> Option<String> {
    let mut rest = tag;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return None;
        }

        let name_len = rest
            .bytes()
            .position(|b| b <= b' ' || b == b':' || b == b'"' || b == 0x7f)
            .unwrap_or(rest.len());
        if name_len == 0 || !rest[name_len..].starts_with(":\"") {
            return None;
        }
        let name = &rest[..name_len];
        rest = &rest[name_len + 1..];

        // Closing quote, skipping escaped characters.
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        let quoted = &rest[..=i];
        rest = &rest[i + 1..];

        if name == key {
            return unquote(quoted);
        }
    }
}
