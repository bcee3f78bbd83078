//! Field type shapes: a base type name under pointer and collection layers.

use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

use crate::syntax::{TypeExpr, TypeName};

/// One layer peeled off a field type on the way to its base name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wrapper {
    /// `*T`
    Pointer,
    /// `[]T` or `[N]T`
    Array,
}

/// The base of a type expression is not a type name.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unsupported base type: {0}")]
pub struct ShapeError(pub &'static str);

/// A field type as a base name plus the wrappers around it, outermost first.
///
/// `*[]*time.Time` is the base `time.Time` under `[Pointer, Array, Pointer]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldShape {
    base: SmolStr,
    wrappers: Vec<Wrapper>,
}

impl FieldShape {
    /// Unwrap `ty` one pointer or array layer at a time.
    ///
    /// Fails on anything but a (possibly qualified) type name at the bottom:
    /// maps, channels, funcs, inline structs and interfaces, generic
    /// instances and parenthesized types.
    pub fn of(ty: &TypeExpr) -> Result<Self, ShapeError> {
        let mut wrappers = Vec::new();
        let mut current = ty;
        loop {
            current = match current {
                TypeExpr::Pointer(elem) => {
                    wrappers.push(Wrapper::Pointer);
                    elem.as_ref()
                }
                TypeExpr::Array { elem, .. } => {
                    wrappers.push(Wrapper::Array);
                    elem.as_ref()
                }
                TypeExpr::Named(name) => {
                    return Ok(Self {
                        base: qualified_name(name),
                        wrappers,
                    });
                }
                other => return Err(ShapeError(kind_name(other))),
            };
        }
    }

    /// `T` or `pkg.T`.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn wrappers(&self) -> &[Wrapper] {
        &self.wrappers
    }

    pub fn has_pointer(&self) -> bool {
        self.wrappers.contains(&Wrapper::Pointer)
    }

    /// The primitive a value of this shape holds, if any. A pointer layer
    /// anywhere in the chain means the value is not a primitive.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        if self.has_pointer() {
            return None;
        }
        PrimitiveKind::from_base(&self.base)
    }
}

fn qualified_name(name: &TypeName) -> SmolStr {
    match &name.package {
        Some(pkg) => SmolStr::new(format!("{}.{}", pkg.name, name.name.name)),
        None => name.name.name.clone(),
    }
}

fn kind_name(ty: &TypeExpr) -> &'static str {
    match ty {
        TypeExpr::Named(_) => "named type",
        TypeExpr::Instance { .. } => "generic instance",
        TypeExpr::Pointer(_) => "pointer",
        TypeExpr::Array { .. } => "array",
        TypeExpr::Map { .. } => "map",
        TypeExpr::Chan { .. } => "channel",
        TypeExpr::Func(_) => "func",
        TypeExpr::Struct(_) => "struct",
        TypeExpr::Interface(_) => "interface",
        TypeExpr::Union(_) => "union",
        TypeExpr::Paren(_) => "parenthesized type",
        TypeExpr::Ellipsis(_) => "variadic",
    }
}

/// Base types code generators treat as scalars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int,
    Int64,
    Float32,
    Float64,
    String,
    Bool,
    Time,
}

impl PrimitiveKind {
    pub fn from_base(base: &str) -> Option<Self> {
        Some(match base {
            "int" => Self::Int,
            "int64" => Self::Int64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "string" => Self::String,
            "bool" => Self::Bool,
            "time.Time" => Self::Time,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Time => "time.Time",
        }
    }

    pub fn is_number(self) -> bool {
        matches!(self, Self::Int | Self::Int64 | Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Decl, Spec, parse_file};
    use rstest::rstest;

    fn type_of(src: &str) -> TypeExpr {
        let file = parse_file(&format!("package p\n\ntype T {src}\n")).unwrap();
        match &file.decls[0] {
            Decl::Gen(decl) => match &decl.specs[0] {
                Spec::Type(spec) => spec.ty.clone(),
                other => panic!("unexpected spec {other:?}"),
            },
            other => panic!("unexpected decl {other:?}"),
        }
    }

    #[rstest]
    #[case("int", "int", &[])]
    #[case("*int", "int", &[Wrapper::Pointer])]
    #[case("[]string", "string", &[Wrapper::Array])]
    #[case("[4]byte", "byte", &[Wrapper::Array])]
    #[case("*[]*time.Time", "time.Time", &[Wrapper::Pointer, Wrapper::Array, Wrapper::Pointer])]
    #[case("[][]float64", "float64", &[Wrapper::Array, Wrapper::Array])]
    fn test_unwraps_to_base(#[case] src: &str, #[case] base: &str, #[case] wrappers: &[Wrapper]) {
        let shape = FieldShape::of(&type_of(src)).unwrap();
        assert_eq!(shape.base(), base);
        assert_eq!(shape.wrappers(), wrappers);
    }

    #[rstest]
    #[case("map[string]int", "map")]
    #[case("*chan int", "channel")]
    #[case("[]func()", "func")]
    #[case("struct{}", "struct")]
    #[case("[]List[int]", "generic instance")]
    #[case("(int)", "parenthesized type")]
    fn test_unsupported_shapes(#[case] src: &str, #[case] kind: &'static str) {
        assert_eq!(FieldShape::of(&type_of(src)), Err(ShapeError(kind)));
    }

    #[rstest]
    #[case("int", Some(PrimitiveKind::Int))]
    #[case("[]int64", Some(PrimitiveKind::Int64))]
    #[case("*int", None)]
    #[case("[]*bool", None)]
    #[case("time.Time", Some(PrimitiveKind::Time))]
    #[case("Time", None)]
    #[case("uint", None)]
    fn test_primitive(#[case] src: &str, #[case] expected: Option<PrimitiveKind>) {
        assert_eq!(FieldShape::of(&type_of(src)).unwrap().primitive(), expected);
    }

    #[test]
    fn test_primitive_kind_names() {
        assert_eq!(PrimitiveKind::Time.to_string(), "time.Time");
        assert!(PrimitiveKind::Float32.is_number());
        assert!(!PrimitiveKind::String.is_number());
    }
}
