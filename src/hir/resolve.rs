//! Name resolution: binding the identifiers of top-level declarations.
//!
//! The binder works at declaration level only. Function bodies and
//! initializer expressions were never parsed, so they cannot fail here, and
//! an unused import is not an error.
//!
//! # Scopes
//!
//! Lookups walk, innermost first:
//!
//! 1. the type parameters of the enclosing generic type, func or method
//!    (a method's receiver type arguments declare its type parameters),
//! 2. the package block: every top-level type, func, var and const of all
//!    units,
//! 3. the universe: Go's predeclared types and constants,
//! 4. the dot imports of the unit, which accept any remaining name.
//!
//! A qualified `p.T` needs `p` to be an import name of the unit. The
//! members of imported packages are not known, so `T` itself is not checked.

use std::path::Path;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::diagnostics::{DiagnosticCollector, ResolutionError};
use super::ids::{DeclId, LocalDeclId};
use super::importer::{ImportedPackage, Importer, default_package_name};
use super::input::SourceUnit;
use crate::base::{FileId, TextRange};
use crate::syntax::{
    Decl, DeclKeyword, Field, FuncDecl, Ident, InterfaceElem, Signature, Spec, TypeExpr, TypeName,
};

/// Predeclared type names.
pub const UNIVERSE_TYPES: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex128", "complex64", "error", "float32", "float64",
    "int", "int16", "int32", "int64", "int8", "rune", "string", "uint", "uint16", "uint32",
    "uint64", "uint8", "uintptr",
];

/// Predeclared constants, reachable from array length expressions.
const UNIVERSE_VALUES: &[&str] = &["false", "iota", "nil", "true"];

/// Path of the fake package behind `import "C"`.
pub const CGO_PATH: &str = "C";

// ============================================================================
// TYPE TABLE
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Type,
    Alias,
    Func,
    Var,
    Const,
}

/// A package-level named entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    pub id: DeclId,
    pub name: SmolStr,
    pub kind: ObjectKind,
    pub range: TextRange,
}

impl Object {
    pub fn is_type(&self) -> bool {
        matches!(self.kind, ObjectKind::Type | ObjectKind::Alias)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub id: DeclId,
    /// Base name of the receiver type.
    pub receiver: SmolStr,
    pub name: SmolStr,
    pub pointer_receiver: bool,
    pub range: TextRange,
}

/// What an identifier in a type expression refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// A predeclared type or constant.
    Universe,
    /// A package-level declaration.
    Package(DeclId),
    /// A type parameter of the enclosing declaration.
    TypeParam,
    /// A member of the package imported from `path`.
    Import { path: SmolStr },
    /// A name assumed to come from a dot import.
    DotImport,
}

/// One bound identifier occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub file: FileId,
    pub range: TextRange,
    /// The identifier as written; `p.T` for qualified names.
    pub name: SmolStr,
    pub binding: Binding,
}

/// The resolved view of a package.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    path: SmolStr,
    name: SmolStr,
    objects: IndexMap<SmolStr, Object>,
    methods: Vec<Method>,
    imports: IndexMap<SmolStr, ImportedPackage>,
    references: Vec<Reference>,
}

impl TypeTable {
    /// The path the package was checked under.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package-level objects in declaration order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }

    /// A package-level type or alias named `name`.
    pub fn lookup_type(&self, name: &str) -> Option<&Object> {
        self.lookup(name).filter(|obj| obj.is_type())
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn methods_of<'t>(&'t self, receiver: &'t str) -> impl Iterator<Item = &'t Method> + 't {
        self.methods.iter().filter(move |m| m.receiver == receiver)
    }

    /// Imported packages in first-import order; `"C"` included.
    pub fn imports(&self) -> impl Iterator<Item = &ImportedPackage> {
        self.imports.values()
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }
}

// ============================================================================
// BINDER
// ============================================================================

/// Resolve `units` as the package at `path`.
///
/// Every problem found is collected; the result is an error if there was at
/// least one.
pub fn check_package(path: &str, units: &[SourceUnit], importer: &dyn Importer) -> Result<TypeTable, ResolutionError> {
    let mut binder = Binder {
        units,
        importer,
        dir: Path::new(path),
        table: TypeTable {
            path: path.into(),
            ..TypeTable::default()
        },
        diagnostics: DiagnosticCollector::new(),
        file_scopes: Vec::with_capacity(units.len()),
    };

    binder.check_package_clauses();
    binder.collect_package_scope();
    binder.collect_file_scopes();
    binder.collect_methods();
    binder.bind_declarations();

    debug!(
        package = %binder.table.name,
        objects = binder.table.objects.len(),
        methods = binder.table.methods.len(),
        references = binder.table.references.len(),
        errors = binder.diagnostics.error_count(),
        "resolved package"
    );
    binder.diagnostics.finish()?;
    Ok(binder.table)
}

#[derive(Debug, Default)]
struct FileScope {
    /// Import name to import path.
    imports: FxHashMap<SmolStr, SmolStr>,
    has_dot_import: bool,
}

struct Binder<'a> {
    units: &'a [SourceUnit],
    importer: &'a dyn Importer,
    dir: &'a Path,
    table: TypeTable,
    diagnostics: DiagnosticCollector,
    file_scopes: Vec<FileScope>,
}

impl<'a> Binder<'a> {
    fn check_package_clauses(&mut self) {
        let units = self.units;
        let Some(first) = units.first() else {
            return;
        };
        self.table.name = first.file().package.name.clone();
        for unit in &units[1..] {
            if unit.package_name() != self.table.name {
                let range = unit.file().package.range;
                self.diagnostics.package_mismatch(unit, range, &self.table.name);
            }
        }
    }

    fn collect_package_scope(&mut self) {
        let units = self.units;
        for unit in units {
            let mut next_local = 0u32;
            let mut next_id = || {
                let id = DeclId::new(unit.id(), LocalDeclId::new(next_local));
                next_local += 1;
                id
            };

            for decl in &unit.file().decls {
                match decl {
                    Decl::Gen(gen_decl) => {
                        for spec in &gen_decl.specs {
                            match spec {
                                Spec::Type(ts) => {
                                    let kind = if ts.is_alias { ObjectKind::Alias } else { ObjectKind::Type };
                                    let id = next_id();
                                    self.declare(unit, &ts.name, kind, id);
                                }
                                Spec::Value(vs) => {
                                    let kind = if gen_decl.keyword == DeclKeyword::Const {
                                        ObjectKind::Const
                                    } else {
                                        ObjectKind::Var
                                    };
                                    for name in &vs.names {
                                        let id = next_id();
                                        self.declare(unit, name, kind, id);
                                    }
                                }
                                Spec::Import(_) => {}
                            }
                        }
                    }
                    Decl::Func(func) => {
                        let id = next_id();
                        if func.recv.is_none() && func.name.as_str() != "init" {
                            self.declare(unit, &func.name, ObjectKind::Func, id);
                        }
                    }
                }
            }
        }
    }

    fn declare(&mut self, unit: &SourceUnit, name: &Ident, kind: ObjectKind, id: DeclId) {
        if name.is_blank() {
            return;
        }
        if let Some(previous) = self.table.objects.get(&name.name) {
            let previous_unit = &self.units[previous.id.file.index()];
            let previous_pos = (previous.id.file, previous_unit.position(previous.range));
            self.diagnostics.redeclared(unit, name.range, name.as_str(), previous_pos);
            return;
        }
        trace!(name = %name.name, ?kind, ?id, "declared");
        self.table.objects.insert(
            name.name.clone(),
            Object {
                id,
                name: name.name.clone(),
                kind,
                range: name.range,
            },
        );
    }

    fn collect_file_scopes(&mut self) {
        let units = self.units;
        for unit in units {
            let mut scope = FileScope::default();
            for import in unit.file().imports() {
                let path = import.path_value();
                let package = if path == CGO_PATH {
                    ImportedPackage {
                        path: CGO_PATH.into(),
                        name: CGO_PATH.into(),
                    }
                } else {
                    match self.importer.import(&path, self.dir) {
                        Ok(package) => package,
                        Err(err) => {
                            self.diagnostics
                                .import_failed(unit, import.path.range, &path, &err.to_string());
                            ImportedPackage {
                                name: default_package_name(&path).into(),
                                path: path.as_str().into(),
                            }
                        }
                    }
                };

                let (name, range) = match &import.name {
                    Some(alias) => (alias.name.clone(), alias.range),
                    None => (package.name.clone(), import.path.range),
                };
                match name.as_str() {
                    "_" => {}
                    "." => scope.has_dot_import = true,
                    _ => {
                        if scope.imports.contains_key(&name) {
                            let position = (unit.id(), unit.position(range));
                            self.diagnostics.redeclared(unit, range, &name, position);
                        } else {
                            scope.imports.insert(name, package.path.clone());
                        }
                    }
                }
                self.table.imports.entry(package.path.clone()).or_insert(package);
            }
            self.file_scopes.push(scope);
        }
    }

    fn collect_methods(&mut self) {
        let units = self.units;
        let mut seen: FxHashSet<(SmolStr, SmolStr)> = FxHashSet::default();
        for unit in units {
            let mut local = 0u32;
            for decl in &unit.file().decls {
                let id = DeclId::new(unit.id(), LocalDeclId::new(local));
                local += declared_names(decl);
                let Decl::Func(func) = decl else {
                    continue;
                };

                let Some(recv) = &func.recv else {
                    continue;
                };
                let Some((base, pointer)) = receiver_base(recv) else {
                    let range = recv.first().map_or(func.name.range, |f| type_range(&f.ty, func.name.range));
                    self.diagnostics.invalid_receiver(unit, range, "(missing or multiple receivers)");
                    continue;
                };

                match self.table.objects.get(&base.name) {
                    Some(obj) if obj.is_type() => {}
                    Some(_) => {
                        self.diagnostics.invalid_receiver(unit, base.range, base.as_str());
                        continue;
                    }
                    None => {
                        self.diagnostics.undefined(unit, base.range, base.as_str());
                        continue;
                    }
                }

                if !func.name.is_blank() && !seen.insert((base.name.clone(), func.name.name.clone())) {
                    self.diagnostics
                        .method_redeclared(unit, func.name.range, base.as_str(), func.name.as_str());
                    continue;
                }
                self.table.methods.push(Method {
                    id,
                    receiver: base.name.clone(),
                    name: func.name.name.clone(),
                    pointer_receiver: pointer,
                    range: func.name.range,
                });
            }
        }
    }

    fn bind_declarations(&mut self) {
        let units = self.units;
        for (index, unit) in units.iter().enumerate() {
            for decl in &unit.file().decls {
                match decl {
                    Decl::Gen(gen_decl) => {
                        for spec in &gen_decl.specs {
                            match spec {
                                Spec::Type(ts) => {
                                    let scope = param_names(&ts.type_params);
                                    self.bind_fields(unit, index, &scope, &ts.type_params);
                                    self.bind_type(unit, index, &scope, &ts.ty);
                                }
                                Spec::Value(vs) => {
                                    if let Some(ty) = &vs.ty {
                                        self.bind_type(unit, index, &[], ty);
                                    }
                                }
                                Spec::Import(_) => {}
                            }
                        }
                    }
                    Decl::Func(func) => self.bind_func(unit, index, func),
                }
            }
        }
    }

    fn bind_func(&mut self, unit: &SourceUnit, index: usize, func: &FuncDecl) {
        let mut scope = param_names(&func.type_params);
        if let Some(recv) = &func.recv {
            for field in recv {
                scope.extend(receiver_type_params(&field.ty));
            }
            if let Some((base, _)) = receiver_base(recv) {
                if let Some(obj) = self.table.lookup_type(&base.name) {
                    let binding = Binding::Package(obj.id);
                    self.record(unit, base.range, base.name.clone(), binding);
                }
            }
        }
        self.bind_fields(unit, index, &scope, &func.type_params);
        self.bind_signature(unit, index, &scope, &func.signature);
    }

    fn bind_fields(&mut self, unit: &SourceUnit, index: usize, scope: &[SmolStr], fields: &[Field]) {
        for field in fields {
            self.bind_type(unit, index, scope, &field.ty);
        }
    }

    fn bind_signature(&mut self, unit: &SourceUnit, index: usize, scope: &[SmolStr], sig: &Signature) {
        self.bind_fields(unit, index, scope, &sig.params);
        self.bind_fields(unit, index, scope, &sig.results);
    }

    fn bind_type(&mut self, unit: &SourceUnit, index: usize, scope: &[SmolStr], ty: &TypeExpr) {
        match ty {
            TypeExpr::Named(name) => self.bind_type_name(unit, index, scope, name),
            TypeExpr::Instance { base, args } => {
                self.bind_type_name(unit, index, scope, base);
                for arg in args {
                    self.bind_type(unit, index, scope, arg);
                }
            }
            TypeExpr::Pointer(elem) | TypeExpr::Paren(elem) | TypeExpr::Ellipsis(elem) => {
                self.bind_type(unit, index, scope, elem)
            }
            TypeExpr::Chan { elem, .. } => self.bind_type(unit, index, scope, elem),
            TypeExpr::Array { len, elem } => {
                if let Some(len) = len {
                    self.bind_array_len(unit, index, scope, len, ty);
                }
                self.bind_type(unit, index, scope, elem);
            }
            TypeExpr::Map { key, value } => {
                self.bind_type(unit, index, scope, key);
                self.bind_type(unit, index, scope, value);
            }
            TypeExpr::Func(sig) => self.bind_signature(unit, index, scope, sig),
            TypeExpr::Struct(st) => self.bind_fields(unit, index, scope, &st.fields),
            TypeExpr::Interface(iface) => {
                for elem in &iface.elems {
                    match elem {
                        InterfaceElem::Method { signature, .. } => {
                            self.bind_signature(unit, index, scope, signature)
                        }
                        InterfaceElem::Embedded(ty) => self.bind_type(unit, index, scope, ty),
                    }
                }
            }
            TypeExpr::Union(terms) => {
                for term in terms {
                    self.bind_type(unit, index, scope, &term.ty);
                }
            }
        }
    }

    /// Array lengths are constant expressions and are not evaluated; a
    /// length that is a single identifier is still bound.
    fn bind_array_len(&mut self, unit: &SourceUnit, index: usize, scope: &[SmolStr], len: &SmolStr, ty: &TypeExpr) {
        let is_ident = len.starts_with(|c: char| c.is_alphabetic() || c == '_')
            && len.chars().all(|c| c.is_alphanumeric() || c == '_');
        if !is_ident || UNIVERSE_VALUES.contains(&len.as_str()) {
            return;
        }
        // The length has no range of its own; report against the array type.
        let range = type_range(ty, TextRange::default());
        let ident = Ident {
            name: len.clone(),
            range,
        };
        self.bind_ident(unit, index, scope, &ident);
    }

    fn bind_type_name(&mut self, unit: &SourceUnit, index: usize, scope: &[SmolStr], name: &TypeName) {
        let Some(qualifier) = &name.package else {
            self.bind_ident(unit, index, scope, &name.name);
            return;
        };

        if let Some(path) = self.file_scopes[index].imports.get(&qualifier.name) {
            let binding = Binding::Import { path: path.clone() };
            let text = SmolStr::new(format!("{}.{}", qualifier.name, name.name.name));
            self.record(unit, qualifier.range.cover(name.name.range), text, binding);
            return;
        }
        if scope.contains(&qualifier.name) || self.table.objects.contains_key(&qualifier.name) {
            self.diagnostics.not_a_package(unit, qualifier.range, qualifier.as_str());
        } else {
            self.diagnostics.undefined(unit, qualifier.range, qualifier.as_str());
        }
    }

    fn bind_ident(&mut self, unit: &SourceUnit, index: usize, scope: &[SmolStr], ident: &Ident) {
        if ident.is_blank() {
            return;
        }
        let binding = if scope.contains(&ident.name) {
            Binding::TypeParam
        } else if let Some(obj) = self.table.objects.get(&ident.name) {
            Binding::Package(obj.id)
        } else if UNIVERSE_TYPES.contains(&ident.as_str()) || UNIVERSE_VALUES.contains(&ident.as_str()) {
            Binding::Universe
        } else if self.file_scopes[index].has_dot_import {
            Binding::DotImport
        } else {
            self.diagnostics.undefined(unit, ident.range, ident.as_str());
            return;
        };
        self.record(unit, ident.range, ident.name.clone(), binding);
    }

    fn record(&mut self, unit: &SourceUnit, range: TextRange, name: SmolStr, binding: Binding) {
        trace!(%name, ?binding, "bound");
        self.table.references.push(Reference {
            file: unit.id(),
            range,
            name,
            binding,
        });
    }
}

/// How many [`LocalDeclId`]s a declaration takes: one per type spec, func
/// or method, and one per name of a var or const spec.
pub(crate) fn declared_names(decl: &Decl) -> u32 {
    match decl {
        Decl::Func(_) => 1,
        Decl::Gen(gen_decl) => gen_decl
            .specs
            .iter()
            .map(|spec| match spec {
                Spec::Type(_) => 1,
                Spec::Value(vs) => vs.names.len() as u32,
                Spec::Import(_) => 0,
            })
            .sum(),
    }
}

fn param_names(params: &[Field]) -> Vec<SmolStr> {
    params
        .iter()
        .flat_map(|field| field.names.iter())
        .filter(|name| !name.is_blank())
        .map(|name| name.name.clone())
        .collect()
}

/// The receiver's base type name and whether it is a pointer receiver.
fn receiver_base(recv: &[Field]) -> Option<(&Ident, bool)> {
    let [field] = recv else {
        return None;
    };
    let mut ty = &field.ty;
    let mut pointer = false;
    loop {
        match ty {
            TypeExpr::Paren(inner) => ty = inner.as_ref(),
            TypeExpr::Pointer(inner) if !pointer => {
                pointer = true;
                ty = inner.as_ref();
            }
            TypeExpr::Named(TypeName { package: None, name })
            | TypeExpr::Instance {
                base: TypeName { package: None, name },
                ..
            } => return Some((name, pointer)),
            _ => return None,
        }
    }
}

/// Names a receiver type's arguments declare: `K`, `V` in `*Pair[K, V]`.
fn receiver_type_params(ty: &TypeExpr) -> Vec<SmolStr> {
    match ty {
        TypeExpr::Pointer(inner) | TypeExpr::Paren(inner) => receiver_type_params(inner),
        TypeExpr::Instance { args, .. } => args
            .iter()
            .filter_map(|arg| match arg {
                TypeExpr::Named(TypeName { package: None, name }) if !name.is_blank() => Some(name.name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Best-effort source range of a type expression: that of its first name.
fn type_range(ty: &TypeExpr, fallback: TextRange) -> TextRange {
    match ty {
        TypeExpr::Named(name) | TypeExpr::Instance { base: name, .. } => {
            name.package.as_ref().map_or(name.name.range, |p| p.range)
        }
        TypeExpr::Pointer(inner)
        | TypeExpr::Paren(inner)
        | TypeExpr::Ellipsis(inner)
        | TypeExpr::Chan { elem: inner, .. }
        | TypeExpr::Array { elem: inner, .. } => type_range(inner, fallback),
        TypeExpr::Map { key, .. } => type_range(key, fallback),
        TypeExpr::Struct(st) => st.range,
        TypeExpr::Interface(iface) => iface.range,
        TypeExpr::Union(terms) => terms.first().map_or(fallback, |t| type_range(&t.ty, fallback)),
        TypeExpr::Func(_) => fallback,
    }
}
