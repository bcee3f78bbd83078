//! The loaded package and the type declaration collector.

use std::path::{Path, PathBuf};

use super::annotation::Annotation;
use super::declarations::TypeDeclaration;
use crate::base::FileId;
use crate::error::Error;
use crate::hir::{DeclId, LocalDeclId, SourceUnit, TypeTable, declared_names};
use crate::syntax::{Decl, DeclKeyword, Spec};

/// Parsed units of one package, plus their resolved view when resolution
/// succeeded.
///
/// Read-only once built. Every query walks the units again; nothing is
/// cached.
#[derive(Debug)]
pub struct PackageModel {
    dir: PathBuf,
    units: Vec<SourceUnit>,
    types: Option<TypeTable>,
}

impl PackageModel {
    pub(crate) fn new(dir: impl Into<PathBuf>, units: Vec<SourceUnit>, types: Option<TypeTable>) -> Result<Self, Error> {
        let dir = dir.into();
        if units.is_empty() {
            return Err(Error::NoSourceFiles { dir });
        }
        Ok(Self { dir, units, types })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Units in load order.
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn unit(&self, id: FileId) -> Option<&SourceUnit> {
        self.units.get(id.index())
    }

    /// `None` when resolution failed and the failure was tolerated.
    pub fn types(&self) -> Option<&TypeTable> {
        self.types.as_ref()
    }

    /// The package clause of the first unit.
    pub fn package_name(&self) -> &str {
        self.units.first().map_or("", SourceUnit::package_name)
    }

    /// Every top-level type spec, by unit then source order.
    pub fn all_declarations(&self) -> Vec<TypeDeclaration<'_>> {
        let mut found = Vec::new();
        for unit in &self.units {
            let mut local = 0u32;
            for decl in &unit.file().decls {
                let first = local;
                local += declared_names(decl);

                let Decl::Gen(gen_decl) = decl else {
                    continue;
                };
                if gen_decl.keyword != DeclKeyword::Type {
                    continue;
                }
                for (offset, spec) in gen_decl.specs.iter().enumerate() {
                    if let Spec::Type(spec) = spec {
                        let id = DeclId::new(unit.id(), LocalDeclId::new(first + offset as u32));
                        found.push(TypeDeclaration::new(id, unit, gen_decl, spec));
                    }
                }
            }
        }
        found
    }

    /// Declarations named in `names`, in declaration order.
    pub fn by_name<S: AsRef<str>>(&self, names: &[S]) -> Vec<TypeDeclaration<'_>> {
        self.all_declarations()
            .into_iter()
            .filter(|decl| names.iter().any(|name| name.as_ref() == decl.name()))
            .collect()
    }

    /// Declarations whose doc comment carries `tag`, each with the matching
    /// annotation attached.
    pub fn by_tag(&self, tag: &str) -> Vec<TypeDeclaration<'_>> {
        self.all_declarations()
            .into_iter()
            .filter_map(|decl| {
                let annotation = Annotation::find(decl.doc()?, tag)?;
                Some(decl.with_annotation(annotation))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{StdImporter, check_package};

    fn model(sources: &[&str]) -> PackageModel {
        let units: Vec<SourceUnit> = sources
            .iter()
            .enumerate()
            .map(|(i, text)| SourceUnit::parse(FileId::from(i), format!("f{i}.go"), *text).unwrap())
            .collect();
        let types = check_package(".", &units, &StdImporter).ok();
        PackageModel::new(".", units, types).unwrap()
    }

    fn names(decls: &[TypeDeclaration<'_>]) -> Vec<String> {
        decls.iter().map(|d| d.name().to_string()).collect()
    }

    #[test]
    fn test_no_units() {
        let err = PackageModel::new("empty", Vec::new(), None).unwrap_err();
        assert!(matches!(err, Error::NoSourceFiles { .. }));
    }

    #[test]
    fn test_all_declarations_in_file_then_source_order() {
        let pkg = model(&[
            "package p\n\ntype B int\n\ntype (\n\tA struct{}\n\tC = B\n)\n",
            "package p\n\nvar x, y int\n\ntype D []B\n",
        ]);

        let all = pkg.all_declarations();
        assert_eq!(names(&all), vec!["B", "A", "C", "D"]);
        assert_eq!(names(&pkg.all_declarations()), names(&all));
        assert!(all[2].is_alias());
        assert_eq!(all[3].unit().id(), FileId::new(1));
        assert_eq!(pkg.package_name(), "p");
        assert!(pkg.types().is_some());
    }

    #[test]
    fn test_ids_match_type_table() {
        let pkg = model(&["package p\n\nconst a, b = 1, 2\nfunc f() {}\n\ntype (\n\tA int\n\tB int\n)\n"]);
        let table = pkg.types().unwrap();

        for decl in pkg.all_declarations() {
            assert_eq!(table.lookup_type(decl.name()).map(|o| o.id), Some(decl.id()));
        }
    }

    #[test]
    fn test_by_name() {
        let pkg = model(&["package p\n\ntype A int\ntype B int\ntype C int\n"]);

        assert_eq!(names(&pkg.by_name(&["C", "A", "Missing"])), vec!["A", "C"]);
        assert!(pkg.by_name::<&str>(&[]).is_empty());
        assert!(pkg.by_name(&["A".to_string()])[0].annotation().is_none());
    }

    #[test]
    fn test_by_tag_uses_governing_doc() {
        let pkg = model(&[r#"package p

// +gen
type A struct{}

type (
	// +gen -name=Bs
	B struct{}

	C struct{}
)

// +gen
type (
	D int
	// other
	E int
)

type F struct{}
"#]);

        let tagged = pkg.by_tag("+gen");
        assert_eq!(names(&tagged), vec!["A", "B", "D"]);
        assert_eq!(tagged[1].annotation().unwrap().value("name"), Some("Bs"));
        assert_eq!(tagged[0].annotation().unwrap().tag(), "+gen");
        assert!(pkg.by_tag("+other").is_empty());
    }

    #[test]
    fn test_as_record() {
        let pkg = model(&["package p\n\ntype A struct{ X int }\ntype B []A\ntype C interface{}\n"]);
        let all = pkg.all_declarations();

        assert_eq!(all[0].as_record().unwrap().fields().len(), 1);
        let err = all[1].as_record().unwrap_err();
        assert_eq!(err.to_string(), "B is not a struct type");
        assert!(all[2].as_record().is_err());
    }

    #[test]
    fn test_model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PackageModel>();
    }
}
