//! Looking up the import a package identifier refers to.

use crate::hir::SourceUnit;
use crate::syntax::ImportSpec;

impl SourceUnit {
    /// The import `ident` names in this unit.
    ///
    /// An explicit alias wins over everything. Otherwise an import matches
    /// when the last element of its path is `ident`, whether or not it is
    /// aliased, and failing that when the whole path is `ident`.
    pub fn find_import(&self, ident: &str) -> Option<&ImportSpec> {
        let imports = || self.file().imports();

        imports()
            .find(|spec| spec.name.as_ref().is_some_and(|alias| alias.as_str() == ident))
            .or_else(|| {
                imports().find(|spec| {
                    spec.path_value()
                        .rsplit_once('/')
                        .is_some_and(|(_, last)| last == ident)
                })
            })
            .or_else(|| imports().find(|spec| spec.path_value() == ident))
    }
}

#[cfg(test)]
mod tests {
    use crate::base::FileId;
    use crate::hir::SourceUnit;
    use rstest::rstest;

    const SOURCE: &str = r#"package p

import (
	"fmt"
	"net/http"
	ds "google.golang.org/appengine/datastore"
	"github.com/favclip/ds"
	. "strings"
	_ "embed"
	foo "example.com/bar"
)
"#;

    #[rstest]
    #[case("fmt", Some("fmt"))]
    #[case("http", Some("net/http"))]
    #[case("ds", Some("google.golang.org/appengine/datastore"))]
    #[case("datastore", Some("google.golang.org/appengine/datastore"))]
    #[case("bar", Some("example.com/bar"))]
    #[case("foo", Some("example.com/bar"))]
    #[case("net/http", Some("net/http"))]
    #[case("strings", Some("strings"))]
    #[case("embed", Some("embed"))]
    #[case(".", Some("strings"))]
    #[case("_", Some("embed"))]
    #[case("os", None)]
    fn test_find_import(#[case] ident: &str, #[case] expected: Option<&str>) {
        let unit = SourceUnit::parse(FileId::new(0), "p.go", SOURCE).unwrap();
        let found = unit.find_import(ident).map(|spec| spec.path_value());
        assert_eq!(found.as_deref(), expected);
    }
}
