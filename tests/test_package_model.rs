//! End-to-end queries over packages loaded from in-memory source.
//!
//! Covers declaration enumeration, name and tag selection, and the
//! strict/lenient handling of packages that do not resolve.

use genbase::{Error, Parser};

fn load(source: &str) -> genbase::PackageModel {
    Parser::default().parse_string_source("model.go", source).unwrap()
}

#[test]
fn test_point_scenario() {
    let pkg = load("package geo\n\ntype Point struct { X int; Y *int; Tags []string }\n");

    let decls = pkg.all_declarations();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].name(), "Point");

    let fields = decls[0].as_record().unwrap().fields();
    assert_eq!(fields.len(), 3);
    assert!(fields[0].is_int());
    assert!(fields[1].is_ptr());
    assert!(!fields[1].is_int(), "a pointer-wrapped int is not an int value");
    assert!(fields[2].is_array());
    assert!(fields[2].is_string());
}

#[test]
fn test_collector_order_is_stable() {
    let source = r#"package shop

type Order struct{ Items []*Item }

type (
	Item struct{ SKU string }
	Price float64
)

func (o *Order) Total() Price { return 0 }

type Status int
"#;
    let pkg = load(source);

    let first: Vec<_> = pkg.all_declarations().iter().map(|d| d.name().to_string()).collect();
    let second: Vec<_> = pkg.all_declarations().iter().map(|d| d.name().to_string()).collect();
    assert_eq!(first, vec!["Order", "Item", "Price", "Status"]);
    assert_eq!(first, second);
}

#[test]
fn test_by_name_and_by_tag() {
    let source = r#"package shop

// Order is a purchase.
// +gen -table=orders
type Order struct{ ID int64 }

// Item has no tag.
type Item struct{ SKU string }

type Untagged struct{}
"#;
    let pkg = load(source);

    let named = pkg.by_name(&["Item", "Nope", "Order"]);
    assert_eq!(named.iter().map(|d| d.name()).collect::<Vec<_>>(), vec!["Order", "Item"]);
    assert!(named.iter().all(|d| d.annotation().is_none()));

    let tagged = pkg.by_tag("+gen");
    assert_eq!(tagged.len(), 1);
    let annotation = tagged[0].annotation().unwrap();
    assert_eq!(annotation.line(), "+gen -table=orders");
    assert_eq!(annotation.value("table"), Some("orders"));
    assert_eq!(tagged[0].doc().unwrap().text(), "Order is a purchase.\n+gen -table=orders\n");
}

#[test]
fn test_strict_mode_reports_first_diagnostic() {
    let source = "package shop\n\ntype Order struct {\n\tItems []Item\n\tAt    Moment\n}\n";
    let err = Parser::default().parse_string_source("order.go", source).unwrap_err();

    assert_eq!(err.to_string(), "order.go:4:10: undefined: Item");
    let Error::Resolution(resolution) = err else {
        panic!("expected a resolution error");
    };
    assert_eq!(resolution.diagnostics.len(), 2);
    assert_eq!(resolution.diagnostics[1].message.as_ref(), "undefined: Moment");
}

#[test]
fn test_lenient_mode_keeps_declarations() {
    let source = r#"package shop

import "github.com/example/money"

// +gen
type Order struct {
	Total money.Amount
	Paid  bool
}
"#;
    let pkg = Parser::default()
        .with_skip_semantics_check(true)
        .parse_string_source("order.go", source)
        .unwrap();

    assert!(pkg.types().is_none());
    let tagged = pkg.by_tag("+gen");
    let fields = tagged[0].as_record().unwrap().fields();
    assert_eq!(fields[0].type_name(), "money.Amount");
    assert!(!fields[0].is_number());
    assert!(fields[1].is_bool());
}

#[test]
fn test_import_lookup() {
    let source = r#"package shop

import (
	"time"
	dstore "google.golang.org/appengine/datastore"
)

type Order struct {
	Key *dstore.Key
	At  time.Time
}
"#;
    let pkg = Parser::default()
        .with_importer(
            genbase::StaticImporter::new()
                .with_path("google.golang.org/appengine/datastore")
                .with_path("time"),
        )
        .parse_string_source("order.go", source)
        .unwrap();

    let unit = &pkg.units()[0];
    assert_eq!(
        unit.find_import("dstore").map(|spec| spec.path_value()).as_deref(),
        Some("google.golang.org/appengine/datastore")
    );
    assert_eq!(unit.find_import("time").map(|spec| spec.path_value()).as_deref(), Some("time"));
    assert_eq!(
        unit.find_import("datastore").map(|spec| spec.path_value()).as_deref(),
        Some("google.golang.org/appengine/datastore")
    );
    assert!(unit.find_import("appengine").is_none());

    let order = &pkg.by_name(&["Order"])[0];
    let fields = order.as_record().unwrap().fields();
    assert!(fields[1].is_time());
    assert_eq!(fields[0].shape().unwrap().base(), "dstore.Key");
}

#[test]
fn test_non_record_declarations() {
    let pkg = load("package p\n\ntype ID string\ntype Reader interface{ Read() }\ntype Alias = ID\n");

    for decl in pkg.all_declarations() {
        assert!(decl.as_record().is_err(), "{} should not be a record", decl.name());
    }
}

#[test]
fn test_array_length_expression() {
    let pkg = load("package buf\n\nconst N = 4\n\ntype Buf [N * 2]byte\n");

    let decls = pkg.by_name(&["Buf"]);
    assert_eq!(decls.len(), 1);
    assert!(decls[0].type_params().is_empty());
    assert!(decls[0].as_record().is_err());
}
