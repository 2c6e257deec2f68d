use sifter::prelude::*;
use std::sync::Arc;

fn order(column: &str, descending: bool) -> Directive {
    Directive::Order {
        column: column.into(),
        descending,
    }
}

fn resolve(resolver: &QueryResolver<'_>, request: &RequestParams) -> ResolveResult<Vec<Directive>> {
    let mut sink = RecordingSink::new("test_models");
    resolver.resolve(request, &mut sink)?;
    Ok(sink.into_directives())
}

#[test]
fn test_descending_sort_uses_column_name() {
    let allow = AllowList::new().sorts([SortSpec::field("name").with_column("full_name")]);
    let request = RequestParams::new().sort("-name");

    assert_eq!(
        resolve(&QueryResolver::new(&allow), &request).unwrap(),
        vec![order("full_name", true)]
    );
}

#[test]
fn test_multiple_sorts_keep_request_order() {
    let allow = AllowList::new().sorts(["name", "created_at", "id"]);
    let request = RequestParams::new().sort("-created_at,name");

    assert_eq!(
        resolve(&QueryResolver::new(&allow), &request).unwrap(),
        vec![order("created_at", true), order("name", false)]
    );
}

#[test]
fn test_duplicate_sort_applies_once() {
    let allow = AllowList::new().sorts(["name"]);
    let request = RequestParams::new().sort("name,-NAME");

    assert_eq!(
        resolve(&QueryResolver::new(&allow), &request).unwrap(),
        vec![order("name", false)]
    );
}

#[test]
fn test_sort_alias() {
    let allow = AllowList::new().sorts([AllowEntry::alias("full_name", "full-name")]);

    assert_eq!(allow.allowed_sorts(), vec!["full-name"]);
    assert_eq!(
        resolve(&QueryResolver::new(&allow), &RequestParams::new().sort("-full-name")).unwrap(),
        vec![order("full_name", true)]
    );
}

#[test]
fn test_unknown_sorts_are_reported_together() {
    let allow = AllowList::new().sorts(["name"]);
    let request = RequestParams::new().sort("-id,name,email");

    let err = resolve(&QueryResolver::new(&allow), &request).unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnknownSort {
            unknown: vec!["id".into(), "email".into()],
            allowed: vec!["name".into()],
        }
    );
}

#[test]
fn test_default_sort_applies_without_request_sort() {
    let allow = AllowList::new().sorts(["name", "created_at"]);
    let resolver = QueryResolver::new(&allow).with_default_sort("-created_at");

    assert_eq!(
        resolve(&resolver, &RequestParams::new()).unwrap(),
        vec![order("created_at", true)]
    );
    assert_eq!(
        resolve(&resolver, &RequestParams::new().sort("name")).unwrap(),
        vec![order("name", false)]
    );
}

#[test]
fn test_empty_sort_parameter_is_no_sort() {
    let allow = AllowList::new().sorts(["name"]);

    assert!(resolve(&QueryResolver::new(&allow), &RequestParams::new().sort(""))
        .unwrap()
        .is_empty());
}

#[derive(Debug)]
struct NullsLast;

impl CustomSort for NullsLast {
    fn apply(
        &self,
        sink: &mut dyn QueryDirectiveSink,
        descending: bool,
        column: &str,
    ) -> ResolveResult<()> {
        sink.add_order(&format!("{}_is_null", column), false);
        sink.add_order(column, descending);
        Ok(())
    }
}

#[test]
fn test_custom_sort_strategy() {
    let allow = AllowList::new()
        .sorts([SortSpec::custom("published", Arc::new(NullsLast)).with_column("published_at")]);
    let request = RequestParams::new().sort("-published");

    assert_eq!(
        resolve(&QueryResolver::new(&allow), &request).unwrap(),
        vec![order("published_at_is_null", false), order("published_at", true)]
    );
}
