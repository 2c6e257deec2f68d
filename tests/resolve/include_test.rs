use sifter::prelude::*;

fn eager(relation: &str, alias: Option<&str>) -> Directive {
    Directive::EagerLoad {
        relation: relation.into(),
        alias: alias.map(Into::into),
    }
}

fn resolve(allow: &AllowList, include: &str) -> ResolveResult<Vec<Directive>> {
    let mut sink = RecordingSink::new("test_models");
    QueryResolver::new(allow).resolve(&RequestParams::new().include(include), &mut sink)?;
    Ok(sink.into_directives())
}

#[test]
fn test_aliased_include_exposes_external_name() {
    let allow = AllowList::new().includes([AllowEntry::alias("related-models", "alias-test")]);

    assert_eq!(
        resolve(&allow, "alias-test").unwrap(),
        vec![eager("relatedModels", Some("alias-test"))]
    );
}

#[test]
fn test_aliased_include_rejects_internal_name() {
    let allow = AllowList::new().includes([AllowEntry::alias("related-models", "alias-test")]);

    let err = resolve(&allow, "related-models").unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnknownInclude {
            unknown: vec!["related-models".into()],
            allowed: vec!["alias-test".into()],
        }
    );
}

#[test]
fn test_nested_include_registers_parents() {
    let allow = AllowList::new().includes(["related-models.nested-related-models"]);

    assert_eq!(
        allow.allowed_includes(),
        vec!["related-models", "related-models.nested-related-models"]
    );
    assert_eq!(
        resolve(&allow, "related-models").unwrap(),
        vec![eager("relatedModels", None)]
    );
    assert_eq!(
        resolve(&allow, "related-models.nested-related-models").unwrap(),
        vec![eager("relatedModels.nestedRelatedModels", None)]
    );
}

#[test]
fn test_nested_include_under_aliased_parent() {
    let allow = AllowList::new().includes([
        AllowEntry::alias("related-models", "alias"),
        AllowEntry::from("related-models.nested-related-models"),
    ]);

    assert_eq!(
        allow.allowed_includes(),
        vec!["alias", "related-models.nested-related-models"]
    );
    assert_eq!(
        resolve(&allow, "related-models.nested-related-models").unwrap(),
        vec![eager("relatedModels.nestedRelatedModels", None)]
    );
    assert!(resolve(&allow, "related-models").is_err());
}

#[test]
fn test_two_aliases_of_one_relation_are_distinct() {
    let allow = AllowList::new().includes([
        AllowEntry::alias("posts", "articles"),
        AllowEntry::alias("posts", "entries"),
    ]);

    assert_eq!(
        resolve(&allow, "articles,entries").unwrap(),
        vec![eager("posts", Some("articles")), eager("posts", Some("entries"))]
    );
}

#[test]
fn test_repeated_include_is_loaded_once() {
    let allow = AllowList::new().includes(["posts"]);

    assert_eq!(
        resolve(&allow, "posts,Posts, posts").unwrap(),
        vec![eager("posts", None)]
    );
}

#[test]
fn test_unknown_includes_are_reported_together() {
    let allow = AllowList::new().includes(["posts", "comments"]);

    let err = resolve(&allow, "posts,tags,author").unwrap_err();
    assert_eq!(err.unknown(), ["tags", "author"]);
    assert_eq!(err.allowed(), ["posts", "comments"]);
    assert_eq!(
        err.to_string(),
        "Requested include(s) `tags, author` are not allowed. Allowed include(s) are `posts, comments`."
    );
}

#[test]
fn test_include_error_wins_over_filter_and_sort_errors() {
    let allow = AllowList::new();
    let request = RequestParams::new()
        .filter("name", "x")
        .sort("name")
        .include("posts");
    let mut sink = RecordingSink::new("users");

    let err = QueryResolver::new(&allow)
        .resolve(&request, &mut sink)
        .unwrap_err();

    assert!(matches!(err, ResolveError::UnknownInclude { .. }));
    assert!(sink.directives().is_empty());
}
