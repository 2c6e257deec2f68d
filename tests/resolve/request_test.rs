use sifter::config::ParameterNames;
use sifter::prelude::*;

fn pairs<'a>(raw: &'a [(&'a str, &'a str)]) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    raw.iter().copied()
}

#[test]
fn test_from_query_pairs() {
    let raw = [
        ("filter[name]", "John"),
        ("filter[id]", "1,2,3"),
        ("filter[active]", "true"),
        ("sort", "-name"),
        ("include", "posts,comments"),
        ("page", "2"),
    ];
    let request = RequestParams::from_query_pairs(pairs(&raw), &ParameterNames::default());

    assert_eq!(request.filters.len(), 3);
    assert_eq!(request.filters["name"], FilterValue::from("John"));
    assert_eq!(
        request.filters["id"],
        FilterValue::list(["1", "2", "3"])
    );
    assert_eq!(request.filters["active"], FilterValue::from(true));
    assert_eq!(
        request.sorts(),
        vec![SortDirective {
            name: "name".into(),
            descending: true
        }]
    );
    assert_eq!(request.includes(), vec!["posts", "comments"]);
}

#[test]
fn test_from_query_string_percent_decodes() {
    let request = RequestParams::from_query_string(
        "filter[name]=a%20b&filter%5Bid%5D=1%2C2&filter[note]=50%25+off&sort=-name&include=posts",
        &ParameterNames::default(),
    );

    assert_eq!(request.filters.len(), 3);
    assert_eq!(request.filters["name"], FilterValue::from("a b"));
    assert_eq!(request.filters["id"], FilterValue::list(["1", "2"]));
    assert_eq!(request.filters["note"], FilterValue::from("50% off"));
    assert_eq!(request.sort.as_deref(), Some("-name"));
    assert_eq!(request.includes(), vec!["posts"]);
}

#[test]
fn test_custom_parameter_names() {
    let names = ParameterNames {
        filter: "where".into(),
        sort: "order".into(),
        include: "with".into(),
    };
    let raw = [
        ("where[name]", "John"),
        ("filter[name]", "ignored"),
        ("order", "name"),
        ("with", "posts"),
    ];
    let request = RequestParams::from_query_pairs(pairs(&raw), &names);

    assert_eq!(request.filters.len(), 1);
    assert_eq!(request.filters["name"], FilterValue::from("John"));
    assert_eq!(request.sort.as_deref(), Some("name"));
    assert_eq!(request.include.as_deref(), Some("posts"));
}

#[test]
fn test_request_from_json() {
    let request: RequestParams = serde_json::from_str(
        r#"{
            "filters": { "name": "Ada", "id": [1, 2], "deleted_at": null },
            "sort": "-created_at"
        }"#,
    )
    .unwrap();

    assert_eq!(request.filters["name"], FilterValue::from("Ada"));
    assert_eq!(
        request.filters["id"],
        FilterValue::List(vec![Value::Int(1), Value::Int(2)])
    );
    assert_eq!(request.filters["deleted_at"], FilterValue::Scalar(Value::Null));
    assert!(request.include.is_none());
}

#[test]
fn test_query_string_end_to_end() {
    let allow = AllowList::new()
        .filters(["name", "related-models.name"])
        .sorts([SortSpec::field("name").with_column("full_name")])
        .includes([AllowEntry::alias("related-models", "alias-test")]);
    let raw = [
        ("filter[related-models.name]", "Test"),
        ("sort", "-name"),
        ("include", "alias-test"),
    ];
    let request = RequestParams::from_query_pairs(pairs(&raw), &ParameterNames::default());
    let mut sink = RecordingSink::new("test_models");

    QueryResolver::new(&allow)
        .resolve(&request, &mut sink)
        .unwrap();

    let json = serde_json::to_value(sink.directives()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "kind": "eager_load", "relation": "relatedModels", "alias": "alias-test" },
            {
                "kind": "exists",
                "relation": "relatedModels",
                "table": "related_models",
                "directives": [
                    { "kind": "equality", "path": "related_models.name", "value": "Test" }
                ]
            },
            { "kind": "order", "column": "full_name", "descending": true }
        ])
    );
}
