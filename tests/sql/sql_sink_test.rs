use insta::assert_snapshot;
use sifter::prelude::*;
use sifter::sql::{EagerLoad, Relation, TableSchema};
use sqlparser::ast;
use sqlparser::dialect::{DuckDbDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

const DIALECTS: [Dialect; 4] = [
    Dialect::DuckDb,
    Dialect::Postgres,
    Dialect::MySql,
    Dialect::TSql,
];

fn parse_sql(sql: &str, dialect: Dialect) -> Vec<ast::Statement> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::TSql => Box::new(MsSqlDialect {}),
    };
    match Parser::parse_sql(&*parser_dialect, sql) {
        Ok(statements) => statements,
        Err(e) => panic!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql),
    }
}

fn validate_sql(sql: &str, dialect: Dialect) {
    parse_sql(sql, dialect);
}

/// The parsed WHERE clause of a single SELECT.
fn where_clause(sql: &str, dialect: Dialect) -> ast::Expr {
    let statements = parse_sql(sql, dialect);
    assert_eq!(statements.len(), 1, "expected one statement: {}", sql);
    match &statements[0] {
        ast::Statement::Query(query) => match query.body.as_ref() {
            ast::SetExpr::Select(select) => match &select.selection {
                Some(selection) => selection.clone(),
                None => panic!("no WHERE clause: {}", sql),
            },
            other => panic!("expected SELECT, got {}", other),
        },
        other => panic!("expected a query, got {}", other),
    }
}

/// Assert the WHERE clause is exactly `column = '<value>'`.
fn assert_single_string_equality(sql: &str, dialect: Dialect, column: &str, value: &str) {
    match where_clause(sql, dialect) {
        ast::Expr::BinaryOp {
            left,
            op: ast::BinaryOperator::Eq,
            right,
        } => {
            assert_eq!(
                *left,
                ast::Expr::Identifier(ast::Ident::with_quote(quote_char(dialect), column)),
                "{:?}: {}",
                dialect,
                sql
            );
            match *right {
                ast::Expr::Value(ast::Value::SingleQuotedString(s))
                | ast::Expr::Value(ast::Value::NationalStringLiteral(s)) => {
                    assert_eq!(s, value, "{:?}: {}", dialect, sql)
                }
                other => panic!("{:?}: expected a string literal, got {} in {}", dialect, other, sql),
            }
        }
        other => panic!("{:?}: expected a single equality, got {} in {}", dialect, other, sql),
    }
}

fn quote_char(dialect: Dialect) -> char {
    match dialect {
        Dialect::DuckDb | Dialect::Postgres => '"',
        Dialect::MySql => '`',
        Dialect::TSql => '[',
    }
}

fn schema() -> Schema {
    Schema::new()
        .with_table(TableSchema::new("test_models").with_relation(
            "relatedModels",
            Relation {
                table: "related_models".into(),
                foreign_key: "test_model_id".into(),
                local_key: "id".into(),
            },
        ))
        .with_table(TableSchema::new("related_models").with_relation(
            "nestedRelatedModels",
            Relation {
                table: "nested_related_models".into(),
                foreign_key: "related_model_id".into(),
                local_key: "id".into(),
            },
        ))
        .with_table(TableSchema::new("nested_related_models"))
}

fn allow_list() -> AllowList {
    AllowList::new()
        .filters([
            "id",
            "name",
            "active",
            "deleted_at",
            "related-models.name",
            "related-models.nested-related-models.name",
            "author.name",
        ])
        .sorts(["name", "created_at"])
        .includes([AllowEntry::alias("related-models", "alias-test")])
}

fn render(request: &RequestParams, dialect: Dialect) -> String {
    let schema = schema();
    let allow = allow_list();
    let mut sink = SqlSink::new(&schema, "test_models").unwrap();
    QueryResolver::new(&allow)
        .resolve(request, &mut sink)
        .unwrap();
    let sql = sink.to_sql(dialect);
    validate_sql(&sql, dialect);
    sql
}

#[test]
fn test_plain_filters_and_sort() {
    let request = RequestParams::new()
        .filter("name", "O'Brien")
        .filter("id", FilterValue::list([1_i64, 2]))
        .sort("-created_at,name");

    assert_snapshot!(
        render(&request, Dialect::Postgres),
        @r#"SELECT * FROM "test_models" WHERE "id" IN (1, 2) AND "name" = 'O''Brien' ORDER BY "created_at" DESC, "name" ASC"#
    );
}

#[test]
fn test_relation_filter_is_correlated_exists() {
    let request = RequestParams::new().filter("related-models.name", "Test");

    assert_snapshot!(
        render(&request, Dialect::DuckDb),
        @r#"SELECT * FROM "test_models" WHERE EXISTS (SELECT * FROM "related_models" WHERE "related_models"."test_model_id" = "test_models"."id" AND "related_models"."name" = 'Test')"#
    );
}

#[test]
fn test_nested_relation_filter_nests_exists() {
    let request =
        RequestParams::new().filter("related-models.nested-related-models.name", "Deep");

    assert_snapshot!(
        render(&request, Dialect::TSql),
        @"SELECT * FROM [test_models] WHERE EXISTS (SELECT * FROM [related_models] WHERE [related_models].[test_model_id] = [test_models].[id] AND EXISTS (SELECT * FROM [nested_related_models] WHERE [nested_related_models].[related_model_id] = [related_models].[id] AND [nested_related_models].[name] = 'Deep'))"
    );
}

#[test]
fn test_empty_membership_matches_nothing() {
    let request = RequestParams::new().filter("id", FilterValue::List(vec![]));

    assert_snapshot!(
        render(&request, Dialect::Postgres),
        @r#"SELECT * FROM "test_models" WHERE FALSE"#
    );
    assert_snapshot!(
        render(&request, Dialect::TSql),
        @"SELECT * FROM [test_models] WHERE 1 = 0"
    );
}

#[test]
fn test_null_and_boolean_values() {
    let request = RequestParams::new()
        .filter("deleted_at", FilterValue::Scalar(Value::Null))
        .filter("active", FilterValue::from_raw("true"));

    assert_snapshot!(
        render(&request, Dialect::MySql),
        @"SELECT * FROM `test_models` WHERE `active` = 1 AND `deleted_at` IS NULL"
    );
}

#[test]
fn test_includes_are_collected_not_rendered() {
    let schema = schema();
    let allow = allow_list();
    let mut sink = SqlSink::new(&schema, "test_models").unwrap();

    QueryResolver::new(&allow)
        .resolve(&RequestParams::new().include("alias-test"), &mut sink)
        .unwrap();

    assert_eq!(
        sink.eager_loads(),
        [EagerLoad {
            relation: "relatedModels".into(),
            alias: Some("alias-test".into()),
        }]
    );
    assert_snapshot!(sink.to_sql(Dialect::Postgres), @r#"SELECT * FROM "test_models""#);
}

#[test]
fn test_unknown_relation_fails_resolution() {
    let schema = schema();
    let allow = allow_list();
    let mut sink = SqlSink::new(&schema, "test_models").unwrap();

    let err = QueryResolver::new(&allow)
        .resolve(&RequestParams::new().filter("author.name", "Ada"), &mut sink)
        .unwrap_err();

    assert_eq!(
        err,
        ResolveError::Sink(SinkError::UnknownRelation {
            table: "test_models".into(),
            relation: "author".into(),
        })
    );
    assert_eq!(
        err.to_string(),
        "Unknown relation 'author' on table 'test_models'"
    );
}

#[test]
fn test_every_dialect_parses() {
    let request = RequestParams::new()
        .filter("related-models.name", FilterValue::from_raw("a,b"))
        .filter("active", false)
        .sort("-name");

    for dialect in DIALECTS {
        render(&request, dialect);
    }
}

#[test]
fn test_mysql_backslash_cannot_close_literal() {
    let value = "\\' OR 1=1 -- ";
    let request = RequestParams::new().filter("name", value);
    let sql = render(&request, Dialect::MySql);

    assert_snapshot!(sql, @r"SELECT * FROM `test_models` WHERE `name` = '\\'' OR 1=1 -- '");
    assert_single_string_equality(&sql, Dialect::MySql, "name", value);
}

#[test]
fn test_string_literals_are_escaped_per_dialect() {
    let value = "O'Brien \\ Zoë";
    let request = RequestParams::new().filter("name", value);

    assert_snapshot!(
        render(&request, Dialect::DuckDb),
        @r#"SELECT * FROM "test_models" WHERE "name" = 'O''Brien \ Zoë'"#
    );
    assert_snapshot!(
        render(&request, Dialect::Postgres),
        @r#"SELECT * FROM "test_models" WHERE "name" = 'O''Brien \ Zoë'"#
    );
    assert_snapshot!(
        render(&request, Dialect::MySql),
        @r"SELECT * FROM `test_models` WHERE `name` = 'O''Brien \\ Zoë'"
    );
    assert_snapshot!(
        render(&request, Dialect::TSql),
        @r"SELECT * FROM [test_models] WHERE [name] = N'O''Brien \ Zoë'"
    );

    for dialect in DIALECTS {
        let sql = render(&request, dialect);
        assert_single_string_equality(&sql, dialect, "name", value);
    }
}
