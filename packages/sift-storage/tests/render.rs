use sift_domain::{Condition, RelatedCondition, SearchMode, SelectQuery};
use sift_storage::{Dialect, render_select, render_where};

fn contains(column: &str, term: &str) -> Condition {
	Condition::compare(column, term, SearchMode::Like, false)
}

fn category_exists(condition: Condition) -> Condition {
	Condition::Related(RelatedCondition {
		relation: "category".to_string(),
		table: "categories".to_string(),
		parent_column: "category_id".to_string(),
		related_column: "id".to_string(),
		condition: Box::new(condition),
	})
}

#[test]
fn select_without_filter_has_no_where_clause() {
	let rendered = render_select(&SelectQuery::new("product", "products"), Dialect::Postgres);

	assert_eq!(rendered.sql, r#"SELECT t0.* FROM "products" AS t0"#);
	assert!(rendered.params.is_empty());
}

#[test]
fn postgres_substring_uses_ilike_with_escaped_pattern() {
	let condition = Condition::or_any([contains("name", "50%"), contains("sku", "kb_1")])
		.expect("Non-empty group.");
	let rendered = render_where(&condition, Dialect::Postgres);

	assert_eq!(
		rendered.sql,
		r#"(t0."name"::text ILIKE $1 ESCAPE '\' OR t0."sku"::text ILIKE $2 ESCAPE '\')"#
	);
	assert_eq!(rendered.params, vec![r"%50\%%".to_string(), r"%kb\_1%".to_string()]);
}

#[test]
fn modes_shape_the_pattern() {
	let starts = Condition::compare("name", "Key", SearchMode::StartsWith, true);
	let ends = Condition::compare("name", "Key", SearchMode::EndsWith, true);
	let exact = Condition::compare("name", "Key", SearchMode::Exact, true);

	assert_eq!(render_where(&starts, Dialect::Postgres).params, vec!["Key%".to_string()]);
	assert_eq!(render_where(&ends, Dialect::Postgres).params, vec!["%Key".to_string()]);
	assert_eq!(render_where(&exact, Dialect::Postgres).sql, r#"t0."name"::text = $1"#);
}

#[test]
fn case_insensitive_leaves_lower_both_sides_outside_postgres() {
	let rendered = render_where(&contains("name", "Key"), Dialect::MySql);

	assert_eq!(rendered.sql, "LOWER(t0.`name`) LIKE LOWER(?)");

	let exact = Condition::compare("name", "Key", SearchMode::Exact, false);

	assert_eq!(render_where(&exact, Dialect::Sqlite).sql, r#"LOWER(t0."name") = LOWER(?)"#);
}

#[test]
fn case_sensitive_sqlite_uses_glob() {
	let condition = Condition::compare("name", "a*b", SearchMode::StartsWith, true);
	let rendered = render_where(&condition, Dialect::Sqlite);

	assert_eq!(rendered.sql, r#"t0."name" GLOB ?"#);
	assert_eq!(rendered.params, vec!["a[*]b*".to_string()]);
}

#[test]
fn negation_treats_null_as_not_containing() {
	let rendered = render_where(&contains("name", "keyboard").negate(), Dialect::Postgres);

	assert_eq!(rendered.sql, r#"NOT COALESCE((t0."name"::text ILIKE $1 ESCAPE '\'), FALSE)"#);
}

#[test]
fn nested_relations_get_fresh_aliases() {
	let products = Condition::Related(RelatedCondition {
		relation: "products".to_string(),
		table: "products".to_string(),
		parent_column: "id".to_string(),
		related_column: "category_id".to_string(),
		condition: Box::new(contains("name", "mouse")),
	});
	let condition = Condition::or_any([contains("name", "mouse"), category_exists(products)])
		.expect("Non-empty group.");
	let rendered = render_where(&condition, Dialect::Postgres);

	assert_eq!(
		rendered.sql,
		concat!(
			r#"(t0."name"::text ILIKE $1 ESCAPE '\' OR "#,
			r#"EXISTS (SELECT 1 FROM "categories" AS t1 WHERE t1."id" = t0."category_id" AND "#,
			r#"EXISTS (SELECT 1 FROM "products" AS t2 WHERE t2."category_id" = t1."id" AND "#,
			r#"t2."name"::text ILIKE $2 ESCAPE '\')))"#,
		)
	);
	assert_eq!(rendered.params.len(), 2);
}

#[test]
fn full_text_renders_per_dialect() {
	let condition = Condition::full_text("description", "quiet keyboard");

	assert_eq!(
		render_where(&condition, Dialect::Postgres).sql,
		r#"to_tsvector('simple', t0."description"::text) @@ plainto_tsquery('simple', $1)"#
	);
	assert_eq!(
		render_where(&condition, Dialect::MySql).sql,
		"MATCH (t0.`description`) AGAINST (? IN NATURAL LANGUAGE MODE)"
	);

	let fallback = render_where(&condition, Dialect::Sqlite);

	assert_eq!(fallback.sql, r#"LOWER(t0."description") LIKE LOWER(?) ESCAPE '\'"#);
	assert_eq!(fallback.params, vec!["%quiet keyboard%".to_string()]);
}

#[test]
fn select_inlines_for_debug_output() {
	let query = SelectQuery::new("product", "products").with_filter(contains("name", "O'Brien"));
	let rendered = render_select(&query, Dialect::Postgres);

	assert_eq!(
		rendered.inline(),
		r#"SELECT t0.* FROM "products" AS t0 WHERE t0."name"::text ILIKE '%O''Brien%' ESCAPE '\'"#
	);
}
