use sift_domain::{
	Catalog, ColumnRules, Condition, ConditionGroup, Joiner, RecordSchema, Record, RelationDef,
	RelationRules, SchemaRegistry, SearchMode, Searchable, SelectQuery, StaticCatalog,
	filter_records, parse_query, searchable_relations, select_columns, walk_relations,
};

struct Product;
impl Searchable for Product {
	fn search_schema() -> RecordSchema {
		RecordSchema::new("product", "products")
			.relation(RelationDef::belongs_to("category", "category"))
	}
}

struct Category;
impl Searchable for Category {
	fn search_schema() -> RecordSchema {
		RecordSchema::new("category", "categories")
			.relation(RelationDef::has_many("products", "product"))
	}
}

struct User;
impl Searchable for User {
	fn search_schema() -> RecordSchema {
		RecordSchema::new("user", "users")
	}
}

fn strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

fn rules() -> ColumnRules {
	ColumnRules::from_config(&sift_config::Columns::default())
}

fn registry() -> SchemaRegistry {
	let mut registry = SchemaRegistry::new();

	registry.register::<Product>().register::<Category>().register::<User>();

	registry
}

fn catalog() -> StaticCatalog {
	StaticCatalog::default()
		.with_table(
			"products",
			["id", "sku", "name", "description", "category_id", "user_id", "status", "created_at"],
		)
		.with_table("categories", ["id", "name", "slug"])
		.with_table("users", ["id", "name", "email", "password", "remember_token", "api_token"])
}

fn relation_rules() -> RelationRules {
	RelationRules::from_config(&sift_config::Relations::default())
}

#[test]
fn quoted_phrase_is_exact_and_not_split() {
	let parsed = parse_query(r#"cable "Wireless Keyboard" mouse"#);

	assert_eq!(parsed.exact, strings(&["Wireless Keyboard"]));
	assert_eq!(parsed.terms, strings(&["cable", "mouse"]));
	assert!(!parsed.terms.iter().any(|term| term == "Wireless" || term == "Keyboard"));
}

#[test]
fn dash_prefixed_tokens_are_excluded() {
	let parsed = parse_query("keyboard -wired -usb");

	assert_eq!(parsed.terms, strings(&["keyboard"]));
	assert_eq!(parsed.excluded, strings(&["wired", "usb"]));

	let parsed = parse_query(r#"keyboard -"usb hub""#);

	assert_eq!(parsed.exact, strings(&["usb hub"]));
	assert!(parsed.excluded.is_empty());
}

#[test]
fn or_token_sets_flag_case_insensitively() {
	let parsed = parse_query("Keyboard or Mouse");

	assert!(parsed.use_or);
	assert_eq!(parsed.terms, strings(&["Keyboard", "Mouse"]));

	let parsed = parse_query("Keyboard ORDER");

	assert!(!parsed.use_or);
	assert_eq!(parsed.terms, strings(&["Keyboard", "ORDER"]));
}

#[test]
fn blank_input_parses_to_empty() {
	assert!(parse_query("").is_empty());
	assert!(parse_query("   \t ").is_empty());
	assert!(parse_query("OR").is_empty());
}

#[test]
fn explicit_columns_are_used_verbatim() {
	let explicit = strings(&["password", "sku", "name"]);
	let selected = select_columns(Some(&explicit), &strings(&["name"]), &rules());

	assert_eq!(selected, explicit);
}

#[test]
fn empty_explicit_list_falls_back_to_the_catalog() {
	let explicit: Vec<String> = Vec::new();
	let selected = select_columns(Some(explicit.as_slice()), &strings(&["name", "sku"]), &rules());

	assert_eq!(selected, strings(&["name", "sku"]));
}

#[test]
fn priority_ignores_column_case() {
	let available = strings(&["Sku", "Name"]);

	assert_eq!(select_columns(None, &available, &rules()), strings(&["Name", "Sku"]));
}

#[test]
fn introspected_columns_are_filtered_and_prioritized() {
	let available = catalog().columns("users").expect("users table is cataloged");
	let selected = select_columns(None, &available, &rules());

	assert_eq!(selected, strings(&["name", "email"]));

	let available = strings(&["sku", "description", "title", "status", "name"]);
	let selected = select_columns(None, &available, &rules());

	assert_eq!(selected, strings(&["name", "title", "sku", "description", "status"]));
}

#[test]
fn column_cap_applies_after_priority_sort() {
	let rules = ColumnRules { max_per_table: 2, ..rules() };
	let available = strings(&["sku", "description", "name"]);

	assert_eq!(select_columns(None, &available, &rules), strings(&["name", "sku"]));
}

#[test]
fn declared_and_discovered_relations_resolve() {
	let registry = registry();
	let catalog = catalog();
	let product = registry.require("product").expect("product is registered");
	let relations = searchable_relations(product, &registry, &catalog, &relation_rules());
	let names: Vec<&str> = relations.iter().map(|relation| relation.name.as_str()).collect();

	assert_eq!(names, vec!["category", "user"]);
	assert_eq!(relations[0].parent_column, "category_id");
	assert_eq!(relations[0].related_column, "id");
	assert_eq!(relations[1].target.table, "users");
}

#[test]
fn has_many_relation_uses_owner_foreign_key() {
	let registry = registry();
	let catalog = catalog();
	let category = registry.require("category").expect("category is registered");
	let relations = searchable_relations(category, &registry, &catalog, &relation_rules());

	assert_eq!(relations.len(), 1);
	assert_eq!(relations[0].parent_column, "id");
	assert_eq!(relations[0].related_column, "category_id");
}

#[test]
fn excluded_and_unknown_relations_are_skipped() {
	let mut registry = registry();

	registry.insert(
		RecordSchema::new("order", "orders")
			.columns(["id", "warehouse_id", "user_id"])
			.relation(RelationDef::belongs_to("supplier", "supplier")),
	);

	let catalog = catalog();
	let order = registry.require("order").expect("order is registered");
	let rules = RelationRules { excluded: strings(&["user"]), ..relation_rules() };

	assert!(searchable_relations(order, &registry, &catalog, &rules).is_empty());
}

#[test]
fn auto_discovery_can_be_disabled() {
	let registry = registry();
	let catalog = catalog();
	let product = registry.require("product").expect("product is registered");
	let rules = RelationRules { auto_discover: false, ..relation_rules() };
	let relations = searchable_relations(product, &registry, &catalog, &rules);

	assert_eq!(relations.len(), 1);
	assert_eq!(relations[0].name, "category");
}

#[test]
fn custom_relation_columns_are_applied() {
	let registry = registry();
	let catalog = catalog();
	let product = registry.require("product").expect("product is registered");
	let mut rules = relation_rules();

	rules.custom.insert("user".to_string(), strings(&["email"]));

	let relations = searchable_relations(product, &registry, &catalog, &rules);

	assert_eq!(relations[1].columns, Some(strings(&["email"])));
	assert_eq!(relations[0].columns, None);
}

#[test]
fn walk_stops_at_zero_depth_on_cycles() {
	let registry = registry();
	let catalog = catalog();
	let rules = RelationRules { auto_discover: false, ..relation_rules() };

	fn nest(
		schema: &RecordSchema,
		registry: &SchemaRegistry,
		catalog: &StaticCatalog,
		rules: &RelationRules,
		depth: u32,
	) -> Option<Condition> {
		let mut group = ConditionGroup::new(Joiner::Or);

		group.add_term("name", "x", SearchMode::Like, false);

		for related in walk_relations(schema, registry, catalog, rules, depth, |relation, remaining| {
			nest(relation.target, registry, catalog, rules, remaining)
		}) {
			group.push(related);
		}

		group.finish()
	}

	let product = registry.require("product").expect("product is registered");

	for depth in 0..5 {
		let condition =
			nest(product, &registry, &catalog, &rules, depth).expect("group has a leaf");

		assert_eq!(condition.related_depth(), depth);
	}
}

#[test]
fn evaluates_modes_against_records() {
	let keyboard = Record::new().with("name", "Keyboard");
	let mechanical = Record::new().with("name", "Mechanical Key");
	let starts = Condition::compare("name", "Key", SearchMode::StartsWith, false);
	let ends = Condition::compare("name", "key", SearchMode::EndsWith, false);
	let exact = Condition::compare("name", "keyboard", SearchMode::Exact, false);
	let exact_sensitive = Condition::compare("name", "keyboard", SearchMode::Exact, true);

	assert!(starts.matches(&keyboard));
	assert!(!starts.matches(&mechanical));
	assert!(ends.matches(&mechanical));
	assert!(!ends.matches(&keyboard));
	assert!(exact.matches(&keyboard));
	assert!(!exact_sensitive.matches(&keyboard));
}

#[test]
fn null_values_never_match_but_satisfy_negation() {
	let record = Record::new().with_null("name");
	let contains = Condition::compare("name", "a", SearchMode::Like, false);

	assert!(!contains.matches(&record));
	assert!(contains.negate().matches(&record));
}

#[test]
fn related_records_satisfy_existence() {
	let record = Record::new()
		.with("name", "Mouse")
		.with_related("category", vec![Record::new().with("name", "Peripherals")]);
	let relation = RelationDef::belongs_to("category", "category");
	let registry = registry();
	let product = registry.require("product").expect("product is registered");
	let category = registry.require("category").expect("category is registered");
	let (parent_column, related_column) = relation.join_columns(product, category);
	let condition = Condition::Related(sift_domain::RelatedCondition {
		relation: "category".to_string(),
		table: "categories".to_string(),
		parent_column,
		related_column,
		condition: Box::new(Condition::compare("name", "periph", SearchMode::Like, false)),
	});

	assert!(condition.matches(&record));
	assert!(!condition.matches(&Record::new().with("name", "Mouse")));
}

#[test]
fn search_index_joins_lowercased_values() {
	let record = Record::new()
		.with("name", "  Wireless Keyboard ")
		.with("sku", "KB-100")
		.with("notes", "   ")
		.with_null("description");
	let columns = strings(&["name", "description", "missing", "notes", "sku"]);

	assert_eq!(record.search_index(&columns), "wireless keyboard kb-100");
	assert_eq!(record.search_index(&[]), "");
}

#[test]
fn records_load_from_json() {
	let raw = serde_json::json!({
		"name": "Mouse",
		"price": 12,
		"description": null,
		"category": { "name": "Peripherals" },
		"tags": [{ "name": "wireless" }, { "name": "usb" }],
	});
	let record = Record::from_json(&raw).expect("object parses");

	assert_eq!(record.value("name"), Some("Mouse"));
	assert_eq!(record.value("price"), Some("12"));
	assert_eq!(record.value("description"), None);
	assert_eq!(record.related["category"].len(), 1);
	assert_eq!(record.related["tags"].len(), 2);
}

#[test]
fn full_text_requires_every_word() {
	let record = Record::new().with("description", "A quiet wireless keyboard.");

	assert!(Condition::full_text("description", "Wireless keyboard").matches(&record));
	assert!(!Condition::full_text("description", "wireless mouse").matches(&record));
	assert!(!Condition::full_text("description", "  ").matches(&record));
}

#[test]
fn filter_without_condition_keeps_everything() {
	let records = vec![Record::new().with("name", "a"), Record::new().with("name", "b")];

	assert_eq!(filter_records(None, &records).len(), 2);
}

#[test]
fn select_query_ands_new_filters() {
	let first = Condition::compare("status", "active", SearchMode::Exact, true);
	let second = Condition::compare("name", "mouse", SearchMode::Like, false);
	let query = SelectQuery::new("product", "products")
		.with_filter(first.clone())
		.with_filter(second.clone());

	assert_eq!(query.filter, Some(Condition::And(vec![first, second])));
}
