use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub storage: Option<Storage>,
	pub search: Search,
	pub columns: Columns,
	pub relations: Relations,
	pub performance: Performance,
	/// Per-record option overrides, keyed by record name.
	pub models: HashMap<String, ModelOverrides>,
	/// Record schemas declared in configuration, keyed by record name.
	pub schemas: HashMap<String, SchemaConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Global switch. A disabled search leaves every query unconstrained.
	pub enabled: bool,
	pub defaults: SearchDefaults,
}
impl Default for Search {
	fn default() -> Self {
		Self { enabled: true, defaults: SearchDefaults::default() }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
	/// One of "like", "exact", "starts_with", "ends_with".
	pub mode: String,
	pub deep: bool,
	pub max_relation_depth: u32,
	/// One of "and", "or". Joins the per-column comparisons of a term.
	pub search_operator: String,
	pub case_sensitive: bool,
	pub full_text: bool,
	pub min_length: Option<usize>,
	pub max_length: Option<usize>,
}
impl Default for SearchDefaults {
	fn default() -> Self {
		Self {
			mode: "like".to_string(),
			deep: true,
			max_relation_depth: 2,
			search_operator: "or".to_string(),
			case_sensitive: false,
			full_text: false,
			min_length: None,
			max_length: None,
		}
	}
}

/// Same keys as [`SearchDefaults`], every one optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelOverrides {
	pub mode: Option<String>,
	pub deep: Option<bool>,
	pub max_relation_depth: Option<u32>,
	pub search_operator: Option<String>,
	pub case_sensitive: Option<bool>,
	pub full_text: Option<bool>,
	pub min_length: Option<usize>,
	pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Columns {
	pub excluded: Vec<String>,
	pub prioritized: Vec<String>,
	pub sensitive_suffixes: Vec<String>,
	/// Zero disables the cap.
	pub max_per_table: usize,
}
impl Default for Columns {
	fn default() -> Self {
		Self {
			excluded: [
				"id",
				"created_at",
				"updated_at",
				"deleted_at",
				"password",
				"remember_token",
			]
			.map(str::to_string)
			.to_vec(),
			prioritized: ["name", "title", "code", "email"].map(str::to_string).to_vec(),
			sensitive_suffixes: ["_token", "password", "_secret"].map(str::to_string).to_vec(),
			max_per_table: 10,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Relations {
	pub auto_discover: bool,
	pub max_depth: u32,
	pub excluded: Vec<String>,
	/// Column subsets searched on a relation, keyed by relation name.
	pub custom: HashMap<String, Vec<String>>,
}
impl Default for Relations {
	fn default() -> Self {
		Self {
			auto_discover: true,
			max_depth: 2,
			excluded: ["password", "secret", "tokens"].map(str::to_string).to_vec(),
			custom: HashMap::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Performance {
	/// Upper bound on relation traversals per search term. Zero disables the cap.
	pub max_join_tables: usize,
}
impl Default for Performance {
	fn default() -> Self {
		Self { max_join_tables: 5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
	pub table: String,
	#[serde(default = "default_primary_key")]
	pub primary_key: String,
	/// Empty means the column listing comes from the catalog.
	#[serde(default)]
	pub columns: Vec<String>,
	#[serde(default)]
	pub full_text_columns: Vec<String>,
	#[serde(default)]
	pub relations: Vec<RelationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationConfig {
	pub name: String,
	pub target: String,
	/// One of "belongs_to", "has_many".
	#[serde(default = "default_relation_kind")]
	pub kind: String,
	pub parent_column: Option<String>,
	pub related_column: Option<String>,
	pub columns: Option<Vec<String>>,
}

fn default_pool_max_conns() -> u32 {
	4
}

fn default_primary_key() -> String {
	"id".to_string()
}

fn default_relation_kind() -> String {
	"belongs_to".to_string()
}
