pub mod search;

mod error;

pub use error::{Error, Result};
pub use search::SearchRequest;

use std::sync::Arc;

use sift_config::Config;
use sift_domain::{
	Capabilities, Catalog, ColumnRules, OptionsOverride, RecordSchema, RelationRules,
	SchemaRegistry, SearchOptions,
};

pub struct SiftService {
	pub cfg: Config,
	pub registry: SchemaRegistry,
	pub catalog: Arc<dyn Catalog + Send + Sync>,
	pub capabilities: Capabilities,
	column_rules: ColumnRules,
	relation_rules: RelationRules,
}
impl SiftService {
	pub fn new(
		cfg: Config,
		registry: SchemaRegistry,
		catalog: Arc<dyn Catalog + Send + Sync>,
		capabilities: Capabilities,
	) -> Self {
		let column_rules = ColumnRules::from_config(&cfg.columns);
		let relation_rules = RelationRules::from_config(&cfg.relations);

		Self { cfg, registry, catalog, capabilities, column_rules, relation_rules }
	}

	/// Package defaults, then the record's declared overrides, then `[models.<record>]`, then the
	/// call site.
	pub fn effective_options(
		&self,
		schema: &RecordSchema,
		request: &SearchRequest,
	) -> Result<SearchOptions> {
		let mut options =
			SearchOptions::from_defaults(&self.cfg.search.defaults)?.merged(&schema.overrides);

		if let Some(model) = self.cfg.models.get(&schema.name) {
			options = options.merged(&OptionsOverride::try_from(model)?);
		}

		Ok(options.merged(&request.options))
	}
}
