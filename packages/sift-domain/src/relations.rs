use std::collections::HashMap;

use sift_config::Relations;

use crate::{
	condition::{Condition, RelatedCondition},
	schema::{Catalog, RecordSchema, RelationDef, SchemaRegistry},
};

const FOREIGN_KEY_SUFFIX: &str = "_id";

#[derive(Debug, Clone, Default)]
pub struct RelationRules {
	pub auto_discover: bool,
	pub excluded: Vec<String>,
	/// Column subsets keyed by relation name.
	pub custom: HashMap<String, Vec<String>>,
}
impl RelationRules {
	pub fn from_config(cfg: &Relations) -> Self {
		Self {
			auto_discover: cfg.auto_discover,
			excluded: cfg.excluded.clone(),
			custom: cfg.custom.clone(),
		}
	}

	fn is_excluded(&self, name: &str) -> bool {
		self.excluded.iter().any(|excluded| excluded == name)
	}
}

/// A relation whose target is registered and whose join columns are known.
#[derive(Debug, Clone)]
pub struct ResolvedRelation<'a> {
	pub name: String,
	pub target: &'a RecordSchema,
	pub parent_column: String,
	pub related_column: String,
	/// Explicit column subset for the target; `None` defers to the column selector.
	pub columns: Option<Vec<String>>,
}
impl ResolvedRelation<'_> {
	/// Wraps `condition` as "at least one related record matches".
	pub fn exists(&self, condition: Condition) -> Condition {
		Condition::Related(RelatedCondition {
			relation: self.name.clone(),
			table: self.target.table.clone(),
			parent_column: self.parent_column.clone(),
			related_column: self.related_column.clone(),
			condition: Box::new(condition),
		})
	}
}

/// Declared relations first, then `<name>_id` columns naming a registered record when
/// auto-discovery is on. Excluded and unresolvable relations are skipped.
pub fn searchable_relations<'a>(
	schema: &RecordSchema,
	registry: &'a SchemaRegistry,
	catalog: &dyn Catalog,
	rules: &RelationRules,
) -> Vec<ResolvedRelation<'a>> {
	let mut resolved = Vec::new();

	for relation in &schema.relations {
		if rules.is_excluded(&relation.name) {
			continue;
		}

		let Some(target) = registry.get(&relation.target) else {
			tracing::debug!(
				record = %schema.name,
				relation = %relation.name,
				target = %relation.target,
				"Skipping relation with unregistered target."
			);

			continue;
		};

		resolved.push(resolve(schema, relation, target, rules));
	}

	if !rules.auto_discover {
		return resolved;
	}

	for column in schema.available_columns(catalog) {
		let Some(name) = column.strip_suffix(FOREIGN_KEY_SUFFIX).filter(|name| !name.is_empty())
		else {
			continue;
		};

		if rules.is_excluded(name) || resolved.iter().any(|relation| relation.name == name) {
			continue;
		}

		let Some(target) = registry.get(name) else {
			tracing::debug!(
				record = %schema.name,
				column = %column,
				"Foreign-key column does not name a registered record."
			);

			continue;
		};
		let relation = RelationDef::belongs_to(name, name)
			.keys(column.as_str(), target.primary_key.as_str());

		resolved.push(resolve(schema, &relation, target, rules));
	}

	resolved
}

/// Emits one existence predicate per searchable relation of `schema`, with `nested` building
/// the inner condition from the relation and the depth remaining below it. Nothing is emitted
/// once `depth` reaches zero, and every hop lowers the depth by one, so cyclic relation graphs
/// terminate.
pub fn walk_relations<'a, F>(
	schema: &RecordSchema,
	registry: &'a SchemaRegistry,
	catalog: &dyn Catalog,
	rules: &RelationRules,
	depth: u32,
	mut nested: F,
) -> Vec<Condition>
where
	F: FnMut(&ResolvedRelation<'a>, u32) -> Option<Condition>,
{
	if depth == 0 {
		return Vec::new();
	}

	let mut conditions = Vec::new();

	for relation in searchable_relations(schema, registry, catalog, rules) {
		if let Some(inner) = nested(&relation, depth - 1) {
			conditions.push(relation.exists(inner));
		}
	}

	conditions
}

fn resolve<'a>(
	owner: &RecordSchema,
	relation: &RelationDef,
	target: &'a RecordSchema,
	rules: &RelationRules,
) -> ResolvedRelation<'a> {
	let (parent_column, related_column) = relation.join_columns(owner, target);
	let columns = relation.columns.clone().or_else(|| rules.custom.get(&relation.name).cloned());

	ResolvedRelation { name: relation.name.clone(), target, parent_column, related_column, columns }
}
