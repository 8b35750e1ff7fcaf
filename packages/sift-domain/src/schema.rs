use std::collections::HashMap;

use sift_config::{Config, SchemaConfig};

use crate::{Error, Result, options::OptionsOverride};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
	/// The outer record holds the foreign key.
	BelongsTo,
	/// The related records hold the foreign key.
	HasMany,
}
impl RelationKind {
	pub fn parse(raw: &str) -> Result<Self> {
		match raw {
			"belongs_to" => Ok(Self::BelongsTo),
			"has_many" => Ok(Self::HasMany),
			other => Err(Error::InvalidOption {
				field: "relation.kind".to_string(),
				message: format!("'{other}' is not one of belongs_to or has_many."),
			}),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
	pub name: String,
	/// Record name of the related type.
	pub target: String,
	pub kind: RelationKind,
	pub parent_column: Option<String>,
	pub related_column: Option<String>,
	/// Columns searched on the related record. `None` defers to the column selector.
	pub columns: Option<Vec<String>>,
}
impl RelationDef {
	pub fn belongs_to(name: impl Into<String>, target: impl Into<String>) -> Self {
		Self::new(name, target, RelationKind::BelongsTo)
	}

	pub fn has_many(name: impl Into<String>, target: impl Into<String>) -> Self {
		Self::new(name, target, RelationKind::HasMany)
	}

	fn new(name: impl Into<String>, target: impl Into<String>, kind: RelationKind) -> Self {
		Self {
			name: name.into(),
			target: target.into(),
			kind,
			parent_column: None,
			related_column: None,
			columns: None,
		}
	}

	pub fn keys(
		mut self,
		parent_column: impl Into<String>,
		related_column: impl Into<String>,
	) -> Self {
		self.parent_column = Some(parent_column.into());
		self.related_column = Some(related_column.into());

		self
	}

	pub fn columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = Some(columns.into_iter().map(Into::into).collect());

		self
	}

	/// Join columns as `(outer, related)`, filling Laravel-style defaults.
	pub fn join_columns(&self, owner: &RecordSchema, target: &RecordSchema) -> (String, String) {
		match self.kind {
			RelationKind::BelongsTo => (
				self.parent_column.clone().unwrap_or_else(|| format!("{}_id", self.name)),
				self.related_column.clone().unwrap_or_else(|| target.primary_key.clone()),
			),
			RelationKind::HasMany => (
				self.parent_column.clone().unwrap_or_else(|| owner.primary_key.clone()),
				self.related_column.clone().unwrap_or_else(|| format!("{}_id", owner.name)),
			),
		}
	}
}

/// Declared search surface of one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
	pub name: String,
	pub table: String,
	pub primary_key: String,
	/// Empty means the catalog supplies the listing.
	pub columns: Vec<String>,
	pub full_text_columns: Vec<String>,
	pub relations: Vec<RelationDef>,
	pub overrides: OptionsOverride,
}
impl RecordSchema {
	pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			table: table.into(),
			primary_key: "id".to_string(),
			columns: Vec::new(),
			full_text_columns: Vec::new(),
			relations: Vec::new(),
			overrides: OptionsOverride::default(),
		}
	}

	pub fn from_config(name: &str, cfg: &SchemaConfig) -> Result<Self> {
		let mut relations = Vec::with_capacity(cfg.relations.len());

		for relation in &cfg.relations {
			relations.push(RelationDef {
				name: relation.name.clone(),
				target: relation.target.clone(),
				kind: RelationKind::parse(&relation.kind)?,
				parent_column: relation.parent_column.clone(),
				related_column: relation.related_column.clone(),
				columns: relation.columns.clone(),
			});
		}

		Ok(Self {
			name: name.to_string(),
			table: cfg.table.clone(),
			primary_key: cfg.primary_key.clone(),
			columns: cfg.columns.clone(),
			full_text_columns: cfg.full_text_columns.clone(),
			relations,
			overrides: OptionsOverride::default(),
		})
	}

	pub fn primary_key(mut self, primary_key: impl Into<String>) -> Self {
		self.primary_key = primary_key.into();

		self
	}

	pub fn columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();

		self
	}

	pub fn full_text_columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.full_text_columns = columns.into_iter().map(Into::into).collect();

		self
	}

	pub fn relation(mut self, relation: RelationDef) -> Self {
		self.relations.push(relation);

		self
	}

	pub fn overrides(mut self, overrides: OptionsOverride) -> Self {
		self.overrides = overrides;

		self
	}

	/// Declared columns, else the catalog listing, else nothing.
	pub fn available_columns(&self, catalog: &dyn Catalog) -> Vec<String> {
		if !self.columns.is_empty() {
			return self.columns.clone();
		}

		catalog.columns(&self.table).unwrap_or_default()
	}
}

/// A record type that can be searched.
pub trait Searchable {
	fn search_schema() -> RecordSchema;
}

/// Column listings for tables.
pub trait Catalog {
	fn columns(&self, table: &str) -> Option<Vec<String>>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
	tables: HashMap<String, Vec<String>>,
}
impl StaticCatalog {
	pub fn insert<I, S>(&mut self, table: impl Into<String>, columns: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tables.insert(table.into(), columns.into_iter().map(Into::into).collect());
	}

	pub fn with_table<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.insert(table, columns);

		self
	}

	pub fn len(&self) -> usize {
		self.tables.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}
}
impl Catalog for StaticCatalog {
	fn columns(&self, table: &str) -> Option<Vec<String>> {
		self.tables.get(table).cloned()
	}
}

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
	records: HashMap<String, RecordSchema>,
}
impl SchemaRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a registry from `[schemas.*]` tables.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let mut registry = Self::new();

		for (name, schema) in &cfg.schemas {
			registry.insert(RecordSchema::from_config(name, schema)?);
		}

		Ok(registry)
	}

	pub fn register<T: Searchable>(&mut self) -> &mut Self {
		self.insert(T::search_schema())
	}

	pub fn insert(&mut self, schema: RecordSchema) -> &mut Self {
		self.records.insert(schema.name.clone(), schema);

		self
	}

	pub fn get(&self, name: &str) -> Option<&RecordSchema> {
		self.records.get(name)
	}

	pub fn require(&self, name: &str) -> Result<&RecordSchema> {
		self.get(name).ok_or_else(|| Error::UnknownRecord { name: name.to_string() })
	}

	/// Tables of every registered record, sorted and deduplicated.
	pub fn tables(&self) -> Vec<String> {
		let mut tables: Vec<String> =
			self.records.values().map(|schema| schema.table.clone()).collect();

		tables.sort();
		tables.dedup();

		tables
	}
}
