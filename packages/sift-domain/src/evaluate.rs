//! In-memory evaluation of a [`Condition`] against plain records.
//!
//! Mirrors the semantics the SQL renderer produces: a missing or NULL value never satisfies a
//! positive comparison, and negation treats an unsatisfied comparison as satisfied.

use std::collections::HashMap;

use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
	condition::{Comparison, Condition, FullTextMatch},
	options::SearchMode,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
	pub values: HashMap<String, Option<String>>,
	/// Related records keyed by relation name.
	pub related: HashMap<String, Vec<Record>>,
}
impl Record {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
		self.values.insert(column.into(), Some(value.into()));

		self
	}

	pub fn with_null(mut self, column: impl Into<String>) -> Self {
		self.values.insert(column.into(), None);

		self
	}

	pub fn with_related(mut self, relation: impl Into<String>, records: Vec<Record>) -> Self {
		self.related.insert(relation.into(), records);

		self
	}

	pub fn value(&self, column: &str) -> Option<&str> {
		self.values.get(column).and_then(Option::as_deref)
	}

	/// Lowercased, trimmed values of `columns` joined by spaces. Missing, NULL, and blank values
	/// are skipped.
	pub fn search_index(&self, columns: &[String]) -> String {
		let parts: Vec<String> = columns
			.iter()
			.filter_map(|column| self.value(column))
			.map(|value| value.trim().to_lowercase())
			.filter(|value| !value.is_empty())
			.collect();

		parts.join(" ")
	}

	/// Reads a JSON object. Scalars become column values; nested objects and arrays of objects
	/// become related records under their key.
	pub fn from_json(raw: &Value) -> Option<Self> {
		let object = raw.as_object()?;
		let mut record = Self::new();

		for (key, value) in object {
			match value {
				Value::Null => {
					record.values.insert(key.clone(), None);
				},
				Value::String(text) => {
					record.values.insert(key.clone(), Some(text.clone()));
				},
				Value::Number(number) => {
					record.values.insert(key.clone(), Some(number.to_string()));
				},
				Value::Bool(flag) => {
					record.values.insert(key.clone(), Some(flag.to_string()));
				},
				Value::Object(_) =>
					if let Some(related) = Self::from_json(value) {
						record.related.insert(key.clone(), vec![related]);
					},
				Value::Array(items) => {
					let related = items.iter().filter_map(Self::from_json).collect();

					record.related.insert(key.clone(), related);
				},
			}
		}

		Some(record)
	}
}

impl Condition {
	pub fn matches(&self, record: &Record) -> bool {
		match self {
			Self::Compare(comparison) => comparison.matches(record),
			Self::And(children) => children.iter().all(|child| child.matches(record)),
			Self::Or(children) => children.iter().any(|child| child.matches(record)),
			Self::Not(inner) => !inner.matches(record),
			Self::Related(related) => record
				.related
				.get(&related.relation)
				.map(|records| records.iter().any(|other| related.condition.matches(other)))
				.unwrap_or(false),
			Self::FullText(full_text) => full_text.matches(record),
		}
	}
}

impl Comparison {
	pub fn matches(&self, record: &Record) -> bool {
		let Some(value) = record.value(&self.column) else {
			return false;
		};
		let (value, term) = if self.case_sensitive {
			(value.to_string(), self.term.clone())
		} else {
			(value.to_lowercase(), self.term.to_lowercase())
		};

		match self.mode {
			SearchMode::Exact => value == term,
			SearchMode::StartsWith => value.starts_with(&term),
			SearchMode::EndsWith => value.ends_with(&term),
			SearchMode::Like => value.contains(&term),
		}
	}
}

impl FullTextMatch {
	/// Every word of the query must appear as a word of the column.
	pub fn matches(&self, record: &Record) -> bool {
		let Some(value) = record.value(&self.column) else {
			return false;
		};
		let words: Vec<String> = value.unicode_words().map(str::to_lowercase).collect();
		let mut query_words = self.query.unicode_words().map(str::to_lowercase).peekable();

		query_words.peek().is_some() && query_words.all(|word| words.contains(&word))
	}
}

/// `None` keeps every record.
pub fn filter_records<'a>(condition: Option<&Condition>, records: &'a [Record]) -> Vec<&'a Record> {
	match condition {
		Some(condition) => records.iter().filter(|record| condition.matches(record)).collect(),
		None => records.iter().collect(),
	}
}
