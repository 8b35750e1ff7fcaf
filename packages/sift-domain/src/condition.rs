use serde::Serialize;

use crate::options::{Joiner, SearchMode};

/// Composed search predicate. Built as a plain value and only turned into storage syntax at the
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Condition {
	Compare(Comparison),
	And(Vec<Condition>),
	Or(Vec<Condition>),
	Not(Box<Condition>),
	/// At least one related record satisfies the nested condition.
	Related(RelatedCondition),
	FullText(FullTextMatch),
}
impl Condition {
	pub fn compare(
		column: impl Into<String>,
		term: impl Into<String>,
		mode: SearchMode,
		case_sensitive: bool,
	) -> Self {
		Self::Compare(Comparison {
			column: column.into(),
			mode,
			term: term.into(),
			case_sensitive,
		})
	}

	pub fn full_text(column: impl Into<String>, query: impl Into<String>) -> Self {
		Self::FullText(FullTextMatch { column: column.into(), query: query.into() })
	}

	/// `None` when there is nothing to constrain. Nested `And` children are flattened.
	pub fn and_all(conditions: impl IntoIterator<Item = Condition>) -> Option<Self> {
		let mut flat = Vec::new();

		for condition in conditions {
			match condition {
				Self::And(children) => flat.extend(children),
				other => flat.push(other),
			}
		}

		collapse(flat, Self::And)
	}

	/// `None` when there is nothing to constrain. Nested `Or` children are flattened.
	pub fn or_any(conditions: impl IntoIterator<Item = Condition>) -> Option<Self> {
		let mut flat = Vec::new();

		for condition in conditions {
			match condition {
				Self::Or(children) => flat.extend(children),
				other => flat.push(other),
			}
		}

		collapse(flat, Self::Or)
	}

	pub fn join(joiner: Joiner, conditions: impl IntoIterator<Item = Condition>) -> Option<Self> {
		match joiner {
			Joiner::And => Self::and_all(conditions),
			Joiner::Or => Self::or_any(conditions),
		}
	}

	pub fn negate(self) -> Self {
		match self {
			Self::Not(inner) => *inner,
			other => Self::Not(Box::new(other)),
		}
	}

	/// Deepest chain of nested [`Condition::Related`] nodes.
	pub fn related_depth(&self) -> u32 {
		match self {
			Self::Compare(_) | Self::FullText(_) => 0,
			Self::And(children) | Self::Or(children) =>
				children.iter().map(Self::related_depth).max().unwrap_or(0),
			Self::Not(inner) => inner.related_depth(),
			Self::Related(related) => 1 + related.condition.related_depth(),
		}
	}

	/// Visits every comparison leaf, including those under relations.
	pub fn comparisons(&self) -> Vec<&Comparison> {
		let mut out = Vec::new();

		self.collect_comparisons(&mut out);

		out
	}

	fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>) {
		match self {
			Self::Compare(comparison) => out.push(comparison),
			Self::FullText(_) => {},
			Self::And(children) | Self::Or(children) =>
				for child in children {
					child.collect_comparisons(out);
				},
			Self::Not(inner) => inner.collect_comparisons(out),
			Self::Related(related) => related.condition.collect_comparisons(out),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
	pub column: String,
	pub mode: SearchMode,
	pub term: String,
	pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedCondition {
	pub relation: String,
	pub table: String,
	/// Column on the outer record.
	pub parent_column: String,
	/// Column on the related record that must equal `parent_column`.
	pub related_column: String,
	pub condition: Box<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullTextMatch {
	pub column: String,
	pub query: String,
}

/// Accumulates sibling conditions under one joiner.
#[derive(Debug, Clone, Default)]
pub struct ConditionGroup {
	joiner: Joiner,
	children: Vec<Condition>,
}
impl ConditionGroup {
	pub fn new(joiner: Joiner) -> Self {
		Self { joiner, children: Vec::new() }
	}

	pub fn joiner(&self) -> Joiner {
		self.joiner
	}

	/// Appends one `column`/`term` comparison leaf.
	pub fn add_term(
		&mut self,
		column: &str,
		term: &str,
		mode: SearchMode,
		case_sensitive: bool,
	) -> &mut Self {
		self.children.push(Condition::compare(column, term, mode, case_sensitive));

		self
	}

	pub fn push(&mut self, condition: Condition) -> &mut Self {
		self.children.push(condition);

		self
	}

	pub fn len(&self) -> usize {
		self.children.len()
	}

	pub fn is_empty(&self) -> bool {
		self.children.is_empty()
	}

	/// `None` for an empty group; a lone child is returned unwrapped.
	pub fn finish(self) -> Option<Condition> {
		Condition::join(self.joiner, self.children)
	}
}

/// Query object a search is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectQuery {
	pub record: String,
	pub table: String,
	pub filter: Option<Condition>,
}
impl SelectQuery {
	pub fn new(record: impl Into<String>, table: impl Into<String>) -> Self {
		Self { record: record.into(), table: table.into(), filter: None }
	}

	/// ANDs `condition` into any filter already present.
	pub fn with_filter(mut self, condition: Condition) -> Self {
		self.filter = match self.filter.take() {
			Some(existing) => Condition::and_all([existing, condition]),
			None => Some(condition),
		};

		self
	}
}

fn collapse(
	mut children: Vec<Condition>,
	wrap: fn(Vec<Condition>) -> Condition,
) -> Option<Condition> {
	match children.len() {
		0 => None,
		1 => children.pop(),
		_ => Some(wrap(children)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn leaf(term: &str) -> Condition {
		Condition::compare("name", term, SearchMode::Like, false)
	}

	#[test]
	fn empty_group_finishes_to_none() {
		assert_eq!(ConditionGroup::new(Joiner::And).finish(), None);
	}

	#[test]
	fn single_child_is_unwrapped() {
		let mut group = ConditionGroup::new(Joiner::Or);

		group.push(leaf("a"));

		assert_eq!(group.finish(), Some(leaf("a")));
	}

	#[test]
	fn nested_same_joiner_is_flattened() {
		let inner = Condition::Or(vec![leaf("a"), leaf("b")]);
		let joined = Condition::or_any([inner, leaf("c")]);

		assert_eq!(joined, Some(Condition::Or(vec![leaf("a"), leaf("b"), leaf("c")])));
	}

	#[test]
	fn double_negation_cancels() {
		assert_eq!(leaf("a").negate().negate(), leaf("a"));
	}

	#[test]
	fn serializes_with_op_tags() {
		let value = serde_json::to_value(Condition::And(vec![leaf("a")])).expect("serializable");

		assert_eq!(value["op"], "and");
		assert_eq!(value["args"][0]["op"], "compare");
		assert_eq!(value["args"][0]["args"]["mode"], "like");
	}
}
