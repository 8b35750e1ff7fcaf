//! Renders a [`Condition`] tree into parameterized SQL.
//!
//! The outer table is aliased `t0`. Every relation hop opens an `EXISTS` subquery with the next
//! free alias, so nested relations never shadow each other. All parameters are bound as text.

use sift_domain::{Comparison, Condition, FullTextMatch, RelatedCondition, SearchMode, SelectQuery};

use crate::Dialect;

const ROOT_ALIAS: &str = "t0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
	pub sql: String,
	pub params: Vec<String>,
	pub dialect: Dialect,
}
impl SqlQuery {
	/// Substitutes quoted literals for the placeholders.
	///
	/// For logs and `explain` output only. Never execute the result.
	pub fn inline(&self) -> String {
		let mut out = String::with_capacity(self.sql.len());
		let mut chars = self.sql.chars().peekable();
		let mut next = 0;

		while let Some(ch) = chars.next() {
			match (self.dialect, ch) {
				(Dialect::Postgres, '$') if chars.peek().is_some_and(char::is_ascii_digit) => {
					let mut digits = String::new();

					while let Some(digit) = chars.next_if(char::is_ascii_digit) {
						digits.push(digit);
					}

					let param = digits
						.parse::<usize>()
						.ok()
						.and_then(|index| index.checked_sub(1))
						.and_then(|index| self.params.get(index));

					match param {
						Some(param) => out.push_str(&quote_literal(param)),
						None => {
							out.push('$');
							out.push_str(&digits);
						},
					}
				},
				(Dialect::MySql | Dialect::Sqlite, '?') => {
					match self.params.get(next) {
						Some(param) => out.push_str(&quote_literal(param)),
						None => out.push('?'),
					}

					next += 1;
				},
				_ => out.push(ch),
			}
		}

		out
	}
}

/// `SELECT t0.* FROM table AS t0`, plus a `WHERE` clause when the query carries a filter.
pub fn render_select(query: &SelectQuery, dialect: Dialect) -> SqlQuery {
	let mut renderer = Renderer::new(dialect);
	let mut sql = format!(
		"SELECT {ROOT_ALIAS}.* FROM {} AS {ROOT_ALIAS}",
		dialect.quote_ident(&query.table)
	);

	if let Some(filter) = &query.filter {
		sql.push_str(" WHERE ");
		sql.push_str(&renderer.condition(filter, ROOT_ALIAS));
	}

	SqlQuery { sql, params: renderer.params, dialect }
}

/// The bare predicate against alias `t0`, without `WHERE`.
pub fn render_where(condition: &Condition, dialect: Dialect) -> SqlQuery {
	let mut renderer = Renderer::new(dialect);
	let sql = renderer.condition(condition, ROOT_ALIAS);

	SqlQuery { sql, params: renderer.params, dialect }
}

struct Renderer {
	dialect: Dialect,
	params: Vec<String>,
	aliases: usize,
}
impl Renderer {
	fn new(dialect: Dialect) -> Self {
		Self { dialect, params: Vec::new(), aliases: 0 }
	}

	fn bind(&mut self, value: String) -> String {
		self.params.push(value);

		self.dialect.placeholder(self.params.len())
	}

	fn next_alias(&mut self) -> String {
		self.aliases += 1;

		format!("t{}", self.aliases)
	}

	fn column(&self, alias: &str, column: &str) -> String {
		format!("{alias}.{}", self.dialect.quote_ident(column))
	}

	/// Column as text, so pattern operators apply to non-text columns too.
	fn text_column(&self, alias: &str, column: &str) -> String {
		let column = self.column(alias, column);

		match self.dialect {
			Dialect::Postgres => format!("{column}::text"),
			Dialect::MySql | Dialect::Sqlite => column,
		}
	}

	fn condition(&mut self, condition: &Condition, alias: &str) -> String {
		match condition {
			Condition::Compare(comparison) => self.comparison(comparison, alias),
			Condition::And(children) => self.group(children, " AND ", "TRUE", alias),
			Condition::Or(children) => self.group(children, " OR ", "FALSE", alias),
			Condition::Not(inner) => {
				format!("NOT COALESCE(({}), FALSE)", self.condition(inner, alias))
			},
			Condition::Related(related) => self.related(related, alias),
			Condition::FullText(full_text) => self.full_text(full_text, alias),
		}
	}

	fn group(&mut self, children: &[Condition], joiner: &str, empty: &str, alias: &str) -> String {
		match children {
			[] => empty.to_string(),
			[only] => self.condition(only, alias),
			_ => {
				let parts: Vec<String> =
					children.iter().map(|child| self.condition(child, alias)).collect();

				format!("({})", parts.join(joiner))
			},
		}
	}

	fn related(&mut self, related: &RelatedCondition, alias: &str) -> String {
		let inner_alias = self.next_alias();
		let join = format!(
			"{} = {}",
			self.column(&inner_alias, &related.related_column),
			self.column(alias, &related.parent_column)
		);
		let inner = self.condition(&related.condition, &inner_alias);

		format!(
			"EXISTS (SELECT 1 FROM {} AS {inner_alias} WHERE {join} AND {inner})",
			self.dialect.quote_ident(&related.table)
		)
	}

	fn comparison(&mut self, comparison: &Comparison, alias: &str) -> String {
		let column = self.text_column(alias, &comparison.column);

		if comparison.mode == SearchMode::Exact {
			return self.equality(&column, comparison);
		}
		if comparison.case_sensitive && self.dialect == Dialect::Sqlite {
			let pattern = wrap_pattern(&escape_glob(&comparison.term), comparison.mode, '*');
			let placeholder = self.bind(pattern);

			return format!("{column} GLOB {placeholder}");
		}

		let pattern = wrap_pattern(&escape_like(&comparison.term), comparison.mode, '%');
		let placeholder = self.bind(pattern);

		match (self.dialect, comparison.case_sensitive) {
			(Dialect::Postgres, true) => format!("{column} LIKE {placeholder} ESCAPE '\\'"),
			(Dialect::Postgres, false) => format!("{column} ILIKE {placeholder} ESCAPE '\\'"),
			// MySQL already treats backslash as the LIKE escape.
			(Dialect::MySql, true) => format!("{column} COLLATE utf8mb4_bin LIKE {placeholder}"),
			(Dialect::MySql, false) => format!("LOWER({column}) LIKE LOWER({placeholder})"),
			(Dialect::Sqlite, _) =>
				format!("LOWER({column}) LIKE LOWER({placeholder}) ESCAPE '\\'"),
		}
	}

	fn equality(&mut self, column: &str, comparison: &Comparison) -> String {
		match (self.dialect, comparison.case_sensitive) {
			(Dialect::Postgres, false) => {
				let placeholder = self.bind(escape_like(&comparison.term));

				format!("{column} ILIKE {placeholder} ESCAPE '\\'")
			},
			(Dialect::MySql, true) => {
				let placeholder = self.bind(comparison.term.clone());

				format!("{column} COLLATE utf8mb4_bin = {placeholder}")
			},
			(_, true) => {
				let placeholder = self.bind(comparison.term.clone());

				format!("{column} = {placeholder}")
			},
			(_, false) => {
				let placeholder = self.bind(comparison.term.clone());

				format!("LOWER({column}) = LOWER({placeholder})")
			},
		}
	}

	fn full_text(&mut self, full_text: &FullTextMatch, alias: &str) -> String {
		match self.dialect {
			Dialect::Postgres => {
				let column = self.text_column(alias, &full_text.column);
				let placeholder = self.bind(full_text.query.clone());

				format!(
					"to_tsvector('simple', {column}) @@ plainto_tsquery('simple', {placeholder})"
				)
			},
			Dialect::MySql => {
				let column = self.column(alias, &full_text.column);
				let placeholder = self.bind(full_text.query.clone());

				format!("MATCH ({column}) AGAINST ({placeholder} IN NATURAL LANGUAGE MODE)")
			},
			Dialect::Sqlite => {
				tracing::debug!(
					column = %full_text.column,
					"SQLite has no native full-text predicate. Rendering a substring match."
				);

				let column = self.text_column(alias, &full_text.column);
				let placeholder = self.bind(wrap_pattern(
					&escape_like(&full_text.query),
					SearchMode::Like,
					'%',
				));

				format!("LOWER({column}) LIKE LOWER({placeholder}) ESCAPE '\\'")
			},
		}
	}
}

fn escape_like(term: &str) -> String {
	let mut escaped = String::with_capacity(term.len());

	for ch in term.chars() {
		if matches!(ch, '\\' | '%' | '_') {
			escaped.push('\\');
		}

		escaped.push(ch);
	}

	escaped
}

fn escape_glob(term: &str) -> String {
	let mut escaped = String::with_capacity(term.len());

	for ch in term.chars() {
		match ch {
			'*' | '?' | '[' => {
				escaped.push('[');
				escaped.push(ch);
				escaped.push(']');
			},
			_ => escaped.push(ch),
		}
	}

	escaped
}

fn wrap_pattern(escaped: &str, mode: SearchMode, wildcard: char) -> String {
	match mode {
		SearchMode::Exact => escaped.to_string(),
		SearchMode::StartsWith => format!("{escaped}{wildcard}"),
		SearchMode::EndsWith => format!("{wildcard}{escaped}"),
		SearchMode::Like => format!("{wildcard}{escaped}{wildcard}"),
	}
}

fn quote_literal(value: &str) -> String {
	format!("'{}'", value.replace('\'', "''"))
}
