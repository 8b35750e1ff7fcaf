use unicode_segmentation::UnicodeSegmentation;

use sift_domain::{
	Condition, ConditionGroup, Joiner, OptionsOverride, ParsedQuery, RecordSchema, SearchMode,
	SearchOptions, SelectQuery, parse_query, select_columns, walk_relations,
};

use crate::{Error, Result, SiftService};

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
	pub search: Option<String>,
	/// Explicit columns for the searched record. Used verbatim.
	pub columns: Option<Vec<String>>,
	pub options: OptionsOverride,
}
impl SearchRequest {
	pub fn new(search: impl Into<String>) -> Self {
		Self { search: Some(search.into()), ..Default::default() }
	}

	pub fn columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = Some(columns.into_iter().map(Into::into).collect());

		self
	}

	pub fn options(mut self, options: OptionsOverride) -> Self {
		self.options = options;

		self
	}

	fn with_operator(&self, joiner: Joiner) -> Self {
		let mut request = self.clone();

		request.options.search_operator = Some(joiner);

		request
	}
}

/// State of one term while its relation tree is composed.
struct TermScope<'a> {
	term: &'a str,
	mode: SearchMode,
	options: &'a SearchOptions,
	/// Relation traversals still allowed for this term. `None` is unbounded.
	joins_left: Option<usize>,
}

impl SiftService {
	/// Attaches the composed predicate to `query`. Disabled search and blank input leave the query
	/// unchanged.
	pub fn apply(&self, query: SelectQuery, request: &SearchRequest) -> Result<SelectQuery> {
		match self.compose(&query.record, request)? {
			Some(condition) => Ok(query.with_filter(condition)),
			None => Ok(query),
		}
	}

	pub fn apply_and(&self, query: SelectQuery, request: &SearchRequest) -> Result<SelectQuery> {
		self.apply(query, &request.with_operator(Joiner::And))
	}

	pub fn apply_or(&self, query: SelectQuery, request: &SearchRequest) -> Result<SelectQuery> {
		self.apply(query, &request.with_operator(Joiner::Or))
	}

	/// The predicate alone. `None` means every record matches.
	pub fn compose(&self, record: &str, request: &SearchRequest) -> Result<Option<Condition>> {
		if !self.cfg.search.enabled {
			tracing::debug!(record, "Search is disabled. Query left unchanged.");

			return Ok(None);
		}

		let schema = self.registry.require(record)?;
		let parsed = match request.search.as_deref().map(str::trim) {
			Some(raw) if !raw.is_empty() => parse_query(raw),
			_ => return Ok(None),
		};

		if parsed.is_empty() {
			return Ok(None);
		}

		let options = self.effective_options(schema, request)?;

		validate_lengths(&parsed, &options)?;

		let full_text = self.full_text_enabled(record, &options);
		let columns = request.columns.as_deref();
		let depth = options.relation_depth(self.cfg.relations.max_depth);
		let mut groups = Vec::new();

		for phrase in &parsed.exact {
			let mut scope = self.scope(phrase, SearchMode::Exact, &options);

			groups.extend(self.term_condition(schema, columns, &mut scope, false, depth));
		}
		for term in &parsed.terms {
			let mut scope = self.scope(term, options.mode, &options);

			groups.extend(self.term_condition(schema, columns, &mut scope, full_text, depth));
		}

		let joiner = if parsed.use_or { Joiner::Or } else { Joiner::And };
		let positive = Condition::join(joiner, groups);
		let exclusions = parsed
			.excluded
			.iter()
			.filter_map(|term| self.exclusion(schema, columns, term, &options));
		let condition = Condition::and_all(positive.into_iter().chain(exclusions));

		tracing::info!(
			record,
			terms = parsed.terms.len(),
			exact = parsed.exact.len(),
			excluded = parsed.excluded.len(),
			use_or = parsed.use_or,
			depth,
			full_text,
			"Composed search predicate."
		);

		Ok(condition)
	}

	fn full_text_enabled(&self, record: &str, options: &SearchOptions) -> bool {
		if !options.full_text {
			return false;
		}
		if !self.capabilities.full_text {
			tracing::debug!(
				record,
				"Full-text search is unsupported by the store. Falling back to substring matching."
			);

			return false;
		}

		true
	}

	fn scope<'a>(
		&self,
		term: &'a str,
		mode: SearchMode,
		options: &'a SearchOptions,
	) -> TermScope<'a> {
		let max_join_tables = self.cfg.performance.max_join_tables;
		let joins_left = if max_join_tables == 0 { None } else { Some(max_join_tables) };

		TermScope { term, mode, options, joins_left }
	}

	fn selected_columns(&self, schema: &RecordSchema, explicit: Option<&[String]>) -> Vec<String> {
		let available = schema.available_columns(self.catalog.as_ref());

		select_columns(explicit, &available, &self.column_rules)
	}

	/// One term against `schema`'s columns plus its relations, joined with the search operator.
	fn term_condition(
		&self,
		schema: &RecordSchema,
		explicit: Option<&[String]>,
		scope: &mut TermScope<'_>,
		full_text: bool,
		depth: u32,
	) -> Option<Condition> {
		let columns = self.selected_columns(schema, explicit);
		let mut group = ConditionGroup::new(scope.options.search_operator);

		if full_text {
			let eligible = if schema.full_text_columns.is_empty() {
				&columns
			} else {
				&schema.full_text_columns
			};

			for column in eligible {
				group.push(Condition::full_text(column.as_str(), scope.term));
			}
		} else {
			for column in &columns {
				group.add_term(column, scope.term, scope.mode, scope.options.case_sensitive);
			}
		}

		let related = walk_relations(
			schema,
			&self.registry,
			self.catalog.as_ref(),
			&self.relation_rules,
			depth,
			|relation, remaining| {
				if let Some(left) = scope.joins_left.as_mut() {
					if *left == 0 {
						tracing::debug!(
							relation = %relation.name,
							"Join table limit reached. Relation skipped."
						);

						return None;
					}

					*left -= 1;
				}

				self.term_condition(
					relation.target,
					relation.columns.as_deref(),
					scope,
					false,
					remaining,
				)
			},
		);

		for condition in related {
			group.push(condition);
		}

		if group.is_empty() {
			tracing::debug!(
				record = %schema.name,
				term = scope.term,
				"No searchable columns for term."
			);
		}

		group.finish()
	}

	/// `Not(Or(contains))` over the local columns. NULL values count as "does not contain".
	fn exclusion(
		&self,
		schema: &RecordSchema,
		explicit: Option<&[String]>,
		term: &str,
		options: &SearchOptions,
	) -> Option<Condition> {
		let mut group = ConditionGroup::new(Joiner::Or);

		for column in self.selected_columns(schema, explicit) {
			group.add_term(&column, term, SearchMode::Like, options.case_sensitive);
		}

		group.finish().map(Condition::negate)
	}
}

/// Lengths are counted in graphemes on the trimmed terms.
fn validate_lengths(parsed: &ParsedQuery, options: &SearchOptions) -> Result<()> {
	for term in parsed.all_terms() {
		let length = term.graphemes(true).count();

		if let Some(min) = options.min_length {
			if length < min {
				return Err(Error::InvalidInput {
					message: format!("Search term '{term}' must be at least {min} characters."),
				});
			}
		}
		if let Some(max) = options.max_length {
			if length > max {
				return Err(Error::InvalidInput {
					message: format!("Search term '{term}' must not exceed {max} characters."),
				});
			}
		}
	}

	Ok(())
}
