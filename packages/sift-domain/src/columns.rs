use sift_config::Columns;

#[derive(Debug, Clone, Default)]
pub struct ColumnRules {
	pub excluded: Vec<String>,
	pub prioritized: Vec<String>,
	pub sensitive_suffixes: Vec<String>,
	pub max_per_table: usize,
}
impl ColumnRules {
	pub fn from_config(cfg: &Columns) -> Self {
		Self {
			excluded: cfg.excluded.clone(),
			prioritized: cfg.prioritized.clone(),
			sensitive_suffixes: cfg.sensitive_suffixes.clone(),
			max_per_table: cfg.max_per_table,
		}
	}

	fn is_eligible(&self, column: &str) -> bool {
		let lowered = column.to_ascii_lowercase();

		!self.excluded.iter().any(|excluded| excluded.eq_ignore_ascii_case(&lowered))
			&& !self
				.sensitive_suffixes
				.iter()
				.any(|suffix| lowered.ends_with(&suffix.to_ascii_lowercase()))
	}

	fn priority(&self, column: &str) -> usize {
		self.prioritized
			.iter()
			.position(|name| name.eq_ignore_ascii_case(column))
			.unwrap_or(usize::MAX)
	}
}

/// A non-empty explicit list is returned verbatim. Otherwise `available` is filtered, stably
/// ordered by priority, and capped.
pub fn select_columns(
	explicit: Option<&[String]>,
	available: &[String],
	rules: &ColumnRules,
) -> Vec<String> {
	if let Some(explicit) = explicit.filter(|explicit| !explicit.is_empty()) {
		return explicit.to_vec();
	}

	let mut columns: Vec<String> =
		available.iter().filter(|column| rules.is_eligible(column)).cloned().collect();

	// `sort_by_key` is stable, so unprioritized columns keep their catalog order.
	columns.sort_by_key(|column| rules.priority(column));

	if rules.max_per_table > 0 {
		columns.truncate(rules.max_per_table);
	}

	columns
}
