use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use sift_config::{ModelOverrides, SearchDefaults};

use crate::{Error, Result};

/// How a single term is compared against a column value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
	/// Substring match.
	#[default]
	Like,
	Exact,
	StartsWith,
	EndsWith,
}
impl SearchMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Like => "like",
			Self::Exact => "exact",
			Self::StartsWith => "starts_with",
			Self::EndsWith => "ends_with",
		}
	}
}
impl FromStr for SearchMode {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"like" | "contains" | "substring" => Ok(Self::Like),
			"exact" => Ok(Self::Exact),
			"starts_with" => Ok(Self::StartsWith),
			"ends_with" => Ok(Self::EndsWith),
			other => Err(Error::InvalidOption {
				field: "mode".to_string(),
				message: format!(
					"'{other}' is not one of like, exact, starts_with, or ends_with."
				),
			}),
		}
	}
}
impl fmt::Display for SearchMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Boolean connective for sibling conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joiner {
	And,
	#[default]
	Or,
}
impl Joiner {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::And => "and",
			Self::Or => "or",
		}
	}
}
impl FromStr for Joiner {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"and" => Ok(Self::And),
			"or" => Ok(Self::Or),
			other => Err(Error::InvalidOption {
				field: "search_operator".to_string(),
				message: format!("'{other}' is not one of and or or."),
			}),
		}
	}
}

/// What the underlying store can evaluate natively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
	pub full_text: bool,
}

/// Effective options for one search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
	pub mode: SearchMode,
	pub deep: bool,
	pub max_relation_depth: u32,
	pub search_operator: Joiner,
	pub case_sensitive: bool,
	pub full_text: bool,
	pub min_length: Option<usize>,
	pub max_length: Option<usize>,
}
impl SearchOptions {
	pub fn from_defaults(defaults: &SearchDefaults) -> Result<Self> {
		Ok(Self {
			mode: defaults.mode.parse()?,
			deep: defaults.deep,
			max_relation_depth: defaults.max_relation_depth,
			search_operator: defaults.search_operator.parse()?,
			case_sensitive: defaults.case_sensitive,
			full_text: defaults.full_text,
			min_length: defaults.min_length,
			max_length: defaults.max_length,
		})
	}

	/// Fields set on `overrides` win.
	pub fn merged(self, overrides: &OptionsOverride) -> Self {
		Self {
			mode: overrides.mode.unwrap_or(self.mode),
			deep: overrides.deep.unwrap_or(self.deep),
			max_relation_depth: overrides.max_relation_depth.unwrap_or(self.max_relation_depth),
			search_operator: overrides.search_operator.unwrap_or(self.search_operator),
			case_sensitive: overrides.case_sensitive.unwrap_or(self.case_sensitive),
			full_text: overrides.full_text.unwrap_or(self.full_text),
			min_length: overrides.min_length.or(self.min_length),
			max_length: overrides.max_length.or(self.max_length),
		}
	}

	/// Relation hops allowed for this call, zero when deep search is off.
	pub fn relation_depth(&self, ceiling: u32) -> u32 {
		if self.deep { self.max_relation_depth.min(ceiling) } else { 0 }
	}
}
impl Default for SearchOptions {
	fn default() -> Self {
		Self {
			mode: SearchMode::Like,
			deep: true,
			max_relation_depth: 2,
			search_operator: Joiner::Or,
			case_sensitive: false,
			full_text: false,
			min_length: None,
			max_length: None,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsOverride {
	pub mode: Option<SearchMode>,
	pub deep: Option<bool>,
	pub max_relation_depth: Option<u32>,
	pub search_operator: Option<Joiner>,
	pub case_sensitive: Option<bool>,
	pub full_text: Option<bool>,
	pub min_length: Option<usize>,
	pub max_length: Option<usize>,
}
impl OptionsOverride {
	pub fn mode(mut self, mode: SearchMode) -> Self {
		self.mode = Some(mode);

		self
	}

	pub fn deep(mut self, deep: bool) -> Self {
		self.deep = Some(deep);

		self
	}

	pub fn max_relation_depth(mut self, depth: u32) -> Self {
		self.max_relation_depth = Some(depth);

		self
	}

	pub fn search_operator(mut self, joiner: Joiner) -> Self {
		self.search_operator = Some(joiner);

		self
	}

	pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
		self.case_sensitive = Some(case_sensitive);

		self
	}

	pub fn full_text(mut self, full_text: bool) -> Self {
		self.full_text = Some(full_text);

		self
	}

	pub fn min_length(mut self, min: usize) -> Self {
		self.min_length = Some(min);

		self
	}

	pub fn max_length(mut self, max: usize) -> Self {
		self.max_length = Some(max);

		self
	}
}
impl TryFrom<&ModelOverrides> for OptionsOverride {
	type Error = Error;

	fn try_from(raw: &ModelOverrides) -> Result<Self> {
		Ok(Self {
			mode: raw.mode.as_deref().map(str::parse::<SearchMode>).transpose()?,
			deep: raw.deep,
			max_relation_depth: raw.max_relation_depth,
			search_operator: raw.search_operator.as_deref().map(str::parse::<Joiner>).transpose()?,
			case_sensitive: raw.case_sensitive,
			full_text: raw.full_text,
			min_length: raw.min_length,
			max_length: raw.max_length,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn call_site_override_wins() {
		let model = OptionsOverride::default().mode(SearchMode::StartsWith).deep(false);
		let call = OptionsOverride::default().mode(SearchMode::Exact);
		let options = SearchOptions::default().merged(&model).merged(&call);

		assert_eq!(options.mode, SearchMode::Exact);
		assert!(!options.deep);
		assert_eq!(options.search_operator, Joiner::Or);
	}

	#[test]
	fn relation_depth_respects_ceiling_and_deep_flag() {
		let options = SearchOptions { max_relation_depth: 4, ..Default::default() };

		assert_eq!(options.relation_depth(2), 2);
		assert_eq!(SearchOptions { deep: false, ..options }.relation_depth(2), 0);
	}

	#[test]
	fn mode_aliases_parse() {
		assert_eq!("contains".parse::<SearchMode>().ok(), Some(SearchMode::Like));
		assert_eq!(" Starts_With ".parse::<SearchMode>().ok(), Some(SearchMode::StartsWith));
		assert!("fuzzy".parse::<SearchMode>().is_err());
	}
}
