use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EXACT_PHRASE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("Exact phrase pattern must compile."));

/// Free-text search input split into its term kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
	/// Plain terms in input order.
	pub terms: Vec<String>,
	/// Quoted phrases, matched by equality.
	pub exact: Vec<String>,
	/// `-term` tokens, which must not occur in any searched column.
	pub excluded: Vec<String>,
	/// Set when an `OR` token appears between terms.
	pub use_or: bool,
}
impl ParsedQuery {
	pub fn is_empty(&self) -> bool {
		self.terms.is_empty() && self.exact.is_empty() && self.excluded.is_empty()
	}

	/// Every term of every kind, in the order plain, exact, excluded.
	pub fn all_terms(&self) -> impl Iterator<Item = &str> {
		self.terms.iter().chain(&self.exact).chain(&self.excluded).map(String::as_str)
	}
}

/// Never fails. Blank input yields an empty [`ParsedQuery`].
pub fn parse_query(raw: &str) -> ParsedQuery {
	let mut parsed = ParsedQuery::default();

	for captures in EXACT_PHRASE.captures_iter(raw) {
		let phrase = captures[1].trim();

		if !phrase.is_empty() {
			parsed.exact.push(phrase.to_string());
		}
	}

	let remainder = EXACT_PHRASE.replace_all(raw, " ");

	for token in remainder.split_whitespace() {
		if token.eq_ignore_ascii_case("or") {
			parsed.use_or = true;

			continue;
		}

		let token = token.replace('"', "");

		if let Some(excluded) = token.strip_prefix('-') {
			if !excluded.is_empty() {
				parsed.excluded.push(excluded.to_string());
			}

			continue;
		}
		if !token.is_empty() {
			parsed.terms.push(token);
		}
	}

	parsed
}
