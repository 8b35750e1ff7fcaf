use std::{fmt, str::FromStr};

use sift_domain::Capabilities;

use crate::Error;

/// SQL flavor a predicate is rendered for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
	#[default]
	Postgres,
	MySql,
	Sqlite,
}
impl Dialect {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Postgres => "postgres",
			Self::MySql => "mysql",
			Self::Sqlite => "sqlite",
		}
	}

	/// Bind marker for the 1-based parameter `index`.
	pub fn placeholder(&self, index: usize) -> String {
		match self {
			Self::Postgres => format!("${index}"),
			Self::MySql | Self::Sqlite => "?".to_string(),
		}
	}

	/// Quotes an identifier. Dotted names are quoted per segment.
	pub fn quote_ident(&self, ident: &str) -> String {
		let (open, close) = match self {
			Self::Postgres | Self::Sqlite => ('"', '"'),
			Self::MySql => ('`', '`'),
		};
		let escaped_close = format!("{close}{close}");

		ident
			.split('.')
			.map(|segment| {
				format!("{open}{}{close}", segment.replace(close, &escaped_close))
			})
			.collect::<Vec<_>>()
			.join(".")
	}

	pub fn supports_full_text(&self) -> bool {
		matches!(self, Self::Postgres | Self::MySql)
	}

	pub fn capabilities(&self) -> Capabilities {
		Capabilities { full_text: self.supports_full_text() }
	}
}
impl FromStr for Dialect {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
			"mysql" | "mariadb" => Ok(Self::MySql),
			"sqlite" => Ok(Self::Sqlite),
			other => Err(Error::InvalidArgument(format!(
				"Unknown dialect '{other}'. Expected postgres, mysql, or sqlite."
			))),
		}
	}
}
impl fmt::Display for Dialect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn quotes_identifiers_per_dialect() {
		assert_eq!(Dialect::Postgres.quote_ident("public.products"), r#""public"."products""#);
		assert_eq!(Dialect::MySql.quote_ident("na`me"), "`na``me`");
		assert_eq!(Dialect::Sqlite.quote_ident(r#"a"b"#), r#""a""b""#);
	}

	#[test]
	fn placeholders_follow_dialect() {
		assert_eq!(Dialect::Postgres.placeholder(3), "$3");
		assert_eq!(Dialect::MySql.placeholder(3), "?");
	}

	#[test]
	fn parses_aliases() {
		assert_eq!("PostgreSQL".parse::<Dialect>().ok(), Some(Dialect::Postgres));
		assert_eq!("mariadb".parse::<Dialect>().ok(), Some(Dialect::MySql));
		assert!("oracle".parse::<Dialect>().is_err());
		assert!(!Dialect::Sqlite.capabilities().full_text);
	}
}
