mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Columns, Config, ModelOverrides, Performance, Postgres, RelationConfig, Relations,
	SchemaConfig, Search, SearchDefaults, Service, Storage,
};

use std::{fs, path::Path};

const MODES: [&str; 4] = ["like", "exact", "starts_with", "ends_with"];
const OPERATORS: [&str; 2] = ["and", "or"];
const RELATION_KINDS: [&str; 2] = ["belongs_to", "has_many"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	if let Some(storage) = cfg.storage.as_ref() {
		if storage.postgres.dsn.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.postgres.dsn must be non-empty.".to_string(),
			});
		}
		if storage.postgres.pool_max_conns == 0 {
			return Err(Error::Validation {
				message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
			});
		}
	}

	let defaults = &cfg.search.defaults;

	validate_mode("search.defaults.mode", &defaults.mode)?;
	validate_operator("search.defaults.search_operator", &defaults.search_operator)?;
	validate_length_bounds("search.defaults", defaults.min_length, defaults.max_length)?;

	for (record, overrides) in &cfg.models {
		if let Some(mode) = overrides.mode.as_deref() {
			validate_mode(&format!("models.{record}.mode"), mode)?;
		}
		if let Some(operator) = overrides.search_operator.as_deref() {
			validate_operator(&format!("models.{record}.search_operator"), operator)?;
		}

		validate_length_bounds(
			&format!("models.{record}"),
			overrides.min_length.or(defaults.min_length),
			overrides.max_length.or(defaults.max_length),
		)?;
	}

	for (record, schema) in &cfg.schemas {
		if schema.table.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("schemas.{record}.table must be non-empty."),
			});
		}
		if schema.primary_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("schemas.{record}.primary_key must be non-empty."),
			});
		}

		for relation in &schema.relations {
			if relation.name.trim().is_empty() || relation.target.trim().is_empty() {
				return Err(Error::Validation {
					message: format!(
						"schemas.{record}.relations entries must have a non-empty name and target."
					),
				});
			}
			if !RELATION_KINDS.contains(&relation.kind.as_str()) {
				return Err(Error::Validation {
					message: format!(
						"schemas.{record}.relations.{}.kind must be one of belongs_to or has_many.",
						relation.name
					),
				});
			}
		}
	}

	Ok(())
}

fn validate_mode(label: &str, mode: &str) -> Result<()> {
	if !MODES.contains(&mode) {
		return Err(Error::Validation {
			message: format!("{label} must be one of like, exact, starts_with, or ends_with."),
		});
	}

	Ok(())
}

fn validate_operator(label: &str, operator: &str) -> Result<()> {
	if !OPERATORS.contains(&operator) {
		return Err(Error::Validation { message: format!("{label} must be one of and or or.") });
	}

	Ok(())
}

fn validate_length_bounds(label: &str, min: Option<usize>, max: Option<usize>) -> Result<()> {
	if max == Some(0) {
		return Err(Error::Validation {
			message: format!("{label}.max_length must be greater than zero."),
		});
	}
	if let (Some(min), Some(max)) = (min, max) {
		if min > max {
			return Err(Error::Validation {
				message: format!("{label}.min_length must not exceed {label}.max_length."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.as_ref().map(|storage| storage.postgres.dsn.trim().is_empty()).unwrap_or(false)
	{
		cfg.storage = None;
	}

	cfg.search.defaults.mode = normalize_mode(&cfg.search.defaults.mode);
	cfg.search.defaults.search_operator =
		cfg.search.defaults.search_operator.trim().to_ascii_lowercase();

	for overrides in cfg.models.values_mut() {
		if let Some(mode) = overrides.mode.as_mut() {
			*mode = normalize_mode(mode);
		}
		if let Some(operator) = overrides.search_operator.as_mut() {
			*operator = operator.trim().to_ascii_lowercase();
		}
	}

	normalize_names(&mut cfg.columns.excluded, true);
	normalize_names(&mut cfg.columns.sensitive_suffixes, true);
	normalize_names(&mut cfg.columns.prioritized, false);
	normalize_names(&mut cfg.relations.excluded, false);

	for schema in cfg.schemas.values_mut() {
		for relation in &mut schema.relations {
			relation.kind = relation.kind.trim().to_ascii_lowercase();
		}
	}
}

/// `contains` and `substring` are spellings of `like`.
fn normalize_mode(mode: &str) -> String {
	match mode.trim().to_ascii_lowercase().as_str() {
		"contains" | "substring" => "like".to_string(),
		other => other.to_string(),
	}
}

fn normalize_names(names: &mut Vec<String>, lowercase: bool) {
	for name in names.iter_mut() {
		*name = if lowercase { name.trim().to_ascii_lowercase() } else { name.trim().to_string() };
	}

	names.retain(|name| !name.is_empty());
}
