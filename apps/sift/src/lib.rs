use std::{
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use sift_config::Config;
use sift_domain::{
	Condition, Joiner, OptionsOverride, Record, SchemaRegistry, SearchMode, SelectQuery,
	StaticCatalog,
};
use sift_service::{SearchRequest, SiftService};
use sift_storage::{Dialect, catalog, db::Db, render_select};

#[derive(Debug, Parser)]
#[command(
	version = sift_cli::VERSION,
	rename_all = "kebab",
	styles = sift_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Print the composed condition tree and the SQL it renders to.
	Explain(ExplainArgs),
	/// Run the search against Postgres and print matching rows.
	Search(SearchFlags),
}

#[derive(Debug, clap::Args)]
pub struct ExplainArgs {
	#[command(flatten)]
	pub search: SearchFlags,
	#[arg(long, value_name = "DIALECT", default_value = "postgres")]
	pub dialect: Dialect,
	/// JSON array of records to filter with the composed condition.
	#[arg(long, value_name = "FILE")]
	pub records: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct SearchFlags {
	#[arg(long, short = 'r', value_name = "NAME")]
	pub record: String,
	#[arg(long, value_name = "COLUMNS", value_delimiter = ',')]
	pub columns: Option<Vec<String>>,
	#[arg(long, value_name = "MODE")]
	pub mode: Option<SearchMode>,
	#[arg(long, value_name = "OPERATOR")]
	pub operator: Option<Joiner>,
	#[arg(long)]
	pub case_sensitive: bool,
	#[arg(long)]
	pub full_text: bool,
	/// Skip relation search.
	#[arg(long)]
	pub shallow: bool,
	#[arg(long, value_name = "N")]
	pub max_depth: Option<u32>,
	#[arg(long, value_name = "N")]
	pub min_length: Option<usize>,
	#[arg(long, value_name = "N")]
	pub max_length: Option<usize>,
	#[arg(value_name = "QUERY", trailing_var_arg = true, allow_hyphen_values = true)]
	pub query: Vec<String>,
}
impl SearchFlags {
	/// Unset flags defer to the config.
	pub fn request(&self) -> SearchRequest {
		SearchRequest {
			search: Some(self.query.join(" ")),
			columns: self.columns.clone(),
			options: OptionsOverride {
				mode: self.mode,
				deep: self.shallow.then_some(false),
				max_relation_depth: self.max_depth,
				search_operator: self.operator,
				case_sensitive: self.case_sensitive.then_some(true),
				full_text: self.full_text.then_some(true),
				min_length: self.min_length,
				max_length: self.max_length,
			},
		}
	}
}

#[derive(Debug, Serialize)]
pub struct Explanation {
	pub record: String,
	pub search: String,
	pub dialect: String,
	pub condition: Option<Condition>,
	pub sql: String,
	pub params: Vec<String>,
	pub inline_sql: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub matches: Option<Vec<Value>>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = sift_config::load(&args.config)?;
	init_tracing(&config)?;
	let output = match &args.command {
		Command::Explain(explain_args) => serde_json::to_value(explain(config, explain_args)?)?,
		Command::Search(flags) => Value::Array(search(config, flags).await?),
	};
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

/// Composes and renders without touching a database. Columns come from `[schemas.*]`.
pub fn explain(config: Config, args: &ExplainArgs) -> color_eyre::Result<Explanation> {
	let registry = SchemaRegistry::from_config(&config)?;
	let service = SiftService::new(
		config,
		registry,
		Arc::new(StaticCatalog::default()),
		args.dialect.capabilities(),
	);
	let request = args.search.request();
	let query = service.apply(base_query(&service, &args.search.record)?, &request)?;
	let rendered = render_select(&query, args.dialect);
	let matches = match &args.records {
		Some(path) => Some(matching_records(path, query.filter.as_ref())?),
		None => None,
	};

	Ok(Explanation {
		record: query.record.clone(),
		search: request.search.unwrap_or_default(),
		dialect: args.dialect.to_string(),
		condition: query.filter,
		inline_sql: rendered.inline(),
		sql: rendered.sql,
		params: rendered.params,
		matches,
	})
}

pub async fn search(config: Config, flags: &SearchFlags) -> color_eyre::Result<Vec<Value>> {
	let Some(storage) = config.storage.clone() else {
		return Err(eyre::eyre!("search requires a [storage.postgres] section in the config."));
	};
	let db = Db::connect(&storage.postgres).await?;
	let registry = SchemaRegistry::from_config(&config)?;
	let catalog = catalog::load(&db.pool, &registry.tables()).await?;
	let service =
		SiftService::new(config, registry, Arc::new(catalog), Dialect::Postgres.capabilities());
	let query = service.apply(base_query(&service, &flags.record)?, &flags.request())?;
	let rows = db.fetch_json(&query).await?;

	tracing::info!(record = %flags.record, rows = rows.len(), "Search finished.");

	Ok(rows)
}

fn base_query(service: &SiftService, record: &str) -> color_eyre::Result<SelectQuery> {
	let schema = service.registry.require(record)?;

	Ok(SelectQuery::new(schema.name.as_str(), schema.table.as_str()))
}

fn matching_records(path: &Path, condition: Option<&Condition>) -> color_eyre::Result<Vec<Value>> {
	let raw = fs::read_to_string(path)?;
	let rows: Vec<Value> = serde_json::from_str(&raw)?;
	let mut matches = Vec::new();

	for row in rows {
		let Some(record) = Record::from_json(&row) else {
			return Err(eyre::eyre!("{} must be a JSON array of objects.", path.display()));
		};

		if condition.is_none_or(|condition| condition.matches(&record)) {
			matches.push(row);
		}
	}

	Ok(matches)
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
	Ok(())
}
