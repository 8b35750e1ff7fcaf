use serde_json::Value;
use sqlx::{PgPool, postgres::PgPoolOptions};

use sift_domain::SelectQuery;

use crate::{Dialect, Result, render};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &sift_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	/// Runs the rendered query and returns each row as a JSON object.
	pub async fn fetch_json(&self, query: &SelectQuery) -> Result<Vec<Value>> {
		let rendered = render::render_select(query, Dialect::Postgres);
		let sql = format!("SELECT row_to_json(r)::jsonb FROM ({}) AS r", rendered.sql);
		let mut statement = sqlx::query_scalar::<_, Value>(&sql);

		for param in &rendered.params {
			statement = statement.bind(param);
		}

		tracing::debug!(sql = %rendered.inline(), "Fetching search results.");

		Ok(statement.fetch_all(&self.pool).await?)
	}
}
