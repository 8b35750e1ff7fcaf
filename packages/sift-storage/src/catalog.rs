use sqlx::PgPool;

use sift_domain::StaticCatalog;

use crate::Result;

/// Column listings for `tables` in ordinal order, read from `information_schema.columns` on the
/// current search path. Tables that do not exist are left out of the catalog.
pub async fn load(pool: &PgPool, tables: &[String]) -> Result<StaticCatalog> {
	let rows: Vec<(String, String)> = sqlx::query_as(
		"\
SELECT table_name::text, column_name::text
FROM information_schema.columns
WHERE table_schema = ANY(current_schemas(false))
	AND table_name = ANY($1)
ORDER BY table_name, ordinal_position",
	)
	.bind(tables)
	.fetch_all(pool)
	.await?;
	let mut catalog = StaticCatalog::default();
	let mut current: Option<(String, Vec<String>)> = None;

	for (table, column) in rows {
		if let Some((name, columns)) = current.as_mut() {
			if *name == table {
				columns.push(column);

				continue;
			}
		}
		if let Some((name, columns)) = current.replace((table, vec![column])) {
			catalog.insert(name, columns);
		}
	}

	if let Some((name, columns)) = current {
		catalog.insert(name, columns);
	}

	tracing::debug!(requested = tables.len(), found = catalog.len(), "Loaded column catalog.");

	Ok(catalog)
}
