pub mod columns;
pub mod condition;
pub mod evaluate;
pub mod options;
pub mod query;
pub mod relations;
pub mod schema;

mod error;

pub use columns::{ColumnRules, select_columns};
pub use condition::{
	Comparison, Condition, ConditionGroup, FullTextMatch, RelatedCondition, SelectQuery,
};
pub use error::{Error, Result};
pub use evaluate::{Record, filter_records};
pub use options::{Capabilities, Joiner, OptionsOverride, SearchMode, SearchOptions};
pub use query::{ParsedQuery, parse_query};
pub use relations::{RelationRules, ResolvedRelation, searchable_relations, walk_relations};
pub use schema::{
	Catalog, RecordSchema, RelationDef, RelationKind, SchemaRegistry, Searchable, StaticCatalog,
};
