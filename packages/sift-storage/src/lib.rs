pub mod catalog;
pub mod db;
pub mod dialect;
pub mod render;

mod error;

pub use dialect::Dialect;
pub use error::Error;
pub use render::{SqlQuery, render_select, render_where};

pub type Result<T, E = Error> = std::result::Result<T, E>;
