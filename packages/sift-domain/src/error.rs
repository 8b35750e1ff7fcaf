pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid option {field}: {message}")]
	InvalidOption { field: String, message: String },
	#[error("Record [{name}] is not registered as searchable.")]
	UnknownRecord { name: String },
}
