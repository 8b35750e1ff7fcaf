pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read sift config {}: {source}", path.display())]
	ReadConfig { path: std::path::PathBuf, source: std::io::Error },
	#[error("Invalid TOML in sift config {}: {source}", path.display())]
	ParseConfig { path: std::path::PathBuf, source: toml::de::Error },
	#[error("{message}")]
	Validation { message: String },
}
