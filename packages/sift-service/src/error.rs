pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid input: {message}")]
	InvalidInput { message: String },
	#[error("Invalid options: {message}")]
	InvalidOptions { message: String },
	#[error("Misconfiguration: {message}")]
	Misconfiguration { message: String },
}
impl From<sift_domain::Error> for Error {
	fn from(err: sift_domain::Error) -> Self {
		match err {
			sift_domain::Error::InvalidOption { .. } =>
				Self::InvalidOptions { message: err.to_string() },
			sift_domain::Error::UnknownRecord { .. } =>
				Self::Misconfiguration { message: err.to_string() },
		}
	}
}
