pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Upstream returned HTTP {status}: {message}")]
	Upstream { status: u16, message: String },
	#[error(transparent)]
	Transport(#[from] reqwest::Error),
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
}
impl Error {
	/// HTTP 400 is included: the places backend returns it intermittently for valid requests.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Upstream { status, .. } => matches!(*status, 400 | 408 | 429 | 500..=599),
			Self::Transport(err) => err.is_timeout() || err.is_connect(),
			Self::InvalidResponse { .. } | Self::InvalidConfig { .. } => false,
		}
	}
}
