//! Crate-level error types shared across the handshake, stores, and collaborators.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Keypair generation failed (entropy exhaustion, worker unavailable).
	#[error("Keypair generation failed: {reason}.")]
	KeyGenerationFailed {
		/// Human-readable description of the generation failure.
		reason: String,
	},
	/// The user closed the authorization popup before the exchange finished.
	#[error("Authorization popup was closed by the user.")]
	PopupClosedByUser,
	/// The browser refused to open the authorization popup.
	#[error("Authorization popup was blocked by the browser.")]
	PopupBlocked,
	/// The popup message channel failed for a reason other than close/block.
	#[error("Popup channel failed: {reason}.")]
	ChannelError {
		/// Channel-supplied description of the failure.
		reason: String,
	},
	/// The returned payload could not be decoded, decrypted, or parsed.
	#[error("Returned payload is invalid: {reason}.")]
	InvalidPayload {
		/// Description of the decode, decrypt, or parse failure.
		reason: String,
	},
	/// The payload nonce does not match the outstanding handshake (replay suspicion).
	#[error("Returned payload nonce does not match the outstanding handshake.")]
	NonceMismatch,
	/// The remote service speaks a user API version this client does not implement.
	#[error("Remote service speaks user API version {received}, this client expects {expected}.")]
	UnsupportedVersion {
		/// Version this client implements.
		expected: u32,
		/// Version declared by the payload.
		received: u32,
	},
	/// The remote service rejected the freshly committed credential during profile refresh.
	#[error("Remote service rejected the credential: {reason}.")]
	CredentialRejectedByServer {
		/// Transport- or server-supplied reason string.
		reason: String,
	},
	/// Remote revocation failed during logout; local state is still cleared.
	#[error("Credential revocation failed: {reason}.")]
	RevocationFailed {
		/// Transport- or server-supplied reason string.
		reason: String,
	},
}
impl From<crate::flows::PayloadError> for Error {
	fn from(e: crate::flows::PayloadError) -> Self {
		Self::InvalidPayload { reason: e.to_string() }
	}
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Application name is empty or reduces to an unusable identifier.
	#[error("Application name is invalid.")]
	InvalidApplicationName(#[from] crate::auth::IdentifierError),
	/// API base URL cannot be parsed.
	#[error("API base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URL cannot be parsed.
	#[error("Redirect URL is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Composed authorization URL cannot be parsed.
	#[error("Authorization URL is invalid.")]
	InvalidAuthorizeUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// At least one scope must be requested.
	#[error("At least one scope must be requested.")]
	EmptyScopes,
	/// Base URL or redirect URL was not provided to the builder.
	#[error("Missing required configuration field: {field}.")]
	MissingField {
		/// Name of the absent builder field.
		field: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("database unreachable"));

		let source = StdError::source(&error)
			.expect("Converted error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn version_mismatch_message_names_both_versions() {
		let error = Error::UnsupportedVersion { expected: 4, received: 3 };

		assert!(error.to_string().contains('4'));
		assert!(error.to_string().contains('3'));
	}
}
