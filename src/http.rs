//! Remote HTTP collaborator for the two calls the handshake needs.
//!
//! The credential lifecycle only ever issues (a) a session-profile fetch that validates a
//! freshly committed credential and (b) a best-effort revocation on logout. Both are single
//! idempotent calls; retry and backoff policy belongs to the embedding application, not here.

// self
use crate::{_prelude::*, auth::CurrentUser, error::BoxError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

#[cfg(feature = "reqwest")] const SESSION_PATH: &str = "/session/current.json";
#[cfg(feature = "reqwest")] const REVOKE_PATH: &str = "/user-api-key/revoke";

/// Error type produced by [`ForumHttpClient`] implementations.
#[derive(Debug, ThisError)]
pub enum HttpClientError {
	/// Endpoint answered with a non-success status.
	#[error("Forum endpoint returned HTTP {status}: {message}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body excerpt, when available.
		message: String,
	},
	/// Endpoint answered with a body this client could not decode.
	#[error("Forum endpoint returned a malformed response.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Underlying transport reported a network failure.
	#[error("Network error occurred while calling the forum endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl HttpClientError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for HttpClientError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Future alias returned by [`ForumHttpClient`] implementations.
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, HttpClientError>> + 'a + Send>>;

/// Narrow HTTP contract against the forum's REST API.
pub trait ForumHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Fetches the profile of the session the provided key authenticates.
	fn current_session_user<'a>(&'a self, api_key: &'a str) -> HttpFuture<'a, CurrentUser>;

	/// Revokes the provided key on the remote service.
	fn revoke_key<'a>(&'a self, api_key: &'a str) -> HttpFuture<'a, ()>;
}

/// Envelope wrapping the profile in the session endpoint response.
#[cfg(feature = "reqwest")]
#[derive(Debug, Deserialize)]
struct CurrentSessionEnvelope {
	current_user: CurrentUser,
}

/// Reqwest-backed [`ForumHttpClient`].
///
/// Requests carry the `User-Api-Key` credential header plus the `X-Requested-With` marker the
/// forum uses to distinguish API traffic.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestForumClient {
	base: Url,
	client: ReqwestClient,
}
#[cfg(feature = "reqwest")]
impl ReqwestForumClient {
	/// Creates a client for the provided API base URL with a default transport.
	pub fn new(base: Url) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;

		Ok(Self::with_client(base, client))
	}

	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(base: Url, client: ReqwestClient) -> Self {
		Self { base, client }
	}

	fn endpoint(&self, path: &str) -> Result<Url, HttpClientError> {
		let composed = format!("{}{path}", self.base.as_str().trim_end_matches('/'));

		Url::parse(&composed).map_err(HttpClientError::network)
	}

	async fn ensure_success(
		response: reqwest::Response,
	) -> Result<reqwest::Response, HttpClientError> {
		let status = response.status();

		if status.is_success() {
			return Ok(response);
		}

		let message = response.text().await.unwrap_or_default();

		Err(HttpClientError::Status { status: status.as_u16(), message })
	}

	fn authenticated(
		&self,
		request: reqwest::RequestBuilder,
		api_key: &str,
	) -> reqwest::RequestBuilder {
		request.header("User-Api-Key", api_key).header("X-Requested-With", "XMLHttpRequest")
	}
}
#[cfg(feature = "reqwest")]
impl ForumHttpClient for ReqwestForumClient {
	fn current_session_user<'a>(&'a self, api_key: &'a str) -> HttpFuture<'a, CurrentUser> {
		Box::pin(async move {
			let url = self.endpoint(SESSION_PATH)?;
			let request = self.authenticated(self.client.get(url), api_key);
			let response = Self::ensure_success(request.send().await?).await?;
			let bytes = response.bytes().await?;
			let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
			let envelope: CurrentSessionEnvelope =
				serde_path_to_error::deserialize(&mut deserializer)
					.map_err(|source| HttpClientError::Decode { source })?;

			Ok(envelope.current_user)
		})
	}

	fn revoke_key<'a>(&'a self, api_key: &'a str) -> HttpFuture<'a, ()> {
		Box::pin(async move {
			let url = self.endpoint(REVOKE_PATH)?;
			let request = self.authenticated(self.client.post(url), api_key);

			Self::ensure_success(request.send().await?).await?;

			Ok(())
		})
	}
}
