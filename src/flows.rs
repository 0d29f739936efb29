//! Credential flows: the client facade, the key-exchange handshake, and lifecycle operations.

pub mod handshake;

mod common;
mod lifecycle;

pub use handshake::{HandshakePayload, HandshakePhase, HandshakeSession, PayloadError};

// self
use crate::{
	_prelude::*,
	auth::AppId,
	config::ClientConfig,
	events::{AuthEvent, EventSink},
	flows::common::LoginGate,
	http::ForumHttpClient,
	keys::{KeypairGenerator, KeypairStore},
	popup::PopupChannel,
	store::AppPropStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestForumClient, keys::RsaKeypairGenerator};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestUserKeyClient = UserKeyClient<ReqwestForumClient>;

/// Coordinates the user API key handshake and credential lifecycle for one application.
///
/// The client owns the property store, popup channel, keypair machinery, and HTTP
/// collaborator so the flow implementations can focus on protocol logic (request assembly,
/// payload validation, credential commits). All persisted state is scoped by the
/// application identifier derived from the configured application name, so distinct
/// applications sharing one store never observe each other's keys or credentials.
pub struct UserKeyClient<C>
where
	C: ?Sized + ForumHttpClient,
{
	/// HTTP collaborator used for profile refreshes and revocation.
	pub http_client: Arc<C>,
	/// Property store persisting keys, handshake artifacts, and the credential.
	pub store: Arc<dyn AppPropStore>,
	/// Popup channel driving the authorization exchange.
	pub popup: Arc<dyn PopupChannel>,
	/// Validated client configuration.
	pub config: ClientConfig,
	pub(crate) keypair_store: KeypairStore,
	sinks: Vec<Arc<dyn EventSink>>,
	pub(crate) login_gate: LoginGate,
}
impl<C> UserKeyClient<C>
where
	C: ?Sized + ForumHttpClient,
{
	/// Creates a client that reuses the caller-provided HTTP collaborator.
	pub fn with_http_client(
		store: Arc<dyn AppPropStore>,
		config: ClientConfig,
		popup: Arc<dyn PopupChannel>,
		generator: Arc<dyn KeypairGenerator>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			keypair_store: KeypairStore::new(store.clone(), generator),
			store,
			popup,
			config,
			sinks: Vec::new(),
			login_gate: LoginGate::default(),
		}
	}

	/// Registers a lifecycle event sink.
	pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
		self.sinks.push(sink);

		self
	}

	/// Identifier scoping this client's persisted state.
	pub fn app_id(&self) -> &AppId {
		&self.config.app_id
	}

	pub(crate) fn emit(&self, event: AuthEvent) {
		for sink in &self.sinks {
			sink.publish(event);
		}
	}
}
#[cfg(feature = "reqwest")]
impl UserKeyClient<ReqwestForumClient> {
	/// Creates a new client for the provided configuration, store, and popup channel.
	///
	/// The client provisions its own reqwest-backed HTTP collaborator against the configured
	/// API base URL and the default background RSA generator. Use
	/// [`UserKeyClient::with_http_client`] to supply custom collaborators.
	pub fn new(
		store: Arc<dyn AppPropStore>,
		config: ClientConfig,
		popup: Arc<dyn PopupChannel>,
	) -> Result<Self> {
		let http_client = ReqwestForumClient::new(config.api_base_url.clone())?;

		Ok(Self::with_http_client(
			store,
			config,
			popup,
			Arc::new(RsaKeypairGenerator::default()),
			http_client,
		))
	}
}
impl<C> Debug for UserKeyClient<C>
where
	C: ?Sized + ForumHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UserKeyClient")
			.field("application_name", &self.config.application_name)
			.field("app_id", &self.config.app_id)
			.field("api_base_url", &self.config.api_base_url)
			.field("scopes", &self.config.scopes)
			.finish()
	}
}
