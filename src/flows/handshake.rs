//! One login attempt end-to-end: request assembly, popup exchange, payload validation.
//!
//! The decrypted payload is the only authenticated artifact in the exchange (it was encrypted
//! specifically for this client's public key), so validation binds it to the outstanding
//! attempt via the stored nonce before trusting anything inside it. The nonce is single-use:
//! it is removed after every outcome, including cancellation, so a retry is never
//! replay-vulnerable.

mod payload;
mod session;

pub use payload::{HandshakePayload, PayloadError};
pub use session::HandshakeSession;

// self
use crate::{
	_prelude::*,
	auth::Credential,
	flows::{
		UserKeyClient,
		common::{PROP_CLIENT_ID, PROP_NONCE},
	},
	http::ForumHttpClient,
	keys::Keypair,
	obs,
};

/// Phases of one handshake attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakePhase {
	/// No attempt in flight.
	Idle,
	/// Gathering key material and assembling the authorization URL.
	BuildingRequest,
	/// Suspended on the popup channel.
	AwaitingResponse,
	/// Decrypting and checking the returned payload.
	Validating,
	/// A candidate credential was extracted and handed to the lifecycle layer.
	Committed,
	/// The attempt was canceled or the payload failed validation.
	Rejected,
}
impl HandshakePhase {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakePhase::Idle => "idle",
			HandshakePhase::BuildingRequest => "building_request",
			HandshakePhase::AwaitingResponse => "awaiting_response",
			HandshakePhase::Validating => "validating",
			HandshakePhase::Committed => "committed",
			HandshakePhase::Rejected => "rejected",
		}
	}
}
impl Display for HandshakePhase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

impl<C> UserKeyClient<C>
where
	C: ?Sized + ForumHttpClient,
{
	/// Runs one handshake attempt and returns the candidate credential.
	///
	/// The candidate is never persisted here; committing is the lifecycle layer's job.
	pub(crate) async fn run_handshake(&self) -> Result<Credential> {
		obs::record_handshake_phase(HandshakePhase::BuildingRequest.as_str());

		let keypair = self.keypair_store.keys(self.app_id()).await?;
		let client_id = self.stored_or_fresh_client_id().await?;
		let nonce = self.fresh_nonce().await?;
		let session =
			session::build_session(&self.config, &keypair.public_key, &nonce, &client_id)?;

		obs::record_handshake_phase(HandshakePhase::AwaitingResponse.as_str());

		let raw = match self.popup.open(&session.authorize_url, &self.config.popup).await {
			Ok(raw) => raw,
			Err(cancel) => {
				// A canceled attempt must not leave a replayable nonce behind.
				self.discard_nonce().await;
				obs::record_handshake_phase(HandshakePhase::Rejected.as_str());

				return Err(cancel.into());
			},
		};

		obs::record_handshake_phase(HandshakePhase::Validating.as_str());

		let outcome = self.validate_response(&keypair, &raw).await;

		self.discard_nonce().await;

		match &outcome {
			Ok(_) => obs::record_handshake_phase(HandshakePhase::Committed.as_str()),
			Err(_) => obs::record_handshake_phase(HandshakePhase::Rejected.as_str()),
		}

		outcome
	}

	async fn validate_response(&self, keypair: &Keypair, raw: &str) -> Result<Credential> {
		let payload = payload::decrypt_payload(keypair.private_key.expose(), raw)?;
		let stored_nonce = self.store.get(self.app_id(), PROP_NONCE).await?;

		if stored_nonce.as_deref() != Some(payload.nonce.as_str()) {
			return Err(Error::NonceMismatch);
		}
		if payload.api != self.config.expected_api_version {
			return Err(Error::UnsupportedVersion {
				expected: self.config.expected_api_version,
				received: payload.api,
			});
		}

		Ok(Credential::new(payload.key))
	}

	async fn stored_or_fresh_client_id(&self) -> Result<String> {
		let app = self.app_id();

		if let Some(existing) = self.store.get(app, PROP_CLIENT_ID).await? {
			return Ok(existing);
		}

		let fresh = session::random_hex(session::CLIENT_ID_HEX_LEN);

		self.store.set(app, PROP_CLIENT_ID, fresh.clone()).await?;

		Ok(fresh)
	}

	async fn fresh_nonce(&self) -> Result<String> {
		let nonce = session::random_hex(session::NONCE_HEX_LEN);

		self.store.set(self.app_id(), PROP_NONCE, nonce.clone()).await?;

		Ok(nonce)
	}

	async fn discard_nonce(&self) {
		// Best effort; the attempt's primary error must win.
		let _ = self.store.remove(self.app_id(), PROP_NONCE).await;
	}
}
