//! Credential lifecycle operations: login, logout, and liveness checks.
//!
//! "Logged in" means the remote service currently accepts the stored credential, not merely
//! that a key is cached: every liveness check refreshes the session profile and clears local
//! state when the refresh fails. Login attempts are atomic; no failure path leaves a half-set
//! credential behind.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CurrentUser},
	events::AuthEvent,
	flows::{
		UserKeyClient,
		common::{self, PROP_CLIENT_ID, PROP_CURRENT_USER, PROP_NONCE, PROP_USER_API_KEY},
	},
	http::ForumHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::StoreError,
};

impl<C> UserKeyClient<C>
where
	C: ?Sized + ForumHttpClient,
{
	/// Returns whether the stored credential is currently accepted by the remote service.
	///
	/// Any profile refresh failure triggers an automatic logout and returns `false`;
	/// storage failures propagate as errors.
	pub async fn is_logged_in(&self) -> Result<bool> {
		let Some(credential) = self.credential().await? else {
			return Ok(false);
		};

		match self.fetch_and_cache_profile(&credential).await {
			Ok(_) => Ok(true),
			Err(Error::Storage(source)) => Err(Error::Storage(source)),
			Err(_) => {
				self.logout().await?;

				Ok(false)
			},
		}
	}

	/// Obtains and commits a credential via the popup handshake.
	///
	/// No-op when already logged in. At most one handshake runs per application identifier:
	/// a concurrent call waits for the in-flight attempt and reports its outcome instead of
	/// opening a second popup. On success the committed credential is validated with a
	/// profile refresh before the call resolves.
	pub async fn login(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let gate = self.login_gate.clone();

				if let Some(_leader) = gate.lock.try_lock() {
					*gate.last_outcome.lock() = None;

					let attempt = self.login_attempt().await;

					match &attempt {
						Ok(true) => self.emit(AuthEvent::LoggedIn),
						Ok(false) => {},
						Err(Error::PopupClosedByUser) => self.emit(AuthEvent::LoginCanceled),
						Err(Error::PopupBlocked) => self.emit(AuthEvent::LoginBlocked),
						Err(_) => {},
					}

					*gate.last_outcome.lock() = Some(common::summarize(&attempt));

					attempt.map(|_| ())
				} else {
					// Coalesce with the in-flight attempt instead of opening a second popup.
					let _follower = gate.lock.lock().await;
					let outcome = gate.last_outcome.lock().clone();

					outcome.map_or(Ok(()), common::LoginOutcome::into_result)
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Revokes the credential remotely (best effort) and clears all local handshake state.
	///
	/// Revocation failures are logged and never block the local clear; afterwards
	/// [`is_logged_in`](Self::is_logged_in) is guaranteed to report `false`.
	pub async fn logout(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if let Some(credential) = self.credential().await? {
					if let Err(e) = self.http_client.revoke_key(credential.api_key.expose()).await
					{
						let failure = Error::RevocationFailed { reason: e.to_string() };

						obs::record_revocation_failure(&failure);
					}
				}

				self.clear_auth_data().await?;
				self.emit(AuthEvent::LoggedOut);

				Ok(())
			})
			.await;

		match &result {
			Ok(()) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Returns the stored credential, if any.
	pub async fn credential(&self) -> Result<Option<Credential>> {
		let Some(raw) = self.store.get(self.app_id(), PROP_USER_API_KEY).await? else {
			return Ok(None);
		};

		serde_json::from_str(&raw).map(Some).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to parse stored credential: {e}") }
				.into()
		})
	}

	/// Returns the cached session profile, if any.
	pub async fn current_user(&self) -> Result<Option<CurrentUser>> {
		let Some(raw) = self.store.get(self.app_id(), PROP_CURRENT_USER).await? else {
			return Ok(None);
		};

		serde_json::from_str(&raw).map(Some).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to parse cached profile: {e}") }
				.into()
		})
	}

	/// Runs one gated login attempt; `true` means a new credential was committed.
	async fn login_attempt(&self) -> Result<bool> {
		if self.is_logged_in().await? {
			return Ok(false);
		}

		let candidate = self.run_handshake().await?;

		self.persist_credential(&candidate).await?;

		match self.fetch_and_cache_profile(&candidate).await {
			Ok(_) => Ok(true),
			Err(err) => {
				// The server refused the fresh credential; roll the commit back so no
				// half-set credential survives the failed attempt.
				self.discard_credential().await?;

				Err(err)
			},
		}
	}

	/// Fetches the session profile with the provided credential and caches it.
	async fn fetch_and_cache_profile(&self, credential: &Credential) -> Result<CurrentUser> {
		const KIND: FlowKind = FlowKind::ProfileRefresh;

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let user = match self.http_client.current_session_user(credential.api_key.expose()).await
		{
			Ok(user) => user,
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				return Err(Error::CredentialRejectedByServer { reason: e.to_string() });
			},
		};
		let serialized = serde_json::to_string(&user).map_err(|e| {
			Error::from(StoreError::Serialization {
				message: format!("Failed to serialize session profile: {e}"),
			})
		})?;

		self.store.set(self.app_id(), PROP_CURRENT_USER, serialized).await?;
		obs::record_flow_outcome(KIND, FlowOutcome::Success);

		Ok(user)
	}

	async fn persist_credential(&self, credential: &Credential) -> Result<()> {
		let serialized = serde_json::to_string(credential).map_err(|e| {
			Error::from(StoreError::Serialization {
				message: format!("Failed to serialize credential: {e}"),
			})
		})?;

		self.store.set(self.app_id(), PROP_USER_API_KEY, serialized).await?;

		Ok(())
	}

	async fn discard_credential(&self) -> Result<()> {
		let app = self.app_id();

		self.store.remove(app, PROP_USER_API_KEY).await?;
		self.store.remove(app, PROP_CURRENT_USER).await?;

		Ok(())
	}

	async fn clear_auth_data(&self) -> Result<()> {
		let app = self.app_id();

		self.discard_credential().await?;
		self.store.remove(app, PROP_CLIENT_ID).await?;
		self.store.remove(app, PROP_NONCE).await?;

		Ok(())
	}
}
