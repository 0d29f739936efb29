//! Shared flow state: property names, the per-application login gate, and coalesced outcomes.

// self
use crate::{_prelude::*, store::StoreError};

pub(crate) const PROP_NONCE: &str = "nonce";
pub(crate) const PROP_CLIENT_ID: &str = "clientId";
pub(crate) const PROP_USER_API_KEY: &str = "userApiKey";
pub(crate) const PROP_CURRENT_USER: &str = "currentUser";

/// Singleflight gate enforcing at most one in-flight handshake per application.
///
/// The first caller to take `lock` becomes the leader and runs the popup exchange; callers
/// that find the gate held wait for the leader to finish, then report the outcome recorded
/// in `last_outcome` instead of opening a second popup.
#[derive(Clone, Debug, Default)]
pub(crate) struct LoginGate {
	pub(crate) lock: Arc<AsyncMutex<()>>,
	pub(crate) last_outcome: Arc<Mutex<Option<LoginOutcome>>>,
}

/// Shareable summary of a finished login attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LoginOutcome {
	Success,
	Failure(LoginFailure),
}
impl LoginOutcome {
	pub(crate) fn into_result(self) -> Result<()> {
		match self {
			LoginOutcome::Success => Ok(()),
			LoginOutcome::Failure(failure) => Err(failure.into_error()),
		}
	}
}

/// Failure kinds a coalesced follower can reconstruct a typed error from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum LoginFailure {
	KeyGeneration { reason: String },
	PopupClosed,
	PopupBlocked,
	Channel { reason: String },
	InvalidPayload { reason: String },
	NonceMismatch,
	UnsupportedVersion { expected: u32, received: u32 },
	CredentialRejected { reason: String },
	Storage(StoreError),
	Other { reason: String },
}
impl LoginFailure {
	fn into_error(self) -> Error {
		match self {
			LoginFailure::KeyGeneration { reason } => Error::KeyGenerationFailed { reason },
			LoginFailure::PopupClosed => Error::PopupClosedByUser,
			LoginFailure::PopupBlocked => Error::PopupBlocked,
			LoginFailure::Channel { reason } => Error::ChannelError { reason },
			LoginFailure::InvalidPayload { reason } => Error::InvalidPayload { reason },
			LoginFailure::NonceMismatch => Error::NonceMismatch,
			LoginFailure::UnsupportedVersion { expected, received } =>
				Error::UnsupportedVersion { expected, received },
			LoginFailure::CredentialRejected { reason } =>
				Error::CredentialRejectedByServer { reason },
			LoginFailure::Storage(source) => Error::Storage(source),
			LoginFailure::Other { reason } => Error::ChannelError { reason },
		}
	}
}

/// Summarizes a leader's login result for followers coalesced behind the gate.
pub(crate) fn summarize<T>(result: &Result<T>) -> LoginOutcome {
	let err = match result {
		Ok(_) => return LoginOutcome::Success,
		Err(err) => err,
	};
	let failure = match err {
		Error::KeyGenerationFailed { reason } =>
			LoginFailure::KeyGeneration { reason: reason.clone() },
		Error::PopupClosedByUser => LoginFailure::PopupClosed,
		Error::PopupBlocked => LoginFailure::PopupBlocked,
		Error::ChannelError { reason } => LoginFailure::Channel { reason: reason.clone() },
		Error::InvalidPayload { reason } => LoginFailure::InvalidPayload { reason: reason.clone() },
		Error::NonceMismatch => LoginFailure::NonceMismatch,
		Error::UnsupportedVersion { expected, received } =>
			LoginFailure::UnsupportedVersion { expected: *expected, received: *received },
		Error::CredentialRejectedByServer { reason } =>
			LoginFailure::CredentialRejected { reason: reason.clone() },
		Error::Storage(source) => LoginFailure::Storage(source.clone()),
		other => LoginFailure::Other { reason: other.to_string() },
	};

	LoginOutcome::Failure(failure)
}
