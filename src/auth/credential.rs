//! Credential and cached profile models.

// self
use crate::{_prelude::*, auth::secret::Secret};

const DEFAULT_AVATAR_SIZE: u32 = 110;

/// Bearer credential obtained from a successful handshake.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
	/// Opaque bearer token presented on subsequent authenticated calls.
	pub api_key: Secret,
	/// Instant the credential was committed by this client.
	pub acquired_at: OffsetDateTime,
}
impl Credential {
	/// Creates a credential stamped with the current clock.
	pub fn new(api_key: impl Into<String>) -> Self {
		Self { api_key: Secret::new(api_key), acquired_at: OffsetDateTime::now_utc() }
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("api_key", &"<redacted>")
			.field("acquired_at", &self.acquired_at)
			.finish()
	}
}

/// Profile of the session user, cached after each successful refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
	/// Unique handle on the remote service.
	pub username: String,
	/// Optional display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Whether the user may create topics; silenced users cannot.
	#[serde(default)]
	pub can_create_topic: bool,
	/// Avatar URL template containing a literal `{size}` placeholder.
	#[serde(default)]
	pub avatar_template: Option<String>,
}
impl CurrentUser {
	/// Display name, falling back to the username.
	pub fn display_name(&self) -> &str {
		self.name.as_deref().filter(|name| !name.is_empty()).unwrap_or(&self.username)
	}

	/// Whether the remote service has silenced this user.
	pub fn is_silenced(&self) -> bool {
		!self.can_create_topic
	}

	/// Absolute avatar URL with the `{size}` placeholder substituted (default 110).
	pub fn avatar_url(&self, api_base_url: &Url, size: Option<u32>) -> Option<String> {
		let template = self.avatar_template.as_deref()?;
		let rendered =
			template.replace("{size}", &size.unwrap_or(DEFAULT_AVATAR_SIZE).to_string());

		Some(format!("{}/{}", api_base_url.as_str().trim_end_matches('/'), rendered.trim_start_matches('/')))
	}

	/// Absolute URL of the user's notifications page.
	pub fn notifications_url(&self, api_base_url: &Url) -> String {
		format!("{}/u/{}/notifications", api_base_url.as_str().trim_end_matches('/'), self.username)
	}
}
