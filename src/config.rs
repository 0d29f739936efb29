//! Client configuration and its validating builder.

// self
use crate::{
	_prelude::*,
	auth::{AppId, ScopeSet},
	error::ConfigError,
	popup::PopupOptions,
};

/// User API version this client implements by default.
///
/// The remote service declares its version inside the encrypted payload; override with
/// [`ClientConfigBuilder::expected_api_version`] when targeting an older deployment.
pub const DEFAULT_EXPECTED_API_VERSION: u32 = 4;

/// Validated configuration shared by every flow of one client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Human-readable application name shown on the remote authorization page.
	pub application_name: String,
	/// Identifier scoping all persisted state, derived from the application name.
	pub app_id: AppId,
	/// Base URL of the forum's REST API, without a trailing slash.
	pub api_base_url: Url,
	/// Scopes requested during the handshake.
	pub scopes: ScopeSet,
	/// Page the authorization flow redirects back to.
	pub auth_redirect: Url,
	/// User API version this client accepts in handshake payloads.
	pub expected_api_version: u32,
	/// Popup window geometry and origin filtering.
	pub popup: PopupOptions,
}
impl ClientConfig {
	/// Returns a builder seeded with the provided application name.
	pub fn builder(application_name: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(application_name)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	/// Application name the configuration is being built for.
	pub application_name: String,
	/// Base URL of the forum's REST API.
	pub api_base_url: Option<String>,
	/// Requested scopes.
	pub scopes: Vec<String>,
	/// Redirect target for the authorization flow.
	pub auth_redirect: Option<String>,
	/// Accepted user API version.
	pub expected_api_version: u32,
	/// Popup window geometry.
	pub popup: PopupOptions,
}
impl ClientConfigBuilder {
	fn new(application_name: impl Into<String>) -> Self {
		Self {
			application_name: application_name.into(),
			api_base_url: None,
			scopes: Vec::new(),
			auth_redirect: None,
			expected_api_version: DEFAULT_EXPECTED_API_VERSION,
			popup: PopupOptions::default(),
		}
	}

	/// Sets the API base URL; a trailing slash is trimmed during build.
	pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
		self.api_base_url = Some(url.into());

		self
	}

	/// Sets the requested scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Sets the redirect target (the page hosting the client).
	pub fn auth_redirect(mut self, url: impl Into<String>) -> Self {
		self.auth_redirect = Some(url.into());

		self
	}

	/// Overrides the accepted user API version.
	pub fn expected_api_version(mut self, version: u32) -> Self {
		self.expected_api_version = version;

		self
	}

	/// Overrides the popup window geometry.
	pub fn popup(mut self, popup: PopupOptions) -> Self {
		self.popup = popup;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let app_id = AppId::from_app_name(&self.application_name)?;
		let raw_base =
			self.api_base_url.ok_or(ConfigError::MissingField { field: "api_base_url" })?;
		let api_base_url = Url::parse(raw_base.trim_end_matches('/'))
			.map_err(|source| ConfigError::InvalidBaseUrl { source })?;
		let raw_redirect =
			self.auth_redirect.ok_or(ConfigError::MissingField { field: "auth_redirect" })?;
		let auth_redirect = Url::parse(&raw_redirect)
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let scopes = ScopeSet::new(self.scopes)?;

		if scopes.is_empty() {
			return Err(ConfigError::EmptyScopes);
		}

		let mut popup = self.popup;

		if popup.origin_filter.is_none() {
			popup.origin_filter = Some(auth_redirect.origin().ascii_serialization());
		}

		Ok(ClientConfig {
			application_name: self.application_name,
			app_id,
			api_base_url,
			scopes,
			auth_redirect,
			expected_api_version: self.expected_api_version,
			popup,
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn builder() -> ClientConfigBuilder {
		ClientConfig::builder("App name")
			.api_base_url("https://forum.example.com/")
			.auth_redirect("https://app.example.com/callback")
			.scopes(["write"])
	}

	#[test]
	fn build_derives_identifier_and_trims_the_base_url() {
		let config = builder().build().expect("Valid configuration should build.");

		assert_eq!(config.app_id.as_ref(), "app-name");
		assert_eq!(config.api_base_url.as_str(), "https://forum.example.com/");
		assert_eq!(config.scopes.normalized(), "write");
		assert_eq!(config.expected_api_version, DEFAULT_EXPECTED_API_VERSION);
		assert_eq!(config.popup.origin_filter.as_deref(), Some("https://app.example.com"));
	}

	#[test]
	fn missing_fields_are_rejected() {
		let err = ClientConfig::builder("App name")
			.auth_redirect("https://app.example.com/callback")
			.scopes(["write"])
			.build()
			.expect_err("Missing base URL should be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "api_base_url" }));

		let err = builder().scopes(Vec::<String>::new()).build()
			.expect_err("Empty scopes should be rejected.");

		assert!(matches!(err, ConfigError::EmptyScopes));
	}

	#[test]
	fn invalid_inputs_surface_typed_errors() {
		assert!(matches!(
			builder().api_base_url("not a url").build(),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
		assert!(matches!(
			builder().auth_redirect("not a url").build(),
			Err(ConfigError::InvalidRedirect { .. })
		));
		assert!(matches!(
			ClientConfig::builder("$$$")
				.api_base_url("https://forum.example.com")
				.auth_redirect("https://app.example.com/callback")
				.scopes(["write"])
				.build(),
			Err(ConfigError::InvalidApplicationName(_))
		));
	}

	#[test]
	fn version_override_is_kept() {
		let config = builder()
			.expected_api_version(3)
			.build()
			.expect("Configuration with version override should build.");

		assert_eq!(config.expected_api_version, 3);
	}
}
