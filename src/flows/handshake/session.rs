// crates.io
use rand::Rng;
// self
use crate::{_prelude::*, config::ClientConfig, error::ConfigError};

pub(crate) const NONCE_HEX_LEN: usize = 32;
pub(crate) const CLIENT_ID_HEX_LEN: usize = 32;
const AUTHORIZE_PATH: &str = "/user-api-key/new";

/// Assembled authorization request for one handshake attempt.
#[derive(Clone, Debug)]
pub struct HandshakeSession {
	/// Single-use nonce binding the response to this attempt.
	pub nonce: String,
	/// Stable per-application client identifier.
	pub client_id: String,
	/// Fully-formed authorization URL the popup channel should open.
	pub authorize_url: Url,
}

pub(super) fn build_session(
	config: &ClientConfig,
	public_key_pem: &str,
	nonce: &str,
	client_id: &str,
) -> Result<HandshakeSession, ConfigError> {
	let authorize_url = build_authorize_url(config, public_key_pem, nonce, client_id)?;

	Ok(HandshakeSession {
		nonce: nonce.to_owned(),
		client_id: client_id.to_owned(),
		authorize_url,
	})
}

// The query is assembled by hand instead of through a URL library so the parameter order and
// escaping stay byte-for-byte stable; the remote service signs up for exactly this shape.
fn build_authorize_url(
	config: &ClientConfig,
	public_key_pem: &str,
	nonce: &str,
	client_id: &str,
) -> Result<Url, ConfigError> {
	let scopes = config.scopes.normalized();
	let params = [
		("application_name", config.application_name.as_str()),
		("public_key", public_key_pem),
		("nonce", nonce),
		("client_id", client_id),
		("auth_redirect", config.auth_redirect.as_str()),
		("scopes", scopes.as_str()),
	];
	let query = params
		.iter()
		.map(|(name, value)| format!("{name}={}", percent_encode(value)))
		.collect::<Vec<_>>()
		.join("&");
	let composed = format!(
		"{}{AUTHORIZE_PATH}?{query}",
		config.api_base_url.as_str().trim_end_matches('/'),
	);

	Url::parse(&composed).map_err(|source| ConfigError::InvalidAuthorizeUrl { source })
}

/// Percent-encodes a parameter value like the browser's component encoder: unreserved
/// characters `A-Z a-z 0-9 - _ . ! ~ * ' ( )` pass through, everything else is emitted as
/// uppercase `%XX` escapes over UTF-8 bytes.
pub(crate) fn percent_encode(value: &str) -> String {
	let mut out = String::with_capacity(value.len());

	for byte in value.bytes() {
		match byte {
			b'A'..=b'Z'
			| b'a'..=b'z'
			| b'0'..=b'9'
			| b'-'
			| b'_'
			| b'.'
			| b'!'
			| b'~'
			| b'*'
			| b'\''
			| b'('
			| b')' => out.push(char::from(byte)),
			_ => {
				out.push('%');
				out.push_str(&format!("{byte:02X}"));
			},
		}
	}

	out
}

/// Returns `len` lowercase hex characters from the thread-local CSPRNG.
pub(crate) fn random_hex(len: usize) -> String {
	let mut bytes = vec![0_u8; len.div_ceil(2)];

	rand::rng().fill(bytes.as_mut_slice());

	let mut out = String::with_capacity(bytes.len() * 2);

	for byte in &bytes {
		out.push_str(&format!("{byte:02x}"));
	}

	out.truncate(len);

	out
}
