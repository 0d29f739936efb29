//! Popup communication channel contract.
//!
//! The handshake hands a fully-formed authorization URL to the channel and suspends until the
//! remote service delivers exactly one payload string back through the opened window, or the
//! attempt is canceled. The crate never implements the channel itself; embedding applications
//! supply one appropriate to their windowing environment.

// self
use crate::_prelude::*;

const DEFAULT_POPUP_WIDTH: u32 = 700;
const DEFAULT_POPUP_HEIGHT: u32 = 650;

/// Rejection reasons reported by a [`PopupChannel`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PopupError {
	/// The user closed the window before a payload arrived.
	#[error("Popup window was closed by the user.")]
	Closed,
	/// The browser refused to open the window.
	#[error("Popup window was blocked by the browser.")]
	Blocked,
	/// Any other channel failure (timeout, messaging error).
	#[error("Popup channel failed: {message}.")]
	Channel {
		/// Channel-supplied description of the failure.
		message: String,
	},
}
impl From<PopupError> for Error {
	fn from(value: PopupError) -> Self {
		match value {
			PopupError::Closed => Error::PopupClosedByUser,
			PopupError::Blocked => Error::PopupBlocked,
			PopupError::Channel { message } => Error::ChannelError { reason: message },
		}
	}
}

/// Window geometry and origin filtering applied when opening the popup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopupOptions {
	/// Window width in pixels.
	pub width: u32,
	/// Window height in pixels.
	pub height: u32,
	/// Serialized origin that delivered messages must match, when set.
	pub origin_filter: Option<String>,
}
impl Default for PopupOptions {
	fn default() -> Self {
		Self { width: DEFAULT_POPUP_WIDTH, height: DEFAULT_POPUP_HEIGHT, origin_filter: None }
	}
}

/// Future alias resolved by [`PopupChannel::open`].
pub type PopupFuture<'a> = Pin<Box<dyn Future<Output = Result<String, PopupError>> + 'a + Send>>;

/// Asynchronous popup window channel.
///
/// `open` must settle exactly once: with the delivered payload string, or with a
/// [`PopupError`] describing why the exchange ended without one.
pub trait PopupChannel
where
	Self: Send + Sync,
{
	/// Opens the authorization URL and waits for the payload message.
	fn open<'a>(&'a self, url: &'a Url, options: &'a PopupOptions) -> PopupFuture<'a>;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn popup_errors_map_to_crate_errors() {
		assert!(matches!(Error::from(PopupError::Closed), Error::PopupClosedByUser));
		assert!(matches!(Error::from(PopupError::Blocked), Error::PopupBlocked));

		let err = Error::from(PopupError::Channel { message: "timed out".into() });

		assert!(matches!(err, Error::ChannelError { reason } if reason == "timed out"));
	}

	#[test]
	fn default_geometry_matches_the_login_window() {
		let options = PopupOptions::default();

		assert_eq!((options.width, options.height), (700, 650));
		assert!(options.origin_filter.is_none());
	}
}
