//! Application identifier derived from the embedding application's name.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Error returned when an application identifier cannot be derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The application name was empty or whitespace.
	#[error("Application name cannot be empty.")]
	Empty,
	/// The application name contains no usable identifier characters.
	#[error("Application name `{name}` does not reduce to a usable identifier.")]
	Unusable {
		/// The offending application name.
		name: String,
	},
	/// A persisted identifier was not in canonical slug form.
	#[error("Identifier `{value}` is not a canonical slug.")]
	NotCanonical {
		/// The offending identifier string.
		value: String,
	},
}

/// URL-safe identifier scoping all persisted state to one application.
///
/// Derived from the application name by lowercasing, replacing whitespace runs with a single
/// dash, and dropping every character outside `[a-z0-9_-]`. `"App name"` becomes `app-name`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppId(String);
impl AppId {
	/// Derives the identifier for an application name.
	pub fn from_app_name(name: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = name.as_ref();

		if view.trim().is_empty() {
			return Err(IdentifierError::Empty);
		}

		let slug = slugify(view);

		if slug.is_empty() {
			return Err(IdentifierError::Unusable { name: view.to_owned() });
		}

		Ok(Self(slug))
	}
}
impl Deref for AppId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for AppId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for AppId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<AppId> for String {
	fn from(value: AppId) -> Self {
		value.0
	}
}
impl TryFrom<String> for AppId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		if value.is_empty() {
			return Err(IdentifierError::Empty);
		}
		if slugify(&value) != value {
			return Err(IdentifierError::NotCanonical { value });
		}

		Ok(Self(value))
	}
}
impl FromStr for AppId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::try_from(s.to_owned())
	}
}
impl Debug for AppId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "AppId({})", self.0)
	}
}
impl Display for AppId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn slugify(text: &str) -> String {
	let mut slug = String::with_capacity(text.len());
	let mut pending_dash = false;

	for ch in text.to_lowercase().chars() {
		if ch.is_whitespace() || ch == '-' {
			pending_dash = !slug.is_empty();

			continue;
		}
		if ch.is_ascii_alphanumeric() || ch == '_' {
			if pending_dash {
				slug.push('-');

				pending_dash = false;
			}

			slug.push(ch);
		}
	}

	slug
}
