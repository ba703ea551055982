//! Item identifiers as served by the catalog service.

use std::{fmt, ops::Deref, str::FromStr};

use crate::error::{Error, Result};

/// Name of a playable item.
///
/// Identifiers are opaque to the client: they are displayed as-is and sent
/// back to the stream service verbatim. The only invariant is that an
/// identifier contains at least one non-whitespace character.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an identifier, rejecting empty and whitespace-only names.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `name` is blank.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_argument("item identifier is blank"));
        }

        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ItemId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
