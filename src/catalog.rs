//! Catalog retrieval and parsing.
//!
//! The catalog service answers a plain GET with the names of all playable
//! items, one per line. [`Loader`] performs that request exactly once per
//! call and turns the body into a [`Catalog`] snapshot. It does not retry and
//! does not cache: deciding what to do with a failure is up to the session.
//!
//! # Example
//!
//! ```rust
//! use reelplay::catalog::Catalog;
//!
//! let catalog = Catalog::parse("Alpha\n\nBeta\nGamma\n");
//! assert_eq!(catalog.len(), 3);
//! ```

use std::{future::Future, ops::Deref};

use thiserror::Error;
use url::Url;

use crate::{
    config::Config,
    error::{Error, ErrorKind, Result},
    http::Client as HttpClient,
    item::ItemId,
};

/// Ordered snapshot of the items known to a session.
///
/// Snapshots are never edited: a new load produces a new snapshot.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct Catalog(Vec<ItemId>);

impl Catalog {
    /// Parses a newline-delimited catalog body.
    ///
    /// Empty and whitespace-only lines are discarded; all other lines are
    /// kept verbatim and in order, minus any trailing `\r`.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        body.split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter_map(|line| ItemId::new(line).ok())
            .collect()
    }

    /// Whether `name` is one of the items in this snapshot.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|item| item.as_str() == name)
    }

    /// Turns user input into an item.
    ///
    /// A 1-based position in this snapshot picks that item. Anything else
    /// that is not blank is taken as an item name as-is, whether or not the
    /// snapshot contains it.
    #[must_use]
    pub fn resolve(&self, input: &str) -> Option<ItemId> {
        let position = input
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| self.0.get(index));

        match position {
            Some(item) => Some(item.clone()),
            None => ItemId::new(input).ok(),
        }
    }
}

impl Deref for Catalog {
    type Target = [ItemId];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ItemId;
    type IntoIter = std::slice::Iter<'a, ItemId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<ItemId> for Catalog {
    fn from_iter<T: IntoIterator<Item = ItemId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The catalog could not be retrieved or read.
#[derive(Debug, Error)]
#[error("catalog unavailable: {0}")]
pub struct CatalogUnavailable(#[source] pub Error);

impl CatalogUnavailable {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.0.kind
    }
}

impl From<Error> for CatalogUnavailable {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

/// Anything that can produce a catalog snapshot.
pub trait Source {
    /// Retrieves one snapshot. Implementations make a single attempt.
    fn load(&self) -> impl Future<Output = std::result::Result<Catalog, CatalogUnavailable>> + Send;
}

/// Loads the catalog from the catalog service over HTTP.
pub struct Loader {
    http_client: HttpClient,
    url: Url,
}

impl Loader {
    /// Creates a loader for `config.catalog_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http_client: HttpClient::new(config)?,
            url: config.catalog_url.clone(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch(&self) -> Result<Catalog> {
        let request = self.http_client.get(self.url.clone());
        let response = self.http_client.execute(request).await?;
        let body = response.bytes().await?;
        let body = std::str::from_utf8(&body)?;

        Ok(Catalog::parse(body))
    }
}

impl Source for Loader {
    async fn load(&self) -> std::result::Result<Catalog, CatalogUnavailable> {
        debug!("loading catalog from {}", self.url);
        let catalog = self.fetch().await?;
        debug!("catalog has {} items", catalog.len());

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(catalog: &Catalog) -> Vec<&str> {
        catalog.iter().map(ItemId::as_str).collect()
    }

    #[test]
    fn parse_drops_blank_lines() {
        let catalog = Catalog::parse("Alpha\n\nBeta\nGamma\n");
        assert_eq!(names(&catalog), ["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn parse_drops_whitespace_only_lines_and_keeps_order() {
        let catalog = Catalog::parse("  \nZulu\n\t\nalpha\n \t \nMike\n\n\n");
        assert_eq!(names(&catalog), ["Zulu", "alpha", "Mike"]);
    }

    #[test]
    fn parse_accepts_crlf() {
        let catalog = Catalog::parse("Alpha\r\n\r\nBeta\r\n");
        assert_eq!(names(&catalog), ["Alpha", "Beta"]);
    }

    #[test]
    fn parse_strips_every_trailing_carriage_return() {
        let catalog = Catalog::parse("A\r\nA\nB\r\r\n\r\nC\rD\n\r\r\n");
        assert_eq!(names(&catalog), ["A", "A", "B", "C\rD"]);
    }

    #[test]
    fn parse_keeps_names_verbatim() {
        let catalog = Catalog::parse("Die Hard 2.mp4\n  padded  \nA&B?.mkv\n");
        assert_eq!(names(&catalog), ["Die Hard 2.mp4", "  padded  ", "A&B?.mkv"]);
    }

    #[test]
    fn parse_empty_body() {
        assert!(Catalog::parse("").is_empty());
        assert!(Catalog::parse("\n\n  \n").is_empty());
    }

    #[test]
    fn resolve_positions_and_names() {
        let catalog = Catalog::parse("Alpha\nBeta\n1917\n");

        assert_eq!(catalog.resolve("1").unwrap().as_str(), "Alpha");
        assert_eq!(catalog.resolve(" 2 ").unwrap().as_str(), "Beta");
        assert_eq!(catalog.resolve("Beta").unwrap().as_str(), "Beta");
        assert_eq!(catalog.resolve("1917").unwrap().as_str(), "1917");
        assert_eq!(catalog.resolve("0").unwrap().as_str(), "0");
        assert_eq!(catalog.resolve("Unknown").unwrap().as_str(), "Unknown");
        assert_eq!(catalog.resolve("   "), None);
    }

    #[test]
    fn contains_matches_exact_names() {
        let catalog = Catalog::parse("Alpha\nBeta\n");
        assert!(catalog.contains("Alpha"));
        assert!(!catalog.contains("alpha"));
        assert!(!catalog.contains("Gamma"));
    }
}
