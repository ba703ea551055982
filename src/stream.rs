//! Stream URL derivation.
//!
//! The stream service takes the item to play as a single query parameter.
//! Identifiers are arbitrary file names, so they are encoded as one
//! `application/x-www-form-urlencoded` value: spaces become `+` and every
//! reserved character (`&`, `?`, `/`, `#`, `=`, `+`, `%`, ...) becomes a
//! `%XX` escape. The base endpoint itself is never re-encoded.

use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    item::ItemId,
};

/// Stream service endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    param: String,
}

impl Endpoint {
    /// Creates an endpoint from a base URL and the name of the query
    /// parameter carrying the identifier.
    ///
    /// Any fragment on `base` is dropped. Existing query pairs are kept,
    /// except those named `param`: the derived URL carries exactly one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `base` is not an HTTP(S) URL or `param`
    /// is empty.
    pub fn new(mut base: Url, param: impl Into<String>) -> Result<Self> {
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::invalid_argument(format!(
                "stream endpoint must be http(s), not {}",
                base.scheme()
            )));
        }

        let param = param.into();
        if param.is_empty() {
            return Err(Error::invalid_argument("stream parameter name is empty"));
        }

        base.set_fragment(None);
        if base.query_pairs().any(|(key, _)| key == param.as_str()) {
            warn!("dropping {param} from stream endpoint {base}");
            let kept: Vec<(String, String)> = base
                .query_pairs()
                .filter(|(key, _)| key != param.as_str())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            if kept.is_empty() {
                base.set_query(None);
            } else {
                base.query_pairs_mut().clear().extend_pairs(kept);
            }
        }

        Ok(Self { base, param })
    }

    /// # Errors
    ///
    /// See [`Endpoint::new`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.stream_url.clone(), config.stream_param.as_str())
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Derives the URL that streams `item`.
    #[must_use]
    pub fn stream_url(&self, item: &ItemId) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair(&self.param, item.as_str());
        url
    }

    /// Recovers the identifier from a URL produced by [`Endpoint::stream_url`].
    ///
    /// Returns the first value of the identifier parameter, decoded, which
    /// is the one the stream service reads.
    #[must_use]
    pub fn item_from(&self, url: &Url) -> Option<String> {
        url.query_pairs()
            .find(|(key, _)| *key == self.param)
            .map(|(_, value)| value.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn endpoint() -> Endpoint {
        Endpoint::from_config(&Config::default()).unwrap()
    }

    fn item(name: &str) -> ItemId {
        ItemId::new(name).unwrap()
    }

    #[test]
    fn encodes_spaces_as_plus() {
        let url = endpoint().stream_url(&item("Die Hard 2"));
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/stream?name=Die+Hard+2"
        );
        assert_eq!(endpoint().item_from(&url).as_deref(), Some("Die Hard 2"));
    }

    #[test]
    fn reserved_characters_stay_inside_the_value() {
        let endpoint = endpoint();
        for name in [
            "Tom & Jerry.mp4",
            "What?.mkv",
            "season 1/episode 2.mp4",
            "#1 Hit.mp4",
            "a=b+c%20d.avi",
        ] {
            let url = endpoint.stream_url(&item(name));
            let query = url.query().unwrap();
            let value = query.strip_prefix("name=").unwrap();

            assert!(!value.contains(['&', '?', '/', '#', '=', ' ']), "{value}");
            assert_eq!(url.fragment(), None);
            assert_eq!(url.path(), "/api/stream");
            assert_eq!(endpoint.item_from(&url).as_deref(), Some(name));
        }
    }

    #[test]
    fn literal_plus_is_escaped() {
        let url = endpoint().stream_url(&item("C++ Talk"));
        assert_eq!(url.query(), Some("name=C%2B%2B+Talk"));
    }

    #[test]
    fn non_ascii_round_trips() {
        let endpoint = endpoint();
        let url = endpoint.stream_url(&item("Amélie (2001).mp4"));
        assert!(url.as_str().is_ascii());
        assert_eq!(endpoint.item_from(&url).as_deref(), Some("Amélie (2001).mp4"));
    }

    #[test]
    fn base_query_is_preserved() {
        let base = Url::parse("https://media.lan/stream?quality=hd#player").unwrap();
        let endpoint = Endpoint::new(base, "file").unwrap();
        let url = endpoint.stream_url(&item("A B"));
        assert_eq!(url.as_str(), "https://media.lan/stream?quality=hd&file=A+B");
    }

    #[test]
    fn configured_parameter_is_replaced() {
        let base = Url::parse("http://h/s?name=old").unwrap();
        let endpoint = Endpoint::new(base, "name").unwrap();
        assert_eq!(endpoint.base().as_str(), "http://h/s");

        let url = endpoint.stream_url(&item("new"));
        assert_eq!(url.as_str(), "http://h/s?name=new");
        assert_eq!(endpoint.item_from(&url).as_deref(), Some("new"));
    }

    #[test]
    fn configured_parameter_is_replaced_among_others() {
        let base = Url::parse("http://h/s?name=&quality=hd&name=x").unwrap();
        let endpoint = Endpoint::new(base, "name").unwrap();

        let url = endpoint.stream_url(&item("Die Hard 2"));
        assert_eq!(url.query(), Some("quality=hd&name=Die+Hard+2"));
    }

    #[test]
    fn item_from_reads_first_value() {
        let endpoint = endpoint();
        let url = Url::parse("http://localhost:8080/api/stream?name=old&name=new").unwrap();
        assert_eq!(endpoint.item_from(&url).as_deref(), Some("old"));
    }

    #[test]
    fn derivation_is_pure() {
        let endpoint = endpoint();
        let first = endpoint.stream_url(&item("Alpha"));
        let second = endpoint.stream_url(&item("Alpha"));
        assert_eq!(first, second);
        assert_eq!(endpoint.base().query(), None);
    }

    #[test]
    fn rejects_non_http_endpoints() {
        let base = Url::parse("file:///srv/movies").unwrap();
        let err = Endpoint::new(base, "name").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn rejects_empty_parameter() {
        let base = Url::parse("http://localhost/stream").unwrap();
        let err = Endpoint::new(base, "").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
