//! What the rendering layer gets to see of a session.

use std::fmt;

use url::Url;

use crate::{catalog::Catalog, item::ItemId, stream::Endpoint};

/// Projection of a session for display.
///
/// A view is never stored by the session; it is recomputed from the catalog,
/// the selection and the load outcome whenever it is asked for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Items to list, in catalog order.
    pub items: Catalog,

    /// Currently selected item, if any.
    pub selected: Option<ItemId>,

    /// Where to stream `selected` from. Set if and only if `selected` is.
    pub stream_url: Option<Url>,

    /// Whether the catalog failed to load.
    pub catalog_unavailable: bool,
}

impl ViewState {
    #[must_use]
    pub fn project(
        catalog: &Catalog,
        selection: Option<&ItemId>,
        endpoint: &Endpoint,
        catalog_unavailable: bool,
    ) -> Self {
        Self {
            items: catalog.clone(),
            selected: selection.cloned(),
            stream_url: selection.map(|item| endpoint.stream_url(item)),
            catalog_unavailable,
        }
    }

    /// The playback section: selected item and its stream URL.
    #[must_use]
    pub fn now_playing(&self) -> Option<(&ItemId, &Url)> {
        self.selected.as_ref().zip(self.stream_url.as_ref())
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "My Movie Collection")?;
        writeln!(f)?;
        writeln!(f, "Available Movies")?;

        if self.catalog_unavailable {
            writeln!(f, "  (catalog unavailable)")?;
        }

        let width = self.items.len().to_string().len();
        for (index, item) in self.items.iter().enumerate() {
            let marker = if self.selected.as_ref() == Some(item) {
                '>'
            } else {
                ' '
            };
            writeln!(f, "{marker} {:>width$}. {item}", index + 1)?;
        }

        if let Some((item, url)) = self.now_playing() {
            writeln!(f)?;
            writeln!(f, "Now Playing: {item}")?;
            writeln!(f, "  {url}")?;
        }

        Ok(())
    }
}
