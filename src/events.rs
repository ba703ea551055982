//! Events emitted by a session to its rendering layer.
//!
//! Every event is delivered as a [`Notification`] together with the
//! [`ViewState`] as it stands right after the change, so a rendering layer
//! never has to reach back into the session.
//!
//! # Example
//!
//! ```rust
//! use reelplay::events::{Event, Notification};
//!
//! fn handle(notification: &Notification) {
//!     match &notification.event {
//!         Event::CatalogLoaded { items } => println!("{items} movies available"),
//!         Event::CatalogUnavailable => println!("catalog unavailable"),
//!         Event::SelectionChanged(item) => println!("selected {item}"),
//!         Event::PlaybackStarted(url) => println!("playing {url}"),
//!     }
//!     print!("{}", notification.view);
//! }
//! ```

use url::Url;

use crate::{item::ItemId, view::ViewState};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// The catalog was loaded.
    ///
    /// Emitted once per session, after a successful fetch.
    CatalogLoaded { items: usize },

    /// The catalog could not be loaded; the session continues with an empty
    /// catalog.
    CatalogUnavailable,

    /// The selection was set.
    ///
    /// Emitted on every selection, including reselection of the current item.
    SelectionChanged(ItemId),

    /// A stream URL was handed to the playback surface.
    PlaybackStarted(Url),
}

/// An event and the view it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub event: Event,
    pub view: ViewState,
}
