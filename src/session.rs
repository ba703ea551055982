//! Catalog and playback session.
//!
//! A [`Session`] is the single owner of the catalog snapshot and the current
//! selection. It moves through these states:
//!
//! ```text
//! Idle --initialize--> Loaded(catalog) --select--> Selected(item, catalog)
//!     \                                          /      |        ^
//!      `-----------> LoadFailed ----select------'       `-select-'
//! ```
//!
//! There is no way back to `Idle`: a new session starts over.
//!
//! The catalog is loaded exactly once. A failed load is not retried; the
//! session carries on with an empty catalog and the failure is logged.
//! Selections are accepted as given, even for items that are not in the
//! catalog, and each one hands a freshly derived stream URL to the playback
//! surface.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    catalog::{Catalog, CatalogUnavailable, Source},
    events::{Event, Notification},
    item::ItemId,
    player::{PlaybackOptions, Surface},
    stream::Endpoint,
    view::ViewState,
};

/// Messages from the rendering layer.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// The user picked an item.
    Select(ItemId),
}

/// Position of a session in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState<'a> {
    Idle,
    Loaded(&'a Catalog),
    LoadFailed,
    Selected(&'a ItemId, &'a Catalog),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Load {
    Pending,
    Done,
    Failed,
}

pub struct Session<S, P> {
    source: S,
    surface: P,
    endpoint: Endpoint,
    options: PlaybackOptions,

    catalog: Catalog,
    selection: Option<ItemId>,
    load: Load,

    event_tx: Option<mpsc::UnboundedSender<Notification>>,
}

impl<S, P> Session<S, P>
where
    S: Source,
    P: Surface,
{
    #[must_use]
    pub fn new(source: S, surface: P, endpoint: Endpoint) -> Self {
        Self {
            source,
            surface,
            endpoint,
            options: PlaybackOptions::default(),

            catalog: Catalog::default(),
            selection: None,
            load: Load::Pending,

            event_tx: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PlaybackOptions) -> Self {
        self.options = options;
        self
    }

    /// Sends a notification to `event_tx` after every state change.
    #[must_use]
    pub fn with_events(mut self, event_tx: mpsc::UnboundedSender<Notification>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Loads the catalog.
    ///
    /// Only the first call per session does anything. A load failure leaves
    /// the catalog empty and is not reported to the caller.
    pub async fn initialize(&mut self) {
        if !self.should_load() {
            return;
        }

        let result = self.source.load().await;
        self.apply_load(result);
    }

    /// Selects `item` and hands its stream URL to the playback surface.
    ///
    /// Returns the derived stream URL. Selecting the current item again
    /// restarts playback but leaves the view unchanged.
    pub fn select(&mut self, item: ItemId) -> Url {
        if self.load == Load::Done && !self.catalog.contains(&item) {
            warn!("{item} is not in the catalog; trying anyway");
        }

        let url = self.endpoint.stream_url(&item);
        debug!("selected {item}");

        self.selection = Some(item.clone());
        self.emit(Event::SelectionChanged(item));

        match self.surface.play(&url, self.options) {
            Ok(()) => {
                info!("playing {url}");
                self.emit(Event::PlaybackStarted(url.clone()));
            }
            Err(e) => error!("{e}"),
        }

        url
    }

    /// Runs the session until `commands` closes or `shutdown` is cancelled.
    ///
    /// The catalog is loaded first. If `shutdown` is cancelled while the load
    /// is in flight, the load is abandoned and its outcome never applied.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<Command>,
        shutdown: CancellationToken,
    ) {
        if self.should_load() {
            let result = tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    debug!("session ended while loading catalog");
                    return;
                }

                result = self.source.load() => result,
            };
            self.apply_load(result);
        }

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => break,

                command = commands.recv() => match command {
                    Some(Command::Select(item)) => {
                        self.select(item);
                    }
                    None => break,
                },
            }
        }

        debug!("session ended");
    }

    /// Ends the session and stops playback.
    pub fn end(mut self) {
        self.surface.stop();
    }

    #[must_use]
    pub fn view(&self) -> ViewState {
        ViewState::project(
            &self.catalog,
            self.selection.as_ref(),
            &self.endpoint,
            self.load == Load::Failed,
        )
    }

    #[must_use]
    pub fn state(&self) -> SessionState<'_> {
        match (&self.selection, self.load) {
            (Some(item), _) => SessionState::Selected(item, &self.catalog),
            (None, Load::Pending) => SessionState::Idle,
            (None, Load::Done) => SessionState::Loaded(&self.catalog),
            (None, Load::Failed) => SessionState::LoadFailed,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn selection(&self) -> Option<&ItemId> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn surface(&self) -> &P {
        &self.surface
    }

    fn should_load(&self) -> bool {
        if self.load == Load::Pending {
            true
        } else {
            warn!("catalog is loaded once per session");
            false
        }
    }

    fn apply_load(&mut self, result: Result<Catalog, CatalogUnavailable>) {
        match result {
            Ok(catalog) => {
                info!("catalog loaded with {} items", catalog.len());
                self.catalog = catalog;
                self.load = Load::Done;
                self.emit(Event::CatalogLoaded {
                    items: self.catalog.len(),
                });
            }
            Err(e) => {
                error!("{e}");
                self.catalog = Catalog::default();
                self.load = Load::Failed;
                self.emit(Event::CatalogUnavailable);
            }
        }
    }

    fn emit(&self, event: Event) {
        if let Some(event_tx) = &self.event_tx {
            let notification = Notification {
                event,
                view: self.view(),
            };
            if event_tx.send(notification).is_err() {
                trace!("event receiver dropped");
            }
        }
    }
}
