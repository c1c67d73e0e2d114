#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod capabilities;
pub mod event;
pub mod feed;
pub mod model;
pub mod search;
pub mod view;
pub mod voice;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app::App;
pub use capabilities::{Capabilities, CatalogConfig, Effect, FetchError, SpeechSignal, VoiceError};
pub use event::Event;
pub use model::{Item, Model, Navigation, ProfilePayload};
pub use view::ViewModel;

pub const DEFAULT_CATALOG_URL: &str = "https://thronesapi.com/api/v2/characters";
pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const DEFAULT_VOICE_LOCALE: &str = "en-US";

pub const MSG_EMPTY_QUERY: &str = "Search input cannot be empty";
pub const MSG_FEED_FETCH_FAILED: &str = "Failed to load characters";
pub const MSG_SEARCH_FETCH_FAILED: &str = "Failed to load search results";
pub const MSG_NO_RESULTS: &str = "No results found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Network,
    NoResults,
    VoiceEngine,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Network => "FETCH_ERROR",
            Self::NoResults => "NO_RESULTS",
            Self::VoiceEngine => "VOICE_ENGINE_ERROR",
        }
    }

    /// Expected outcomes are shown inline and not logged as failures.
    #[must_use]
    pub const fn is_expected(self) -> bool {
        matches!(self, Self::Validation | Self::NoResults)
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CatalogError {
    #[error("search query is empty")]
    Validation,

    #[error("fetch failed: {0}")]
    Fetch(FetchError),

    #[error("no items match {query:?}")]
    NoResults { query: String },

    #[error("voice recognition failed to start: {0}")]
    VoiceStart(VoiceError),

    #[error("voice recognition failed: {0}")]
    VoiceEngine(VoiceError),
}

impl CatalogError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation => ErrorKind::Validation,
            Self::Fetch(_) => ErrorKind::Network,
            Self::NoResults { .. } => ErrorKind::NoResults,
            Self::VoiceStart(_) | Self::VoiceEngine(_) => ErrorKind::VoiceEngine,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind().code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self {
            Self::Validation => MSG_EMPTY_QUERY.into(),
            Self::Fetch(_) => MSG_FEED_FETCH_FAILED.into(),
            Self::NoResults { .. } => MSG_NO_RESULTS.into(),
            Self::VoiceStart(e) => format!("Failed to start voice recognition: {}", e.message),
            Self::VoiceEngine(e) => format!("Voice recognition error: {}", e.message),
        }
    }
}

impl From<FetchError> for CatalogError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<VoiceError> for CatalogError {
    fn from(e: VoiceError) -> Self {
        Self::VoiceEngine(e)
    }
}

pub mod app {
    use tracing::{debug, info, warn};

    use crate::capabilities::{into_fetch_result, Capabilities, CatalogConfig, PageRequest};
    use crate::event::Event;
    use crate::feed::FeedOutcome;
    use crate::model::{CatalogScreen, Item, Model, Navigation, UserEmail};
    use crate::search::{SearchOutcome, SearchRequest};
    use crate::view::ViewModel;
    use crate::voice::VoiceTransition;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn fetch_page(request: &PageRequest, config: &CatalogConfig, caps: &Capabilities) {
            let request_id = request.id.clone();
            caps.http
                .get(config.page_url(request))
                .header("Accept", "application/json")
                .send(move |result| Event::PageFetched {
                    request_id,
                    result: into_fetch_result::<Vec<Item>>(result),
                });
        }

        fn fetch_catalog(request: SearchRequest, config: &CatalogConfig, caps: &Capabilities) {
            caps.http
                .get(config.full_url())
                .header("Accept", "application/json")
                .send(move |result| Event::CatalogFetched {
                    request,
                    result: into_fetch_result::<Vec<Item>>(result),
                });
        }

        fn release_voice(screen: &mut CatalogScreen, caps: &Capabilities) {
            if screen.voice.dispose() {
                caps.voice.destroy();
            }
        }

        /// Handles an event for the mounted screen. Returns whether the view changed.
        fn update_screen(
            event: Event,
            screen: &mut CatalogScreen,
            navigation: &mut Option<Navigation>,
            config: &CatalogConfig,
            caps: &Capabilities,
        ) -> bool {
            match event {
                Event::LoadNextRequested => match screen.feed.load_next() {
                    Some(request) => {
                        Self::fetch_page(&request, config, caps);
                        true
                    }
                    None => false,
                },

                Event::PageFetched { request_id, result } => {
                    !matches!(
                        screen.feed.apply(&request_id, result),
                        FeedOutcome::Stale
                    )
                }

                Event::QueryChanged { text } => {
                    if text.trim().is_empty() {
                        screen.search.clear_error();
                    }
                    screen.query_input = text;
                    true
                }

                Event::SearchSubmitted => {
                    let query = screen.query_input.clone();
                    match screen.search.search(&query) {
                        Ok(request) => Self::fetch_catalog(request, config, caps),
                        Err(e) => debug!(code = e.code(), "search: not started"),
                    }
                    true
                }

                Event::CatalogFetched { request, result } => {
                    match screen.search.complete(&request, result) {
                        SearchOutcome::Matched(items) => {
                            *navigation = Some(Navigation::SearchResults(items));
                            true
                        }
                        SearchOutcome::Failed(_) => true,
                        SearchOutcome::Stale => false,
                    }
                }

                Event::SearchDismissed => {
                    screen.search.dismiss();
                    true
                }

                Event::VoiceStartRequested => match screen.voice.start(&config.locale) {
                    Ok(session) => {
                        caps.voice.start(config.locale.clone(), move |signal| {
                            Event::VoiceSignal { session, signal }
                        });
                        true
                    }
                    Err(e) => {
                        debug!(error = %e, "voice: start ignored");
                        false
                    }
                },

                Event::VoiceStopRequested => {
                    if screen.voice.stop().is_some() {
                        caps.voice.stop();
                        true
                    } else {
                        false
                    }
                }

                Event::VoiceSignal { session, signal } => {
                    match screen.voice.handle(session, signal) {
                        VoiceTransition::Transcript(text) => {
                            screen.search.clear_error();
                            screen.query_input = text;
                            true
                        }
                        VoiceTransition::Ignored => false,
                        VoiceTransition::Started
                        | VoiceTransition::Partial
                        | VoiceTransition::Ended
                        | VoiceTransition::ErrorReported(_) => true,
                    }
                }

                Event::ProfileRequested => {
                    *navigation = Some(Navigation::Profile(screen.profile_payload()));
                    true
                }

                Event::ScreenOpened { .. }
                | Event::ScreenClosed
                | Event::CatalogConfigured(_)
                | Event::NavigationHandled => false,
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(
                event = event.name(),
                user_initiated = event.is_user_initiated(),
                "update"
            );

            let changed = match event {
                Event::ScreenOpened { email } => {
                    if let Some(mut previous) = model.screen.take() {
                        warn!("screen: opened while already mounted, replacing");
                        Self::release_voice(&mut previous, caps);
                    }

                    let mut screen = CatalogScreen::new(UserEmail::new(email), &model.config);
                    if let Some(request) = screen.feed.load_next() {
                        Self::fetch_page(&request, &model.config, caps);
                    }
                    model.screen = Some(screen);
                    model.navigation = None;
                    info!("screen: opened");
                    true
                }

                Event::ScreenClosed => {
                    if let Some(mut screen) = model.screen.take() {
                        Self::release_voice(&mut screen, caps);
                        info!(items = screen.feed.items().len(), "screen: closed");
                    }
                    model.navigation = None;
                    true
                }

                Event::CatalogConfigured(config) => {
                    model.config = (*config).validated();
                    info!(
                        host = model.config.base_url.host(),
                        page_size = model.config.page_size,
                        "catalog: configured"
                    );
                    false
                }

                Event::NavigationHandled => model.navigation.take().is_some(),

                event => match model.screen.as_mut() {
                    Some(screen) => Self::update_screen(
                        event,
                        screen,
                        &mut model.navigation,
                        &model.config,
                        caps,
                    ),
                    None => {
                        debug!(event = event.name(), "no screen mounted, ignoring");
                        false
                    }
                },
            };

            if changed {
                caps.render.render();
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel::build(model)
        }
    }
}
