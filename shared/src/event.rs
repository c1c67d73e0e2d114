use serde::{Deserialize, Serialize};

use crate::capabilities::{CatalogConfig, FetchError, RequestId, SpeechSignal};
use crate::model::Item;
use crate::search::SearchRequest;
use crate::voice::SessionId;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Screen lifecycle
    ScreenOpened {
        email: String,
    },
    ScreenClosed,
    CatalogConfigured(Box<CatalogConfig>),

    // Feed
    LoadNextRequested,

    // Search
    QueryChanged {
        text: String,
    },
    SearchSubmitted,
    SearchDismissed,

    // Voice
    VoiceStartRequested,
    VoiceStopRequested,

    // Navigation
    ProfileRequested,
    NavigationHandled,

    // Capability responses, never sent by the shell
    #[serde(skip)]
    PageFetched {
        request_id: RequestId,
        result: Result<Vec<Item>, FetchError>,
    },
    #[serde(skip)]
    CatalogFetched {
        request: SearchRequest,
        result: Result<Vec<Item>, FetchError>,
    },
    #[serde(skip)]
    VoiceSignal {
        session: SessionId,
        signal: SpeechSignal,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScreenOpened { .. } => "screen_opened",
            Self::ScreenClosed => "screen_closed",
            Self::CatalogConfigured(_) => "catalog_configured",
            Self::LoadNextRequested => "load_next_requested",
            Self::QueryChanged { .. } => "query_changed",
            Self::SearchSubmitted => "search_submitted",
            Self::SearchDismissed => "search_dismissed",
            Self::VoiceStartRequested => "voice_start_requested",
            Self::VoiceStopRequested => "voice_stop_requested",
            Self::ProfileRequested => "profile_requested",
            Self::NavigationHandled => "navigation_handled",
            Self::PageFetched { .. } => "page_fetched",
            Self::CatalogFetched { .. } => "catalog_fetched",
            Self::VoiceSignal { .. } => "voice_signal",
        }
    }

    pub fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::PageFetched { .. } | Self::CatalogFetched { .. } | Self::VoiceSignal { .. }
        )
    }
}
