use serde::{Deserialize, Serialize};

use crate::model::{CatalogScreen, Item, Model, Navigation};
use crate::{CatalogError, MSG_SEARCH_FETCH_FAILED};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ItemCard {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    pub caption: String,
}

impl From<&Item> for ItemCard {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.display_name.clone(),
            image_url: item.image_ref.clone(),
            caption: item.caption(),
        }
    }
}

fn cards(items: &[Item]) -> Vec<ItemCard> {
    items.iter().map(ItemCard::from).collect()
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedView {
    pub items: Vec<ItemCard>,
    pub show_full_screen_loader: bool,
    pub show_footer_spinner: bool,
    pub has_more: bool,
    pub error_message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchView {
    pub query_input: String,
    pub can_search: bool,
    pub is_searching: bool,
    pub message: Option<String>,
    pub results: Option<Vec<ItemCard>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VoiceView {
    pub is_listening: bool,
    pub partial_transcript: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum NavigationView {
    SearchResults { items: Vec<ItemCard> },
    Profile { email: String, items: Vec<ItemCard> },
}

impl From<&Navigation> for NavigationView {
    fn from(navigation: &Navigation) -> Self {
        match navigation {
            Navigation::SearchResults(items) => Self::SearchResults {
                items: cards(items),
            },
            Navigation::Profile(payload) => Self::Profile {
                email: payload.email.to_string(),
                items: cards(&payload.items),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub screen_open: bool,
    pub feed: FeedView,
    pub search: SearchView,
    pub voice: VoiceView,
    pub navigation: Option<NavigationView>,
}

impl ViewModel {
    pub fn build(model: &Model) -> Self {
        let navigation = model.navigation.as_ref().map(NavigationView::from);
        match &model.screen {
            Some(screen) => Self {
                screen_open: true,
                feed: feed_view(screen),
                search: search_view(screen),
                voice: voice_view(screen),
                navigation,
            },
            None => Self {
                navigation,
                ..Self::default()
            },
        }
    }
}

fn feed_view(screen: &CatalogScreen) -> FeedView {
    let feed = &screen.feed;
    FeedView {
        items: cards(feed.items()),
        show_full_screen_loader: feed.is_loading_initial(),
        show_footer_spinner: feed.is_loading_more(),
        has_more: feed.has_more(),
        error_message: feed.error().map(CatalogError::user_facing_message),
    }
}

fn search_view(screen: &CatalogScreen) -> SearchView {
    let search = &screen.search;
    let state = search.state();
    SearchView {
        query_input: screen.query_input.clone(),
        can_search: !screen.query_input.trim().is_empty(),
        is_searching: search.is_searching(),
        message: state.and_then(|s| s.error.as_ref()).map(search_message),
        results: state.and_then(|s| s.results.as_deref()).map(cards),
    }
}

fn search_message(error: &CatalogError) -> String {
    match error {
        CatalogError::Fetch(_) => MSG_SEARCH_FETCH_FAILED.to_string(),
        other => other.user_facing_message(),
    }
}

fn voice_view(screen: &CatalogScreen) -> VoiceView {
    let voice = &screen.voice;
    VoiceView {
        is_listening: voice.is_listening(),
        partial_transcript: voice.partial_transcript().map(str::to_string),
        error_message: voice.last_error().map(CatalogError::user_facing_message),
    }
}
