use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::CatalogConfig;
use crate::feed::FeedController;
use crate::search::SearchController;
use crate::voice::VoiceController;

/// One catalog entry. Identity is `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(rename = "fullName")]
    pub display_name: String,
    #[serde(rename = "imageUrl", default)]
    pub image_ref: String,
}

impl Item {
    pub fn new(id: i64, display_name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            image_ref: image_ref.into(),
        }
    }

    pub fn caption(&self) -> String {
        format!("ID: {}", self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail(pub String);

impl UserEmail {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data the profile screen is opened with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub email: UserEmail,
    pub items: Vec<Item>,
}

/// A navigation the shell should perform, then acknowledge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Navigation {
    SearchResults(Vec<Item>),
    Profile(ProfilePayload),
}

/// Everything owned by one mounted browsing screen.
///
/// Created on `ScreenOpened`, dropped on `ScreenClosed`. Nothing here is
/// shared with another mount.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogScreen {
    pub email: UserEmail,
    pub feed: FeedController,
    pub search: SearchController,
    pub voice: VoiceController,
    pub query_input: String,
}

impl CatalogScreen {
    pub fn new(email: UserEmail, config: &CatalogConfig) -> Self {
        Self {
            email,
            feed: FeedController::new(config.page_size),
            search: SearchController::new(),
            voice: VoiceController::new(),
            query_input: String::new(),
        }
    }

    pub fn profile_payload(&self) -> ProfilePayload {
        ProfilePayload {
            email: self.email.clone(),
            items: self.feed.items().to_vec(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Model {
    pub config: CatalogConfig,
    pub screen: Option<CatalogScreen>,
    pub navigation: Option<Navigation>,
}
