mod http;
mod speech;

pub use self::http::{
    into_fetch_result, CatalogConfig, FetchError, PageRequest, RequestId, UrlError, ValidatedUrl,
    MAX_PAGE_SIZE, MAX_URL_LENGTH,
};
pub use self::speech::{SpeechOperation, SpeechSignal, Voice, VoiceError};

// Crux's built-in Render covers view updates; no custom wrapper.
pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub voice: Voice<Event>,
}
