use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::{DEFAULT_CATALOG_URL, DEFAULT_PAGE_SIZE, DEFAULT_VOICE_LOCALE};

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_PAGE_SIZE: usize = 100;
pub const MAX_LOCALE_LENGTH: usize = 35;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum UrlError {
    #[error("invalid URL '{url}': {reason}")]
    Invalid { url: String, reason: String },

    #[error("credentials in URL are not allowed")]
    Credentials,
}

/// Crosses the FFI boundary as a plain string and is re-validated on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidatedUrl {
    url: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, UrlError> {
        let url = url.into();
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(UrlError::Invalid {
                url,
                reason: "URL cannot be empty".to_string(),
            });
        }

        if trimmed.len() > MAX_URL_LENGTH {
            return Err(UrlError::Invalid {
                url: Self::truncate_url(trimmed),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        let parsed = Url::parse(trimmed).map_err(|e| UrlError::Invalid {
            url: Self::truncate_url(trimmed),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(UrlError::Invalid {
                url: Self::truncate_url(trimmed),
                reason: format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            });
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| UrlError::Invalid {
                url: Self::truncate_url(trimmed),
                reason: "URL must have a host".to_string(),
            })?
            .to_lowercase();

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(UrlError::Credentials);
        }

        Ok(Self {
            url: parsed.to_string(),
            host,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Appends `page` and `pageSize` to the query, keeping any existing pairs.
    pub fn with_page(&self, page: u32, page_size: usize) -> String {
        match Url::parse(&self.url) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("page", &page.to_string())
                    .append_pair("pageSize", &page_size.to_string());
                url.to_string()
            }
            // Unreachable for a validated URL; fall back to plain concatenation.
            Err(_) => format!("{}?page={page}&pageSize={page_size}", self.url),
        }
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
            format!("{}...", &url[..cut])
        }
    }
}

impl TryFrom<String> for ValidatedUrl {
    type Error = UrlError;

    fn try_from(url: String) -> Result<Self, Self::Error> {
        Self::new(url)
    }
}

impl From<ValidatedUrl> for String {
    fn from(url: ValidatedUrl) -> Self {
        url.url
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: ValidatedUrl,
    pub page_size: usize,
    pub locale: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: ValidatedUrl {
                url: DEFAULT_CATALOG_URL.to_string(),
                host: "thronesapi.com".to_string(),
            },
            page_size: DEFAULT_PAGE_SIZE,
            locale: DEFAULT_VOICE_LOCALE.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, UrlError> {
        Ok(Self {
            base_url: ValidatedUrl::new(base_url)?,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Clamps values a shell may have sent unchecked.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        let locale = self.locale.trim();
        if locale.is_empty() || locale.len() > MAX_LOCALE_LENGTH {
            self.locale = DEFAULT_VOICE_LOCALE.to_string();
        } else {
            self.locale = locale.to_string();
        }
        self
    }

    pub fn page_url(&self, request: &PageRequest) -> String {
        self.base_url.with_page(request.page, request.page_size)
    }

    pub fn full_url(&self) -> &str {
        self.base_url.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One paged fetch against the catalog provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub id: RequestId,
    pub page: u32,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: u32, page_size: usize) -> Self {
        Self {
            id: RequestId::generate(),
            page,
            page_size,
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("HTTP error {status}")]
    Status { status: u16 },

    #[error("response had no body")]
    MissingBody,

    #[error("response body could not be decoded: {message}")]
    Decode { message: String },
}

/// Flattens a raw `crux_http` response into the fetch contract's result.
///
/// The status is checked before the body is decoded, so a non-2xx answer
/// always surfaces as `Status` whatever its body holds.
pub fn into_fetch_result<T: DeserializeOwned>(
    result: crux_http::Result<crux_http::Response<Vec<u8>>>,
) -> Result<T, FetchError> {
    match result {
        Ok(mut response) => {
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: u16::from(status),
                });
            }
            if response.body().is_none() {
                return Err(FetchError::MissingBody);
            }
            response
                .body_json::<T>()
                .map_err(|e| FetchError::Decode {
                    message: e.to_string(),
                })
        }
        Err(crux_http::Error::Http(e)) => Err(FetchError::Status {
            status: u16::from(e.code),
        }),
        Err(e) => Err(FetchError::Transport {
            message: e.to_string(),
        }),
    }
}
