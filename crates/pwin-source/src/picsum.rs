#![forbid(unsafe_code)]

//! The picsum.photos listing endpoint.
//!
//! `GET {base}/v2/list?page={n}&limit={size}` returns a JSON array of photos.
//! A non-success status becomes [`FetchErrorKind::Status`]; connection
//! failures become `Transport`; malformed bodies become `Decode`.
//!
//! [`FetchErrorKind::Status`]: pwin_core::FetchErrorKind::Status

use std::time::Duration;

use pwin_core::{FetchError, PageNumber, PageSource, Record};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

/// Public picsum host.
pub const DEFAULT_BASE_URL: &str = "https://picsum.photos";
const LIST_ENDPOINT: &str = "/v2/list";
const USER_AGENT: &str = concat!("pwin/", env!("CARGO_PKG_VERSION"));

/// One entry of the listing response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PicsumPhoto {
    pub id: String,
    pub author: String,
    pub width: u32,
    pub height: u32,
    /// Photo page on unsplash.
    pub url: String,
    /// Direct image URL.
    pub download_url: String,
}

impl From<PicsumPhoto> for Record {
    fn from(photo: PicsumPhoto) -> Self {
        Record::new(photo.id, photo.width, photo.height, photo.download_url)
            .with_author(photo.author)
    }
}

/// Decode a listing response body.
///
/// # Errors
/// [`FetchError::decode`] when the body is not a JSON array of photos or a
/// photo has a zero dimension.
pub fn decode_listing(page: PageNumber, body: &str) -> Result<Vec<Record>, FetchError> {
    let photos: Vec<PicsumPhoto> =
        serde_json::from_str(body).map_err(|e| FetchError::decode(page, e.to_string()))?;
    if let Some(bad) = photos.iter().find(|p| p.width == 0 || p.height == 0) {
        return Err(FetchError::decode(
            page,
            format!("photo {} has size {}x{}", bad.id, bad.width, bad.height),
        ));
    }
    Ok(photos.into_iter().map(Record::from).collect())
}

/// Blocking client for the listing endpoint.
#[derive(Debug, Clone)]
pub struct PicsumSource {
    client: Client,
    base_url: String,
}

impl PicsumSource {
    /// Client for the public host with a 30 second timeout.
    ///
    /// # Errors
    /// Fails if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client for another host serving the same API.
    ///
    /// # Errors
    /// Fails if the TLS backend cannot be initialised.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// URL requested for `page`.
    #[must_use]
    pub fn list_url(&self, page: PageNumber, page_size: usize) -> String {
        format!(
            "{}{LIST_ENDPOINT}?page={page}&limit={page_size}",
            self.base_url
        )
    }
}

impl PageSource for PicsumSource {
    fn fetch_page(&self, page: PageNumber, page_size: usize) -> Result<Vec<Record>, FetchError> {
        let url = self.list_url(page, page_size);
        debug!(%url, "requesting listing");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::transport(page, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(page, status.as_u16()));
        }
        let body = response
            .text()
            .map_err(|e| FetchError::transport(page, e.to_string()))?;
        let records = decode_listing(page, &body)?;
        debug!(page = page.get(), len = records.len(), "listing decoded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwin_core::FetchErrorKind;

    const BODY: &str = r#"[
        {"id":"0","author":"Alejandro Escamilla","width":5000,"height":3333,
         "url":"https://unsplash.com/photos/yC-Yzbqy7PY",
         "download_url":"https://picsum.photos/id/0/5000/3333"},
        {"id":"1","author":"Alejandro Escamilla","width":5000,"height":3333,
         "url":"https://unsplash.com/photos/LNRyGwIJr5c",
         "download_url":"https://picsum.photos/id/1/5000/3333"}
    ]"#;

    fn pn(n: u32) -> PageNumber {
        PageNumber::new(n).unwrap()
    }

    #[test]
    fn decodes_listing() {
        let records = decode_listing(pn(1), BODY).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "0");
        assert_eq!(records[0].author, "Alejandro Escamilla");
        assert_eq!(records[1].source_url, "https://picsum.photos/id/1/5000/3333");
        assert_eq!(records[1].width, 5000);
    }

    #[test]
    fn empty_listing_is_empty_page() {
        assert!(decode_listing(pn(9), "[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let err = decode_listing(pn(3), r#"{"error":"nope"}"#).unwrap_err();
        assert_eq!(err.page, pn(3));
        assert!(matches!(err.kind, FetchErrorKind::Decode(_)));
    }

    #[test]
    fn zero_dimension_is_decode_error() {
        let body = r#"[{"id":"7","author":"A","width":0,"height":300,
                        "url":"u","download_url":"d"}]"#;
        let err = decode_listing(pn(2), body).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Decode("photo 7 has size 0x300".into()));
    }

    #[test]
    fn list_url_has_page_and_limit() {
        let src = PicsumSource::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(
            src.list_url(pn(2), 20),
            "http://localhost:8080/v2/list?page=2&limit=20"
        );
    }

    #[test]
    #[ignore = "needs a closed local port; run manually"]
    fn unreachable_host_is_transport_error() {
        let src = PicsumSource::with_base_url("http://127.0.0.1:9").unwrap();
        let err = src.fetch_page(pn(1), 1).unwrap_err();
        assert!(matches!(err.kind, FetchErrorKind::Transport(_)));
    }
}
