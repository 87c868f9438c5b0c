use url::Url;

use crate::fetch::{map_reqwest_error, read_body_capped, FetchSettings};
use crate::{FailureKind, ListingEntry, StageError};

/// Downloads and parses the remote photo listing: a JSON object mapping
/// display names to source URLs. The body is read under the same size
/// cap as photo downloads.
pub async fn fetch_listing(
    settings: &FetchSettings,
    url: &str,
) -> Result<Vec<ListingEntry>, StageError> {
    let parsed = Url::parse(url)
        .map_err(|err| StageError::new(FailureKind::InvalidUrl, err.to_string()))?;
    let client = reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
        .build()
        .map_err(|err| StageError::new(FailureKind::Network, err.to_string()))?;

    let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(StageError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }

    let body = read_body_capped(response, settings.max_bytes).await?;
    let body = String::from_utf8(body)
        .map_err(|err| StageError::new(FailureKind::Parse, err.to_string()))?;
    parse_listing(&body)
}

/// Entries come back in the JSON object's iteration order, which is
/// sorted by name. Values that are not strings become empty URLs and are
/// weeded out by the caller's validation.
pub fn parse_listing(body: &str) -> Result<Vec<ListingEntry>, StageError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|err| StageError::new(FailureKind::Parse, err.to_string()))?;
    let serde_json::Value::Object(map) = value else {
        return Err(StageError::new(
            FailureKind::Parse,
            "expected a top-level object",
        ));
    };

    let mut entries = Vec::with_capacity(map.len());
    for (name, value) in map {
        let url = value.as_str().unwrap_or_default().to_string();
        entries.push(ListingEntry { name, url });
    }
    Ok(entries)
}
