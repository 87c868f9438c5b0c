//! Turning the raw remote listing into photo records.

use std::collections::BTreeMap;

use pipeline_logging::pipeline_warn;
use url::Url;

use crate::record::{PhotoId, PhotoRecord};

/// One raw name/URL pair from the remote listing, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub url: String,
}

impl ListingEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Builds records from listing entries, assigning ids in arrival order
/// starting at `first_id`. Returns the records and the next unused id.
/// Entries with an empty name or an unparseable URL are skipped, never
/// fatal to the rest of the listing.
pub(crate) fn records_from_listing(
    entries: Vec<ListingEntry>,
    first_id: PhotoId,
) -> (BTreeMap<PhotoId, PhotoRecord>, PhotoId) {
    let mut photos = BTreeMap::new();
    let mut next_id = first_id;
    for entry in entries {
        if entry.name.is_empty() {
            pipeline_warn!("listing entry with empty name skipped");
            continue;
        }
        let url = match Url::parse(&entry.url) {
            Ok(url) => url,
            Err(err) => {
                pipeline_warn!("listing entry '{}' has invalid url: {err}", entry.name);
                continue;
            }
        };
        photos.insert(next_id, PhotoRecord::new(next_id, entry.name, url));
        next_id += 1;
    }
    (photos, next_id)
}
