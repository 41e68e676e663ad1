use tracing::debug;

use super::client::{GithubClient, Transport};
use crate::error::{GactError, Result};
use crate::model::{EventKind, QueryParams, RawRecord};

/// Lazy walk over one search endpoint. Yields raw records page by page,
/// following `rel="next"` links until none remains or a page comes back
/// empty. A page fetch error is yielded once and ends the stream;
/// restarting means building a new `Pages` from the first URL.
pub struct Pages<'a, T: Transport> {
    client: &'a GithubClient<T>,
    kind: EventKind,
    next: Option<String>,
    buffer: std::vec::IntoIter<serde_json::Value>,
}

impl<'a, T: Transport> Pages<'a, T> {
    pub fn new(client: &'a GithubClient<T>, kind: EventKind, params: &QueryParams) -> Self {
        Self {
            client,
            kind,
            next: Some(super::search_url(kind, params)),
            buffer: Vec::new().into_iter(),
        }
    }
}

impl<T: Transport> Iterator for Pages<'_, T> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.buffer.next() {
                return Some(Ok(RawRecord {
                    kind: self.kind,
                    value,
                }));
            }
            let url = self.next.take()?;
            match self.client.get(&url) {
                Ok(page) => {
                    let items = match extract_items(page.body) {
                        Ok(items) => items,
                        Err(err) => return Some(Err(err)),
                    };
                    debug!(kind = ?self.kind, count = items.len(), "page fetched");
                    if items.is_empty() {
                        return None;
                    }
                    self.next = page.next;
                    self.buffer = items.into_iter();
                }
                // self.next was taken, so the stream ends after this error
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

fn extract_items(body: serde_json::Value) -> Result<Vec<serde_json::Value>> {
    match body {
        serde_json::Value::Object(mut map) => match map.remove("items") {
            Some(serde_json::Value::Array(items)) => Ok(items),
            _ => Err(GactError::Fetch(
                "search response has no items array".to_string(),
            )),
        },
        _ => Err(GactError::Fetch(
            "search response is not a JSON object".to_string(),
        )),
    }
}
