//! Pagination types and traits
//!
//! Defines the cursor accessors, query encoding and the page source seam
//! used by the fetch loop.

use crate::error::{Error, Result};
use crate::types::QueryParams;
use async_trait::async_trait;
use serde_json::Value;
use url::form_urlencoded;

/// Name of the cursor field in decoded pages
pub const NEXT_FIELD: &str = "next";

/// What a visit callback wants the loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visit {
    /// Keep going
    #[default]
    Continue,
    /// Stop paginating; the fetch returns `Ok(())`
    Stop,
}

impl Visit {
    /// Check if this is a stop signal
    pub fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Something that can GET one decoded page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch and decode the page at `path`
    async fn get_page(&self, path: &str) -> Result<Value>;
}

/// Extract the continuation path from a decoded page.
///
/// Missing, non-string and empty `next` fields all mean "no more pages".
pub fn next_cursor(page: &Value) -> Option<&str> {
    page.get(NEXT_FIELD)
        .and_then(Value::as_str)
        .filter(|next| !next.is_empty())
}

/// Borrow the items under `attribute` of a decoded page
pub fn result_items<'a>(page: &'a Value, attribute: &str) -> Result<&'a [Value]> {
    let value = page
        .get(attribute)
        .ok_or_else(|| Error::missing_attribute(attribute))?;
    value.as_array().map(Vec::as_slice).ok_or_else(|| {
        Error::protocol(format!("attribute '{attribute}' is not a sequence"))
    })
}

/// URL-encode query parameters in name order
pub fn encode_query(params: &QueryParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Append encoded parameters to a path, reusing an existing query string
pub fn append_query(path: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let query = encode_query(params);
    if path.ends_with('?') || path.ends_with('&') {
        return format!("{path}{query}");
    }
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{query}")
}
