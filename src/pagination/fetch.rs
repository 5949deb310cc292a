//! The paginated GET loop
//!
//! Pages are fetched strictly one after another: page N+1 is requested only
//! after every callback for page N has returned.

use super::types::{append_query, next_cursor, result_items, PageSource, Visit};
use crate::error::{Error, Result};
use crate::types::QueryParams;
use serde_json::Value;
use tracing::debug;

/// Visit every page reachable from `path`, one callback per page
pub async fn each<S, F>(
    source: &S,
    path: &str,
    query: Option<&QueryParams>,
    mut visit: F,
) -> Result<()>
where
    S: PageSource + ?Sized,
    F: FnMut(Value) -> Visit,
{
    let empty = QueryParams::new();
    let query = query.unwrap_or(&empty);
    let mut path = path.to_string();
    let mut page_number = 0usize;

    loop {
        page_number += 1;
        let url = append_query(&path, query);
        debug!("Fetching page {}: {}", page_number, url);

        let page = source.get_page(&url).await?;
        let next = next_cursor(&page).map(String::from);

        if visit(page).is_stop() {
            debug!("Pagination stopped after page {}", page_number);
            return Ok(());
        }

        match next {
            Some(next) => path = next,
            None => break,
        }
    }

    debug!("Pagination finished after {} page(s)", page_number);
    Ok(())
}

/// Visit every item of the `attribute` sequence on every page.
///
/// Runs the same loop as [`each`]. A page without the attribute stops the
/// walk before the next page is requested and the error is returned.
pub async fn every<S, F>(
    source: &S,
    path: &str,
    attribute: &str,
    query: Option<&QueryParams>,
    mut visit: F,
) -> Result<()>
where
    S: PageSource + ?Sized,
    F: FnMut(Value) -> Visit,
{
    let mut failure: Option<Error> = None;

    each(source, path, query, |page| {
        let items = match result_items(&page, attribute) {
            Ok(items) => items,
            Err(e) => {
                failure = Some(e);
                return Visit::Stop;
            }
        };
        for item in items {
            if visit(item.clone()).is_stop() {
                return Visit::Stop;
            }
        }
        Visit::Continue
    })
    .await?;

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Collect every item of the `attribute` sequence across all pages
pub async fn all<S>(
    source: &S,
    path: &str,
    attribute: &str,
    query: Option<&QueryParams>,
) -> Result<Vec<Value>>
where
    S: PageSource + ?Sized,
{
    let mut items = Vec::new();
    every(source, path, attribute, query, |item| {
        items.push(item);
        Visit::Continue
    })
    .await?;
    Ok(items)
}
