//! Pagination module
//!
//! Follows the `next` cursor embedded in decoded JSON pages.
//!
//! # Overview
//!
//! Every page is a GET through a [`PageSource`]. The decoded page's `next`
//! field, when present and non-empty, becomes the path of the following
//! request. Query parameters are re-applied to every request in sorted
//! name order, so identical maps always yield identical URLs.
//!
//! Callbacks return [`Visit`] to continue or stop early.

mod fetch;
mod types;

pub use fetch::{all, each, every};
pub use types::{
    append_query, encode_query, next_cursor, result_items, PageSource, Visit, NEXT_FIELD,
};
