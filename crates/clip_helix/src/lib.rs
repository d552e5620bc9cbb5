//! # Helix Module
//!
//! This crate talks to the Twitch Helix REST API on behalf of the clip pipeline:
//! it exchanges application credentials for a bearer token, resolves channel
//! logins to broadcaster ids, and retrieves clip metadata either as a
//! time-windowed, cursor-paginated stream or as a single "top clips" page.
//!
//! The two capabilities are exposed as traits ([`TokenIssuer`], [`ClipSource`])
//! so callers can substitute their own implementations; [`HelixClient`] is the
//! `reqwest` backed one.

mod api;
mod domain;
mod error;
mod pagination;

pub use api::client::HelixClient;
pub use api::{ClipSource, TokenIssuer};
pub use domain::{AccessToken, BroadcasterId, ClipRecord, Credentials};
pub use error::{AuthError, MetadataError};
pub use pagination::{paginate, Page, Pagination};
