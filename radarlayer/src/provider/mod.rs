//! Remote endpoint abstraction
//!
//! This module provides the HTTP client seam plus the URL builders for the
//! tile servers and the radar metadata API. Everything network-facing in the
//! crate goes through the [`AsyncHttpClient`] trait so tests can inject
//! mock clients.

mod http;
mod metadata;
mod tiles;

pub use http::{AsyncHttpClient, HttpError, ReqwestClient};
pub use metadata::{latest_timestamp, timeline, MetadataError, Timeline};
pub use tiles::{BasemapSource, RadarSource};

#[cfg(test)]
pub use http::tests::MockHttpClient;
