//! Tile byte transport and decoding seams.
//!
//! The engine core only specifies the fetch-task contract; this module
//! provides the URL-template source and an HTTP fetcher built on a blocking
//! client, suitable for running inside pool worker threads.

use crate::core::geo::TileCoord;
use crate::grid::record::Layer;
use crate::pool::worker::{FetchContext, FetchRequest, TileFetcher};
use crate::{EngineError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// Decodes raw tile bytes into typed feature layers.
///
/// Invoked inside the execution unit, never by the coordinator.
pub trait TileDecoder: Send + Sync {
    fn decode_tile_bytes(&self, bytes: &[u8]) -> Result<Vec<Layer>>;
}

/// Simple implementation that hits the default OpenStreetMap tile server.
pub struct OpenStreetMapSource {
    subdomains: Vec<&'static str>,
}

impl OpenStreetMapSource {
    pub fn new() -> Self {
        Self {
            subdomains: vec!["a", "b", "c"],
        }
    }
}

impl Default for OpenStreetMapSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for OpenStreetMapSource {
    fn url(&self, coord: TileCoord) -> String {
        if self.subdomains.is_empty() {
            return format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                coord.z, coord.x, coord.y
            );
        }

        let idx = ((coord.x + coord.y) % self.subdomains.len() as u32) as usize;
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            self.subdomains[idx], coord.z, coord.x, coord.y
        )
    }
}

/// Source built from a `{z}`/`{x}`/`{y}` URL template
pub struct UrlTemplateSource {
    template: String,
}

impl UrlTemplateSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl TileSource for UrlTemplateSource {
    fn url(&self, coord: TileCoord) -> String {
        self.template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }
}

/// Fetches tile bytes over HTTP and hands them to a decoder.
///
/// Runs on pool worker threads, so the blocking client is the right shape
/// here; the coordinator never waits on the network directly.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    source: Box<dyn TileSource>,
    decoder: Arc<dyn TileDecoder>,
}

impl HttpFetcher {
    pub fn new(source: Box<dyn TileSource>, decoder: Arc<dyn TileDecoder>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("tilekit/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            source,
            decoder,
        })
    }
}

impl TileFetcher for HttpFetcher {
    fn fetch(&self, request: &FetchRequest, ctx: &FetchContext) -> Result<Vec<Layer>> {
        let coord: TileCoord = request.tile_id.parse()?;
        if ctx.is_canceled() {
            return Err(EngineError::Canceled.into());
        }

        let url = self.source.url(coord);
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(EngineError::Fetch(format!("HTTP {} for tile {}", response.status(), coord)).into());
        }

        let bytes = response.bytes()?.to_vec();
        if ctx.is_canceled() {
            return Err(EngineError::Canceled.into());
        }
        self.decoder.decode_tile_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osm_source_url() {
        let source = OpenStreetMapSource::new();
        let url = source.url(TileCoord::new(1, 2, 3));
        assert!(url.contains(".tile.openstreetmap.org/3/1/2.png"));
    }

    #[test]
    fn test_template_source_substitution() {
        let source = UrlTemplateSource::new("https://tiles.example.com/{z}/{x}/{y}.mvt");
        assert_eq!(
            source.url(TileCoord::new(4, 5, 6)),
            "https://tiles.example.com/6/4/5.mvt"
        );
    }
}
