//! Asset catalog lookup
//!
//! Resolves an opaque video identifier to a playable asset description. The
//! lookup is an external collaborator: the core only depends on the
//! [`Catalog`] trait, and `EdgeCatalog` is the stock HTTP implementation
//! against a playback API.

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

/// Resolved catalog asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Catalog identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Duration in milliseconds, when the catalog knows it
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Poster image
    #[serde(default)]
    pub poster: Option<Url>,
    /// Playable sources (manifest URLs), best first
    #[serde(default)]
    pub sources: Vec<VideoSource>,
}

/// One playable source of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSource {
    pub src: Url,
    /// MIME type of the manifest, e.g. "application/x-mpegURL"
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
}

/// Asynchronous catalog lookup service
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve `video_id` under the given account, authorized by `policy_key`.
    ///
    /// Fails with [`Error::VideoNotFound`] when the catalog has no such asset
    /// and [`Error::Network`] on transport failures. Never retried by the
    /// core; retry is the host's call.
    async fn find_video(
        &self,
        account_id: &str,
        policy_key: &str,
        video_id: &str,
    ) -> Result<Video>;
}

/// HTTP catalog against a playback API edge.
///
/// The policy key travels in the `Accept` header, the way edge playback APIs
/// authorize anonymous lookups.
pub struct EdgeCatalog {
    client: reqwest::Client,
    base_url: Url,
}

impl EdgeCatalog {
    /// Create a catalog rooted at `base_url`. The URL must end with a slash
    /// for path joining to behave.
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Use a caller-configured client (timeouts, proxies)
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { client, base_url }
    }

    /// Lookup URL for one asset
    fn playback_url(&self, account_id: &str, video_id: &str) -> Result<Url> {
        self.base_url
            .join(&format!("accounts/{account_id}/videos/{video_id}"))
            .map_err(|e| Error::InvalidConfig(format!("bad catalog URL: {e}")))
    }
}

#[async_trait]
impl Catalog for EdgeCatalog {
    #[instrument(skip(self, policy_key))]
    async fn find_video(
        &self,
        account_id: &str,
        policy_key: &str,
        video_id: &str,
    ) -> Result<Video> {
        let url = self.playback_url(account_id, video_id)?;

        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                format!("application/json;pk={policy_key}"),
            )
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::VideoNotFound {
                video_id: video_id.to_string(),
            });
        }

        let video: Video = response.error_for_status()?.json().await?;

        debug!(
            video_id = %video.id,
            sources = video.sources.len(),
            duration_ms = ?video.duration_ms,
            "Catalog lookup resolved"
        );

        Ok(video)
    }
}
