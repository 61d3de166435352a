//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header that identifies the
//! application and a way to contact its operator, and rate limits to
//! 1 req/sec. The client does not throttle itself; callers pace requests
//! with a [`Throttle`](crate::enrichment::Throttle).

use super::{adapter, dto};
use crate::enrichment::domain::{EnrichmentCandidate, EnrichmentError, RecordingQuery};

const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// Number of candidates requested per search
const SEARCH_LIMIT: u32 = 5;

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
}

/// Build the User-Agent MusicBrainz asks for: `app/version ( contact )`
fn user_agent(contact: &str) -> String {
    format!(
        "{}/{} ( {} )",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        contact.trim()
    )
}

impl MusicBrainzClient {
    /// Create a new client identifying itself with `contact` (URL or email)
    pub fn new(contact: &str) -> Result<Self, EnrichmentError> {
        Self::with_base_url(contact, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (mirrors, tests)
    pub fn with_base_url(contact: &str, base_url: impl Into<String>) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(user_agent(contact))
            .build()
            .map_err(|e| EnrichmentError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Search recordings matching `query`, returning candidates in response order
    pub async fn search_recordings(
        &self,
        query: &RecordingQuery,
    ) -> Result<Vec<EnrichmentCandidate>, EnrichmentError> {
        let response = self.send_search_request(query).await?;
        Ok(adapter::to_candidates(response))
    }

    /// Full request URL for a query
    fn search_url(&self, query: &RecordingQuery) -> String {
        format!(
            "{}/recording?query={}&fmt=json&limit={}",
            self.base_url,
            urlencoding::encode(&lucene_query(query)),
            SEARCH_LIMIT
        )
    }

    /// Send the HTTP request and parse the response
    async fn send_search_request(
        &self,
        query: &RecordingQuery,
    ) -> Result<dto::SearchResponse, EnrichmentError> {
        let url = self.search_url(query);
        tracing::debug!(target: "music_catalog::enrichment", %url, "MusicBrainz search");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();

        // MusicBrainz answers 503 when the rate limit is exceeded
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(EnrichmentError::RateLimited);
        }

        if !status.is_success() {
            let message = match response.json::<dto::ApiError>().await {
                Ok(error) => error.error,
                Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            return Err(EnrichmentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<dto::SearchResponse>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

/// Build the Lucene search expression for a query
fn lucene_query(query: &RecordingQuery) -> String {
    let mut terms = vec![format!("recording:\"{}\"", escape_phrase(&query.title))];
    if let Some(ref artist) = query.artist {
        terms.push(format!("artist:\"{}\"", escape_phrase(artist)));
    }
    if let Some(ref album) = query.album {
        terms.push(format!("release:\"{}\"", escape_phrase(album)));
    }
    terms.join(" AND ")
}

/// Escape characters that would terminate a quoted Lucene phrase
fn escape_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
