//! Metadata enrichment - fills missing artist/album data from MusicBrainz.
//!
//! # Architecture
//!
//! - **Domain models** (`domain.rs`) - candidates, queries and errors we reason about
//! - **API DTOs** (`musicbrainz/dto.rs`) - exact response shapes
//! - **Adapter** - converts DTOs to domain candidates
//! - **Client** - HTTP client for the recording search
//! - **Throttle** - keeps lookups spaced at the service's rate limit
//! - **Resolver** - eligibility, candidate selection, merge and tag write-back
//!
//! # Usage
//!
//! ```ignore
//! let client = MusicBrainzClient::new(&policy.contact)?;
//! let mut resolver = Resolver::new(&client, &LoftyTagWriter, &policy);
//! let summary = resolver.enrich_catalog(&mut catalog).await;
//! ```

pub mod domain;
pub mod musicbrainz;
pub mod resolver;
pub mod throttle;
pub mod traits;

pub use domain::{EnrichmentCandidate, EnrichmentError, RecordingQuery};
pub use musicbrainz::MusicBrainzClient;
pub use resolver::{EnrichmentPolicy, EnrichmentSummary, Resolver};
pub use throttle::Throttle;
pub use traits::RecordingSearch;
