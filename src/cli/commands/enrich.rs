//! MusicBrainz enrichment stage.

use crate::enrichment::{EnrichmentError, EnrichmentPolicy, EnrichmentSummary, MusicBrainzClient, Resolver};
use crate::metadata::LoftyTagWriter;
use crate::model::Catalog;

/// Enrich eligible catalog records in place
pub async fn cmd_enrich(catalog: &mut Catalog, policy: &EnrichmentPolicy) -> Result<EnrichmentSummary, EnrichmentError> {
    let client = MusicBrainzClient::new(&policy.contact)?;

    let eligible = catalog.iter().filter(|t| policy.is_eligible(t)).count();
    println!(
        "Enriching {} of {} tracks from MusicBrainz (min score {}, {:.1}s between requests)...",
        eligible,
        catalog.len(),
        policy.min_score,
        policy.request_interval.as_secs_f64()
    );
    if policy.write_tags {
        println!("Enriched fields will be written back to file tags.");
    }

    let mut resolver = Resolver::new(&client, &LoftyTagWriter, policy);
    let summary = resolver.enrich_catalog(catalog).await;

    println!(
        "Enrichment complete: {} updated, {} unchanged, {} unmatched, {} lookup failures.",
        summary.updated, summary.unchanged, summary.unmatched, summary.lookup_failures
    );
    Ok(summary)
}
