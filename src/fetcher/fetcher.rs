// fetcher.rs
use crate::config::AnalysisConfig;
use crate::domain::geo::haversine_km;
use crate::domain::listing::{CompetitorRecord, TargetListing};
use crate::fetcher::normalize::{normalize_competitor, normalize_search, normalize_target};
use crate::fetcher::{FetchError, ListingProvider};
use rand::Rng;
use std::collections::HashSet;
use std::time::{Duration, Instant};

const SEARCH_ATTEMPTS: u32 = 3;
const MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub radius_km: f64,
    pub max_competitors: usize,
    /// Fixed pause between successive outbound calls.
    pub request_delay: Duration,
    /// First retry backoff; doubles per attempt.
    pub retry_backoff: Duration,
}

impl From<&AnalysisConfig> for FetchSettings {
    fn from(cfg: &AnalysisConfig) -> Self {
        Self {
            radius_km: cfg.search_radius_km,
            max_competitors: cfg.max_competitors,
            request_delay: cfg.request_delay,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

/// Target listing plus its nearest competitors.
#[derive(Debug, Clone)]
pub struct MarketFetch {
    pub target: TargetListing,
    pub competitors: Vec<CompetitorRecord>,
}

pub struct CompetitorFetcher<'a> {
    provider: &'a dyn ListingProvider,
    settings: FetchSettings,
}

impl<'a> CompetitorFetcher<'a> {
    pub fn new(provider: &'a dyn ListingProvider, settings: FetchSettings) -> Self {
        Self { provider, settings }
    }

    pub fn fetch_market(&self, listing_id: &str) -> Result<MarketFetch, FetchError> {
        let target = self.fetch_target(listing_id)?;
        std::thread::sleep(self.settings.request_delay);

        let found = self.search_with_retry(&target)?;
        let mut competitors = select_nearest(&target, found, &self.settings);
        tracing::info!(
            listing_id,
            competitors = competitors.len(),
            "competitor search complete"
        );

        self.enrich(&mut competitors);

        Ok(MarketFetch { target, competitors })
    }

    pub fn fetch_target(&self, listing_id: &str) -> Result<TargetListing, FetchError> {
        let raw = self.provider.fetch_listing(listing_id)?;
        normalize_target(&raw)
    }

    /// Competitor search, retried with exponential backoff plus jitter.
    pub fn search_with_retry(&self, target: &TargetListing) -> Result<Vec<CompetitorRecord>, FetchError> {
        let mut last_err = None;
        // over-fetch so filtering by radius and dropping the target still leaves enough
        let limit = self.settings.max_competitors * 2 + 1;

        for attempt in 1..=SEARCH_ATTEMPTS {
            let start = Instant::now();
            let result = self
                .provider
                .search_nearby(
                    target.location.lat,
                    target.location.lng,
                    self.settings.radius_km,
                    limit,
                )
                .and_then(|raw| normalize_search(&raw));

            match result {
                Ok(found) => {
                    tracing::debug!(attempt, elapsed = ?start.elapsed(), found = found.len(), "search succeeded");
                    return Ok(found);
                }
                Err(e) => {
                    tracing::warn!(attempt, elapsed = ?start.elapsed(), "search attempt failed: {e}");
                    last_err = Some(e);
                    if attempt < SEARCH_ATTEMPTS {
                        std::thread::sleep(self.backoff(attempt));
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| FetchError::Network("search retry loop failed".into())))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self
            .settings
            .retry_backoff
            .saturating_mul(2u32.saturating_pow(attempt - 1))
            .min(MAX_BACKOFF);
        let jitter_ms = (self.settings.retry_backoff.as_millis() / 2) as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }

    /// Detail lookups for competitors the search returned without amenities.
    /// Lookups run concurrently; every launch, the first included, waits one
    /// request delay after the previous outbound call.
    fn enrich(&self, competitors: &mut [CompetitorRecord]) {
        let wanted: Vec<usize> = competitors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.amenities.is_empty())
            .map(|(i, _)| i)
            .collect();
        if wanted.is_empty() {
            return;
        }

        let details: Vec<(usize, Result<CompetitorRecord, FetchError>)> = std::thread::scope(|s| {
            let mut handles = Vec::with_capacity(wanted.len());
            for &idx in &wanted {
                std::thread::sleep(self.settings.request_delay);
                let id = competitors[idx].id.clone();
                let provider = self.provider;
                handles.push(s.spawn(move || {
                    let detail = provider
                        .fetch_listing(&id)
                        .and_then(|raw| normalize_competitor(&raw));
                    (idx, detail)
                }));
            }
            handles
                .into_iter()
                .filter_map(|h| h.join().ok())
                .collect()
        });

        for (idx, detail) in details {
            let comp = &mut competitors[idx];
            match detail {
                Ok(d) => merge_detail(comp, d),
                Err(e) => tracing::warn!(competitor = %comp.id, "detail lookup failed: {e}"),
            }
        }
    }
}

/// Fills gaps in a search record from its detail record.
fn merge_detail(comp: &mut CompetitorRecord, detail: CompetitorRecord) {
    if !detail.amenities.is_empty() {
        comp.amenities = detail.amenities;
    }
    comp.price = comp.price.or(detail.price);
    comp.rating = comp.rating.or(detail.rating);
    if comp.review_count == 0 {
        comp.review_count = detail.review_count;
    }
    comp.property_type = comp.property_type.take().or(detail.property_type);
    comp.bedrooms = comp.bedrooms.or(detail.bedrooms);
    comp.url = comp.url.take().or(detail.url);
}

/// Drops the target itself and duplicates, computes distances, keeps
/// the nearest within the radius. Records without a location are kept at the end.
pub fn select_nearest(
    target: &TargetListing,
    found: Vec<CompetitorRecord>,
    settings: &FetchSettings,
) -> Vec<CompetitorRecord> {
    let mut seen = HashSet::new();

    let mut kept: Vec<CompetitorRecord> = found
        .into_iter()
        .filter(|c| c.id != target.id && seen.insert(c.id.clone()))
        .map(|mut c| {
            c.distance_km = c
                .location
                .map(|loc| crate::domain::stats::round_to(haversine_km(target.location, loc), 3));
            c
        })
        .filter(|c| c.distance_km.map_or(true, |d| d <= settings.radius_km))
        .collect();

    kept.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
    kept.truncate(settings.max_competitors);
    kept
}
