// provider.rs
use crate::config::ProviderConfig;
use crate::fetcher::FetchError;
use reqwest::blocking::Client;
use serde_json::Value;

/// An external listing-data source. Returns raw JSON; shaping happens in `normalize`.
pub trait ListingProvider: Send + Sync {
    fn fetch_listing(&self, listing_id: &str) -> Result<Value, FetchError>;

    fn search_nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
        limit: usize,
    ) -> Result<Value, FetchError>;
}

/// RapidAPI-hosted listing provider.
pub struct RapidApiProvider {
    client: Client,
    api_key: String,
    api_host: String,
    base_url: String,
}

impl RapidApiProvider {
    pub fn new(cfg: &ProviderConfig) -> Result<Self, FetchError> {
        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| FetchError::Config("LISTING_API_KEY environment variable not set".into()))?;

        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            api_host: cfg.api_host.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        let started = std::time::Instant::now();

        let resp = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .query(params)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        tracing::debug!(%url, status = status.as_u16(), elapsed = ?started.elapsed(), "provider call");

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        let json: Value = serde_json::from_str(&text).map_err(|e| FetchError::Json(e.to_string()))?;

        // Some hosts answer 200 with an error envelope.
        if json.get("error").map_or(false, |e| !e.is_null() && e != &Value::Bool(false)) {
            return Err(FetchError::UnexpectedShape(format!("provider error: {}", json["error"])));
        }

        Ok(json)
    }
}

impl ListingProvider for RapidApiProvider {
    fn fetch_listing(&self, listing_id: &str) -> Result<Value, FetchError> {
        self.get_json("listing", &[("id", listing_id.to_string())])
    }

    fn search_nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
        limit: usize,
    ) -> Result<Value, FetchError> {
        self.get_json(
            "search-geo",
            &[
                ("lat", lat.to_string()),
                ("lng", lng.to_string()),
                ("radius_km", radius_km.to_string()),
                ("limit", limit.to_string()),
                ("currency", "USD".to_string()),
            ],
        )
    }
}

/// Stand-in used when no provider key is configured. The dashboard still
/// serves stored data; every live fetch fails with a configuration error.
pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ListingProvider for UnconfiguredProvider {
    fn fetch_listing(&self, _listing_id: &str) -> Result<Value, FetchError> {
        Err(FetchError::Config(self.reason.clone()))
    }

    fn search_nearby(&self, _lat: f64, _lng: f64, _radius_km: f64, _limit: usize) -> Result<Value, FetchError> {
        Err(FetchError::Config(self.reason.clone()))
    }
}
