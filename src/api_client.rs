use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::query_state::{CityRecord, PageSize, ResultPage};

/// Default GeoDB endpoint host
pub const DEFAULT_API_HOST: &str = "wft-geo-db.p.rapidapi.com";

/// Default GeoDB base URL
pub const DEFAULT_BASE_URL: &str = "https://wft-geo-db.p.rapidapi.com";

/// The only country this client ever asks about
pub const COUNTRY_ID: &str = "IN";

const CITIES_PATH: &str = "/v1/geo/cities";

/// Every way a city fetch can fail. Callers treat all of them the same.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// Query parameters for `GET /v1/geo/cities`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityQueryParams {
    #[serde(rename = "countryIds")]
    pub country_ids: String,
    #[serde(rename = "namePrefix")]
    pub name_prefix: String,
    pub limit: u32,
    /// Carries the 1-based page number, not a record offset
    pub offset: u32,
}

impl CityQueryParams {
    pub fn new(name_prefix: impl Into<String>, page_size: PageSize, page: u32) -> Self {
        Self {
            country_ids: COUNTRY_ID.to_string(),
            name_prefix: name_prefix.into(),
            limit: page_size.get(),
            offset: page,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CitiesResponse {
    pub data: Vec<CityRecord>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(default)]
    pub current_offset: u64,
    pub total_count: u64,
}

impl From<CitiesResponse> for ResultPage {
    fn from(response: CitiesResponse) -> Self {
        ResultPage {
            records: response.data,
            total_count: response.metadata.total_count,
        }
    }
}

/// Anything that can answer a city query
#[async_trait]
pub trait CitySource: Send + Sync {
    async fn fetch_cities(&self, params: &CityQueryParams) -> Result<CitiesResponse, FetchError>;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    host: String,
    api_key: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, host: &str, api_key: &str) -> Self {
        Self::with_client(base_url, host, api_key, reqwest::Client::new())
    }

    /// Use a preconfigured reqwest client (timeouts, proxies)
    pub fn with_client(base_url: &str, host: &str, api_key: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            host: host.to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    pub fn cities_url(&self) -> String {
        format!("{}{}", self.base_url, CITIES_PATH)
    }
}

#[async_trait]
impl CitySource for ApiClient {
    async fn fetch_cities(&self, params: &CityQueryParams) -> Result<CitiesResponse, FetchError> {
        debug!(target: "fetch", "GET {} {:?}", self.cities_url(), params);

        let response = self
            .client
            .get(self.cities_url())
            .query(params)
            .header("x-rapidapi-host", &self.host)
            .header("x-rapidapi-key", &self.api_key)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(FetchError::Network)?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_reuse_page_number_as_offset() {
        let size = PageSize::new(7).unwrap();
        let params = CityQueryParams::new("del", size, 3);
        assert_eq!(params.country_ids, "IN");
        assert_eq!(params.limit, 7);
        assert_eq!(params.offset, 3);
    }

    #[test]
    fn test_cities_url_strips_trailing_slash() {
        let client = ApiClient::new("http://localhost:8080/", DEFAULT_API_HOST, "key");
        assert_eq!(client.cities_url(), "http://localhost:8080/v1/geo/cities");
    }

    #[test]
    fn test_response_without_links_still_parses() {
        let json = r#"{
            "data": [{"name": "Delhi", "countryCode": "IN", "population": 9879172}],
            "metadata": {"currentOffset": 0, "totalCount": 1}
        }"#;
        let response: CitiesResponse = serde_json::from_str(json).unwrap();
        assert!(response.links.is_empty());

        let page = ResultPage::from(response);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.records[0].name, "Delhi");
        assert_eq!(page.records[0].country_code, "IN");
    }

    #[test]
    fn test_response_missing_metadata_is_rejected() {
        let json = r#"{"data": []}"#;
        assert!(serde_json::from_str::<CitiesResponse>(json).is_err());
    }
}
