#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use city_search::api_client::{CitiesResponse, CityQueryParams, CitySource, FetchError};
use city_search::query_state::CityRecord;

const SAMPLE_CITIES: &str = include_str!("../fixtures/sample_cities.json");

/// The recorded five-row "del" page, 13 matches in total
pub fn sample_response() -> CitiesResponse {
    serde_json::from_str(SAMPLE_CITIES).expect("fixture should parse")
}

pub fn single_city_response(name: &str, total_count: u64) -> CitiesResponse {
    let mut response = sample_response();
    response.data = vec![CityRecord {
        name: name.to_string(),
        country_code: "IN".to_string(),
    }];
    response.metadata.total_count = total_count;
    response
}

/// In-memory city source keyed by name prefix.
///
/// Unknown prefixes answer with the sample page. A gated prefix blocks until
/// [`StubSource::release`] is called for it.
#[derive(Default)]
pub struct StubSource {
    calls: Mutex<Vec<CityQueryParams>>,
    responses: Mutex<HashMap<String, CitiesResponse>>,
    failing: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl StubSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, prefix: &str, response: CitiesResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(prefix.to_string(), response);
    }

    pub fn fail(&self, prefix: &str) {
        self.failing.lock().unwrap().insert(prefix.to_string());
    }

    pub fn gate(&self, prefix: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(prefix.to_string(), Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, prefix: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(prefix) {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> Vec<CityQueryParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CitySource for StubSource {
    async fn fetch_cities(&self, params: &CityQueryParams) -> Result<CitiesResponse, FetchError> {
        self.calls.lock().unwrap().push(params.clone());

        let gate = self.gates.lock().unwrap().get(&params.name_prefix).cloned();
        if let Some(gate) = gate {
            let permit = gate.acquire().await.expect("gate closed");
            permit.forget();
        }

        if self.failing.lock().unwrap().contains(&params.name_prefix) {
            return Err(FetchError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&params.name_prefix)
            .cloned()
            .unwrap_or_else(sample_response))
    }
}

/// Let spawned tasks run without moving the clock
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
