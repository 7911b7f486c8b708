//! OSRM HTTP adapter for travel-time matrices.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PlannerError, Result};
use crate::matrix::TravelTimeMatrix;
use crate::traits::{TravelMode, TravelTimeProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OsrmConfig {
    /// Same server, profile matching `mode`.
    pub fn for_mode(&self, mode: TravelMode) -> Self {
        Self {
            profile: profile_for(mode).to_string(),
            ..self.clone()
        }
    }
}

/// OSRM has no transit routing and flights are not routed at all; both
/// fall back to the car profile.
pub fn profile_for(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walking => "foot",
        TravelMode::Cycling => "bike",
        TravelMode::Driving | TravelMode::Transit | TravelMode::Flight => "car",
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn table_url(&self, locations: &[(f64, f64)]) -> String {
        let coords = locations
            .iter()
            .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/{}/{}?annotations=duration",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }
}

impl TravelTimeProvider for OsrmClient {
    fn durations_for(&self, locations: &[(f64, f64)]) -> Result<TravelTimeMatrix> {
        if locations.len() < 2 {
            return Err(PlannerError::InsufficientNodes {
                nodes: locations.len(),
                min: 2,
            });
        }

        let body = self
            .client
            .get(self.table_url(locations))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmTableResponse>())
            .inspect_err(|err| warn!(error = %err, locations = locations.len(), "OSRM table request failed"))?;

        parse_table(body, locations.len())
    }
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

fn parse_table(body: OsrmTableResponse, expected: usize) -> Result<TravelTimeMatrix> {
    if body.code != "Ok" {
        return Err(PlannerError::RoutingResponse(format!(
            "{}: {}",
            body.code,
            body.message.unwrap_or_default()
        )));
    }

    let durations = body
        .durations
        .ok_or_else(|| PlannerError::RoutingResponse("missing durations".to_string()))?;

    let matrix = TravelTimeMatrix::from_optional_rows(durations)?;
    matrix.ensure_len(expected)?;
    Ok(matrix)
}
