use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::travel_matrices::TravelMatrices;

const OSRM_URL_ENV_VAR: &str = "COURIER_OSRM_URL";
const OSRM_TIMEOUT_ENV_VAR: &str = "COURIER_OSRM_TIMEOUT_SECS";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const OSRM_TABLE_API_PATH: &str = "/table/v1/driving/";

#[derive(Debug, Error)]
pub enum OsrmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {code} - {message}")]
    Api { code: String, message: String },

    #[error("Incomplete response")]
    IncompleteResponse,

    #[error("No route between points {from} and {to}")]
    Unreachable { from: usize, to: usize },
}

#[derive(Debug, Clone)]
pub struct MatrixServiceParams {
    pub osrm_url: String,
    pub timeout: Duration,
}

impl MatrixServiceParams {
    /// Reads the service configuration from the environment.
    /// Returns `None` when no service URL is configured.
    pub fn from_env() -> Option<Self> {
        let osrm_url = std::env::var(OSRM_URL_ENV_VAR).ok()?;
        if osrm_url.trim().is_empty() {
            return None;
        }

        let timeout_secs = std::env::var(OSRM_TIMEOUT_ENV_VAR)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Some(MatrixServiceParams {
            osrm_url: osrm_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}

pub struct OsrmTableClient {
    params: MatrixServiceParams,
    client: reqwest::Client,
}

impl OsrmTableClient {
    pub fn new(params: MatrixServiceParams) -> Result<Self, OsrmError> {
        let client = reqwest::Client::builder().timeout(params.timeout).build()?;
        Ok(Self { params, client })
    }

    pub fn table_url<P>(&self, points: &[P]) -> String
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        let mut url = self.params.osrm_url.clone();
        url.push_str(OSRM_TABLE_API_PATH);

        let coordinates = points
            .iter()
            .map(|point| {
                let point: geo_types::Point = point.into();
                format!("{},{}", point.x(), point.y())
            })
            .collect::<Vec<_>>()
            .join(";");

        url.push_str(&coordinates);
        url
    }

    pub async fn fetch_matrix<P>(&self, points: &[P]) -> Result<TravelMatrices, OsrmError>
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        let url = self.table_url(points);
        debug!(points = points.len(), "Requesting OSRM table");

        let response = self
            .client
            .get(url)
            .query(&[("annotations", "distance")])
            .send()
            .await?;

        let body: OsrmTableResponse = response.json().await?;
        parse_table(body, points.len())
    }
}

fn parse_table(response: OsrmTableResponse, num_points: usize) -> Result<TravelMatrices, OsrmError> {
    if response.code != "Ok" {
        return Err(OsrmError::Api {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let rows = response.distances.ok_or(OsrmError::IncompleteResponse)?;
    if rows.len() != num_points {
        return Err(OsrmError::IncompleteResponse);
    }

    let mut distances = Vec::with_capacity(num_points * num_points);
    for (from, row) in rows.into_iter().enumerate() {
        if row.len() != num_points {
            return Err(OsrmError::IncompleteResponse);
        }

        for (to, distance) in row.into_iter().enumerate() {
            match distance {
                Some(distance) => distances.push(distance),
                None => return Err(OsrmError::Unreachable { from, to }),
            }
        }
    }

    Ok(TravelMatrices::new(distances, num_points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str, num_points: usize) -> Result<TravelMatrices, OsrmError> {
        let response: OsrmTableResponse = serde_json::from_str(json).unwrap();
        parse_table(response, num_points)
    }

    #[test]
    fn test_parse_table_ok() {
        let matrices = parse(
            r#"{"code":"Ok","distances":[[0,120.5],[130.0,0]],"sources":[],"destinations":[]}"#,
            2,
        )
        .unwrap();

        assert_eq!(matrices.num_points, 2);
        assert_eq!(matrices.distance(0, 1), 120.5);
        assert_eq!(matrices.distance(1, 0), 130.0);
    }

    #[test]
    fn test_parse_table_api_error() {
        let result = parse(r#"{"code":"InvalidQuery","message":"Query string malformed"}"#, 2);

        match result {
            Err(OsrmError::Api { code, message }) => {
                assert_eq!(code, "InvalidQuery");
                assert_eq!(message, "Query string malformed");
            }
            _ => panic!("expected an API error"),
        }
    }

    #[test]
    fn test_parse_table_unreachable() {
        let result = parse(r#"{"code":"Ok","distances":[[0,null],[10,0]]}"#, 2);
        assert!(matches!(
            result,
            Err(OsrmError::Unreachable { from: 0, to: 1 })
        ));
    }

    #[test]
    fn test_parse_table_missing_rows() {
        let result = parse(r#"{"code":"Ok","distances":[[0,1]]}"#, 2);
        assert!(matches!(result, Err(OsrmError::IncompleteResponse)));
    }

    #[test]
    fn test_table_url_is_lon_lat() {
        let client = OsrmTableClient::new(MatrixServiceParams {
            osrm_url: String::from("http://localhost:5000"),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        let points = vec![
            geo_types::Point::new(106.7, 10.77),
            geo_types::Point::new(106.66, 10.76),
        ];

        assert_eq!(
            client.table_url(&points),
            "http://localhost:5000/table/v1/driving/106.7,10.77;106.66,10.76"
        );
    }
}
