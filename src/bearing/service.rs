//! Remote bearing service client
//!
//! Thin blocking client for the `GET /qibla/{lat}/{lng}` endpoint. The
//! resolver layers the never-fail contract on top; this client reports
//! failures honestly.

use super::BearingService;
use crate::error::MihrabError;
use crate::types::Coordinates;
use serde::Deserialize;
use std::time::Duration;

/// Default bearing service endpoint
pub const DEFAULT_SERVICE_URL: &str = "https://api.aladhan.com/v1";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Deserialize)]
struct BearingResponse {
    code: u16,
    data: BearingData,
}

#[derive(Debug, Deserialize)]
struct BearingData {
    direction: f64,
}

/// HTTP bearing service with a bounded request timeout
pub struct HttpBearingService {
    base_url: String,
    timeout: Duration,
}

impl Default for HttpBearingService {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_URL)
    }
}

impl HttpBearingService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, origin: Coordinates) -> String {
        format!(
            "{}/qibla/{}/{}",
            self.base_url.trim_end_matches('/'),
            origin.latitude,
            origin.longitude
        )
    }
}

impl BearingService for HttpBearingService {
    fn bearing_to_qibla(&self, origin: Coordinates) -> Result<f64, MihrabError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| MihrabError::ServiceError(e.to_string()))?;

        let url = self.endpoint(origin);
        log::debug!("fetching qibla bearing from {}", url);

        let response: BearingResponse = client
            .get(&url)
            .send()
            .map_err(|e| MihrabError::ServiceError(e.to_string()))?
            .json()
            .map_err(|e| MihrabError::ServiceError(e.to_string()))?;

        if response.code != 200 {
            return Err(MihrabError::ServiceError(format!(
                "service returned code {}",
                response.code
            )));
        }

        Ok(response.data.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_format() {
        let service = HttpBearingService::new("https://example.com/v1/");
        let url = service.endpoint(Coordinates::new(30.0444, 31.2357));
        assert_eq!(url, "https://example.com/v1/qibla/30.0444/31.2357");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"code": 200, "status": "OK", "data": {"latitude": 30.0, "longitude": 31.0, "direction": 58.7}}"#;
        let response: BearingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.code, 200);
        assert!((response.data.direction - 58.7).abs() < 1e-9);
    }
}
