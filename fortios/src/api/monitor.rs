//! Monitor API: device status

use super::common::CmdbResponse;
use super::error::ApiError;
use fortiplug::FirmwareVersion;
use serde::Deserialize;

/// `GET /api/v2/monitor/system/status`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemStatus {
    pub version: String,
    pub serial: String,
    pub build: i64,
    pub hostname: String,
    pub model: String,
    pub model_name: String,
    pub model_number: String,
}

#[derive(Debug, Deserialize, Default)]
struct StatusResults {
    #[serde(default)]
    hostname: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    model_name: Option<String>,
    #[serde(default)]
    model_number: Option<String>,
}

impl SystemStatus {
    pub fn from_response(response: CmdbResponse) -> Result<Self, ApiError> {
        let results: StatusResults = match response.results {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::ParseError(format!("Invalid status results: {}", e)))?,
            None => StatusResults::default(),
        };

        Ok(Self {
            version: response.version.unwrap_or_default(),
            serial: response.serial.unwrap_or_default(),
            build: response.build.unwrap_or_default(),
            hostname: results.hostname.unwrap_or_default(),
            model: results.model.unwrap_or_default(),
            model_name: results.model_name.unwrap_or_default(),
            model_number: results.model_number.unwrap_or_default(),
        })
    }

    pub fn firmware_version(&self) -> Result<FirmwareVersion, ApiError> {
        self.version
            .parse()
            .map_err(|e: fortiplug::PlugError| ApiError::ParseError(e.to_string()))
    }
}
