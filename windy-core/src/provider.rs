use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{WindData, WindDataParams};

pub mod http;

pub use http::HttpWindFetcher;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("Latitude and longitude must be numbers")]
    NotANumber,
    #[error("Latitude must be between -90 and 90")]
    LatitudeOutOfRange,
    #[error("Longitude must be between -180 and 180")]
    LongitudeOutOfRange,
}

/// Reject coordinates no wind API could answer for.
pub fn validate_coordinates(params: WindDataParams) -> Result<(), CoordinateError> {
    let WindDataParams { latitude, longitude } = params;

    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(CoordinateError::NotANumber);
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(CoordinateError::LatitudeOutOfRange);
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(CoordinateError::LongitudeOutOfRange);
    }

    Ok(())
}

/// Source of current wind conditions for a coordinate.
#[async_trait]
pub trait WindFetcher: Send + Sync + Debug {
    async fn fetch_wind_data(&self, params: WindDataParams) -> anyhow::Result<WindData>;
}
