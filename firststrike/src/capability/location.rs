//! Geolocation

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::LatLng;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    Denied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Location request timed out")]
    Timeout,
}

/// One-shot source of the operator's position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<LatLng, LocationError>;
}

/// A position fixed by configuration or the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub LatLng);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<LatLng, LocationError> {
        Ok(self.0)
    }
}

/// No position source; every request is denied
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_location(&self) -> Result<LatLng, LocationError> {
        Err(LocationError::Denied)
    }
}

/// Provider for an optional configured position
pub fn provider_for(location: Option<LatLng>) -> Arc<dyn LocationProvider> {
    match location {
        Some(lat_lng) => Arc::new(FixedLocation(lat_lng)),
        None => Arc::new(NoLocation),
    }
}

/// Ask once for the current position; failures only mean no location bias
pub async fn acquire_location(provider: &dyn LocationProvider) -> Option<LatLng> {
    match provider.current_location().await {
        Ok(lat_lng) => {
            debug!(%lat_lng, "acquire_location: position acquired");
            Some(lat_lng)
        }
        Err(e) => {
            debug!(error = %e, "acquire_location: no position");
            None
        }
    }
}
