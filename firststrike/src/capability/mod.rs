//! Host capabilities injected into the session
//!
//! Credential selection and geolocation are provided by whatever hosts the
//! command core; these traits are the seams.

mod key;
mod location;

pub use key::{EnvKeySelector, KeySelector};
pub use location::{FixedLocation, LocationError, LocationProvider, NoLocation, acquire_location, provider_for};
