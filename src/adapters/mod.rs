// Adapters layer: concrete implementations for external systems (Google Maps web services, local disk).

pub mod google;
pub mod storage;

pub use google::{GoogleConnector, GoogleMapsClient};
pub use storage::LocalStorage;
