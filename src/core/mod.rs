pub mod engine;
pub mod export;
pub mod pipeline;
pub mod scraper;

pub use crate::domain::model::{Lead, PlaceRecord, TransformResult};
pub use crate::domain::ports::{Pipeline, PlacesApi, Storage};
pub use crate::utils::error::Result;
