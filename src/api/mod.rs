pub mod polygon_client;
pub mod urls;

pub use polygon_client::{PolygonClient, DEFAULT_LIMIT};
