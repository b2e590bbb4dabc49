pub mod model;
pub mod ors;
pub mod query;

pub use model::{build_geometry, location_point, IsochroneCollection, IsochroneResponse};
pub use ors::OrsClient;
pub use query::{Query, QueryArgs};
