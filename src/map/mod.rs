pub mod basemap;
pub mod figure;
pub mod frame;
pub mod pdf;

pub use basemap::{Basemap, TileServer};
pub use figure::{render, Figure};
pub use frame::Frame;
pub use pdf::export_pdf;
