//! GridRad radar reflectivity: reading, interpolation, storage and event grids.

pub mod event;
pub mod interp;
pub mod source;
pub mod store;

pub use event::{reflectivity_to_event_grid, EventGrid};
pub use interp::{horiz_interp_and_store_gridrad, AppendSummary};
pub use source::GridRadVolume;
pub use store::{ReflectivityEntry, ReflectivitySeries, ReflectivityStore};
