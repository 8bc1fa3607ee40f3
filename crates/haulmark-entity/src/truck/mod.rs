//! Fleet trucks.

pub mod model;
pub mod status;

pub use model::{NewTruck, Truck, TruckPatch};
pub use status::TruckStatus;
