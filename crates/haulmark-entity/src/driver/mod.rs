//! Drivers employed by fleet owners.

pub mod model;

pub use model::{Driver, DriverPatch, DriverStatus, NewDriver};
