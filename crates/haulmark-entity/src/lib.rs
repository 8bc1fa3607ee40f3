//! # haulmark-entity
//!
//! Domain record models for the Haulmark marketplace. Every struct in this
//! crate mirrors a row of a remote collection or a value written to one.
//! Records derive `Debug`, `Clone`, `Serialize` and `Deserialize`; fields the
//! store may omit are `Option` until fetched.

pub mod document;
pub mod driver;
pub mod load;
pub mod record;
pub mod truck;
pub mod user;

pub use record::Entity;
