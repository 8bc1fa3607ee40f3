//! Marketplace user roles.

pub mod role;

pub use role::UserRole;
