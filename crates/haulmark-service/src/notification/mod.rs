//! Notification sinks delivering user-facing messages.

pub mod sinks;

pub use sinks::{ChannelNotifier, MemoryNotifier, TracingNotifier};
