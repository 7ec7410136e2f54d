//! Domain Event Module
//!
//! In-process publish/subscribe for the lifecycle events. Publishing is
//! fire-and-forget; a failing subscriber never fails the publisher.

pub mod bus;

pub use bus::EventBus;
