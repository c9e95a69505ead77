//! Lifecycle orchestration: the handler registry and the engine that
//! drives it.

pub mod engine;
pub mod handlers;

pub use engine::LifecycleEngine;
pub use handlers::LifecycleHandlers;
