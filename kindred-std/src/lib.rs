//! # kindred-std
//!
//! Standard implementations for the kindred resource routing framework.
//!
//! This crate provides:
//! - **Routing**: [`RouteTableBuilder`](routing::RouteTableBuilder), the frozen
//!   [`RouteTable`](routing::RouteTable) and path resolution
//! - **Extensions**: the copy-on-write [`ExtensionRegistry`](registry::ExtensionRegistry)
//!   and collaborative invocation
//! - **Dispatch**: [`Dispatcher`](dispatch::Dispatcher), from request to response
//! - **Configuration and logging**: [`KindredConfig`](config::KindredConfig),
//!   [`logging::init`]
//! - **Testing**: ready-made factories in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core contracts
pub use kindred_core;

// Modules
pub mod config;
pub mod dispatch;
mod guard;
pub mod logging;
pub mod registry;
pub mod routing;
pub mod testing;

pub use guard::HandlerPanic;

#[cfg(feature = "inventory")]
pub use inventory;
