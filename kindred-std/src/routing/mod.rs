//! # Routing
//!
//! The exclusive half of the framework: every (kind, verb, action) triple maps
//! to at most one [`Route`].
//!
//! - [`RouteTableBuilder`] - registration with eager validation
//! - [`RouteTable`] - the frozen, lock-free table
//! - [`Resolution`] - the result of walking a request path

mod resolve;
mod table;

pub use resolve::{Resolution, Target};
pub use table::{Route, RouteMeta, RouteTable, RouteTableBuilder};
