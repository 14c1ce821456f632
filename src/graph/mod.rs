//! Graph model, backing stores and the cached accessor.
//!
//! A [`CachedGraph`] answers [`GraphAccess::get_node`] from a bounded
//! [`GraphCache`](crate::cache::GraphCache) and falls back to an
//! [`EdgeStore`] on a miss. Stores are selected with [`StoreKind`] and
//! sized with [`GraphSize`].

mod accessor;
pub mod config;
mod csv_store;
mod store;
mod types;

pub use accessor::{CachedGraph, GraphAccess};
pub use config::{AccessMode, GraphConfig, GraphSize, StoreKind};
pub use csv_store::CsvStore;
pub use store::{open_store, EdgeStore, GridStore, MemoryStore};
pub use types::{Edge, Node, NodeId};
