//! Waypoint tour optimization over graphs too large to hold in memory.
//!
//! Given a handful of waypoints in a large weighted graph, the crate finds a
//! short tour visiting all of them:
//!
//! - **Graph access**: nodes are read through a bounded LRU
//!   [`cache`](crate::cache) in front of a backing [`graph::EdgeStore`]
//!   (CSV edge file, procedural grid or in-memory), either preloaded or
//!   fetched one node per miss.
//! - **Search**: a one-to-many label-setting [`search`] with a pluggable
//!   priority queue, typed unreachable and out-of-memory failures.
//! - **Cost matrix**: one search per waypoint fills a [`matrix`], which can
//!   be symmetrized for the tour solver.
//! - **Tour**: a minimum spanning tree seeds simulated annealing with
//!   segment moves and reversals, driven by a reproducible generator
//!   ([`tour`]).
//! - **Experiments**: the [`experiment`] runner repeats the whole pipeline
//!   per waypoint set and reports timings and cache statistics.
//!
//! # Architecture
//!
//! Everything is single-threaded and synchronous. Each graph accessor owns
//! its cache and store exclusively; callers that want parallel runs create
//! one accessor per worker. All components are `Send`.

pub mod cache;
pub mod error;
pub mod experiment;
pub mod graph;
pub mod heap;
pub mod matrix;
pub mod search;
pub mod tour;
