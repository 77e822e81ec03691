//! rigging-runtime - Socket fabric, processor combinators, and circuit
//! supervision.
//!
//! This crate provides the low-level reactive infrastructure the lifecycle
//! ports are wired from:
//!
//! - **Socket**: typed multicast push stream with a remembered last value
//! - **Processors**: pure wiring functions connecting input sockets to
//!   output sockets (`direct`, `map_to`, `filter_map`, `merge_map`,
//!   `latest_map`, `latest_merge_map`, `from_event`)
//! - **Circuit**: structured supervision of the full set of wirings behind
//!   a port tree, with first-error termination
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   rigging   │  Lifecycle ports (Browser, Page, orchestrator)
//! └──────┬──────┘
//!        │ wires sockets through processors
//! ┌──────▼──────┐
//! │ rigging-    │  This crate
//! │ runtime     │
//! │  ┌────────┐ │
//! │  │ Socket │ │  multicast stream + latest-value cell
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │ Procs  │ │  wiring combinators
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │Circuit │ │  task supervision
//! │  └────────┘ │
//! └─────────────┘
//! ```

pub mod circuit;
pub mod error;
pub mod processors;
pub mod socket;

// Re-export key types at crate root
pub use circuit::Circuit;
pub use error::{Error, Result};
pub use processors::{
    LatestSnapshot, direct, filter_map, from_event, latest_map, latest_merge_map, map_to,
    merge_map,
};
pub use socket::{DEFAULT_CAPACITY, Socket, SocketRx};
