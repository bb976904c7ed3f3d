// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # propnet
//!
//! Propagator networks: autonomous machines ("propagators") connected
//! through shared cells that accumulate partial information.
//!
//! ## Architecture
//!
//! - **Generic operators** (`generic`, `operators`): runtime dispatch on
//!   argument content types, most recently registered rule first
//! - **Merge** (`merge`): combining old and new information, contradictions
//!   as first-class content
//! - **Content types** (`content`): intervals and provenance-tracking
//!   supported values
//! - **Runtime** (`network`, `scheduler`, `compound`): cells, propagators,
//!   FIFO alert queue, lazily built sub-networks
//! - **Library** (`primitives`, `networks`): lifted operators and reusable
//!   assemblies
//!
//! ## Library usage
//!
//! ```
//! use propnet::config::NetworkConfig;
//! use propnet::content::interval::Interval;
//! use propnet::network::Network;
//! use propnet::networks::fall_duration;
//!
//! let mut net = Network::new(NetworkConfig::default()).unwrap();
//! let fall_time = net.new_cell("fall time");
//! let height = net.new_cell("building height");
//! fall_duration(&mut net, fall_time, height).unwrap();
//!
//! net.add_content(fall_time, Interval::new(2.9, 3.1)).unwrap();
//! net.run().unwrap();
//! assert!(net.content(height).unwrap().is_interval());
//! ```

pub mod compound;
pub mod config;
pub mod content;
pub mod error;
pub mod generic;
pub mod merge;
pub mod network;
pub mod networks;
pub mod operators;
pub mod primitives;
pub mod scheduler;
pub mod value;
