//! # syncbb - Synchronous Branch-and-Bound for distributed constraint problems
//!
//! syncbb implements the SyncBB protocol: agents arranged in a fixed chain
//! pass a single partial-assignment token forward, extending it value by
//! value, and backtrack when their domain is exhausted. Violations are
//! counted per path element and compared against an upper bound to prune.
//!
//! ## Modules
//!
//! - [`dcop`] - Agents, domains, mailbox, agent order and the SyncBB engine
//! - [`problem`] - Problem instances (N-Queens, graph coloring) and run reports
//! - [`error`] - Error types and handling
//! - [`config`] - Configuration file loading
//! - [`logger`] - Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust
//! use syncbb::*;
//!
//! // Three agents, each picking a color for one node of a triangle
//! let agents = (1..=3).map(|i| Agent::new(AgentId(i), vec![0, 1, 2])).collect();
//! let order = AgentOrder::new(agents).unwrap();
//!
//! // Every pair of nodes is adjacent, so colors must differ
//! let checker = checker_fn(|a: (AgentId, &i32), b: (AgentId, &i32)| a.1 != b.1);
//!
//! let mut engine = SyncBB::new(checker, order, Config::default().with_max_cost(0));
//! let outcome = engine.run().unwrap();
//!
//! assert_eq!(outcome.termination, Termination::Satisfied);
//! let colors: Vec<i32> = outcome.solution.unwrap().assignment().map(|(_, c)| *c).collect();
//! assert_eq!(colors, vec![0, 1, 2]);
//! ```

#![allow(ambiguous_glob_reexports)]

pub mod config;
pub mod dcop;
pub mod error;
pub mod logger;
pub mod problem;

pub use dcop::*;
pub use error::*;
pub use problem::*;
