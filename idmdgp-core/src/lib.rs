//! Branch-and-Prune enumerator for the interval Discretizable Molecular
//! Distance Geometry Problem (iDMDGP).
//!
//! Given a partial distance [`graph::Graph`] over a [`peptide::Peptide`]
//! (a mix of exact and interval edges, plus torsion/improper dihedral
//! constraints) and a valid Branch-and-Prune vertex order, the
//! [`enumerator`] module enumerates every 3D embedding consistent with
//! those constraints within tolerance.
//!
//! ```rust,ignore
//! use idmdgp_core::{config::Config, enumerator::{EnumContext, run_partitioned}, graph::Graph, peptide::Peptide};
//! use std::sync::{atomic::AtomicBool, Arc};
//!
//! let peptide = Peptide::new();
//! let graph = Graph::new(0);
//! let ctx = EnumContext::new(&peptide, &graph, Config::default())?;
//! let report = run_partitioned(&ctx, Arc::new(AtomicBool::new(false)))?;
//! for solution in &report.solutions {
//!     println!("{:?}", solution.positions);
//! }
//! # Ok::<(), idmdgp_core::error::CoreError>(())
//! ```
//!
//! Parsing of force-field/topology files, residue-library management,
//! CLI and option parsing, and logging are out of this crate's scope;
//! see the `idmdgp-io` and `idmdgp` crates for those collaborators.

pub mod config;
pub mod enumerator;
pub mod error;
pub mod graph;
pub mod peptide;
pub mod solution;
pub mod value;
pub mod vector;

pub use config::Config;
pub use error::{CoreError, Result};
pub use graph::Graph;
pub use peptide::Peptide;
pub use solution::Solution;
pub use value::Value;
pub use vector::Vec3;
