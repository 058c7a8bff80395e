//! The Branch-and-Prune enumerator: per-thread search state, candidate
//! generation by trilateration, the pruner registry and its concrete
//! closures, the depth-first search driver, and thread partitioning.

mod candidate;
mod context;
mod driver;
mod partition;
mod pruner;
mod state;
mod stats;

pub use candidate::{generate_candidates, Candidate};
pub use context::EnumContext;
pub use driver::{embed_prefix, SearchDriver};
pub use partition::{run_partitioned, run_partitioned_streaming, PartitionReport};
pub use state::{DdfPayload, LevelEntry, PrunerKey, PrunerPayload, TafPayload, ThreadState};
pub use stats::{Counter, PrunerStats};
