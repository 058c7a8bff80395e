//! Text I/O for DMDGP instance dumps: reads and writes the section-based
//! format `original_source/src/dmdgp.c` defines, carrying an
//! [`idmdgp_core::Peptide`] and its [`idmdgp_core::Graph`] (distances,
//! dihedral bounds, and Branch-and-Prune order) to and from disk.

mod error;
mod format;
mod hash;
mod io_utils;
mod reader;
mod writer;

pub use error::{IoError, Result};
pub use io_utils::{open_file, out_writer};
pub use reader::parse_dmdgp;
pub use writer::write_dmdgp;
