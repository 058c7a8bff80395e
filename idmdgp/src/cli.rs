use clap::{Parser, Subcommand};

/// Command-line driver for the interval DMDGP Branch-and-Prune enumerator.
///
/// Reads a DMDGP text instance (see `idmdgp-io`) and either solves it
/// end to end or simply re-dumps it, canonicalizing the file.
#[derive(Parser, Debug)]
#[clap(author, version, about, arg_required_else_help = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// be more verbose and log program actions on the screen
    #[clap(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// enumerate every embedding of a DMDGP instance
    Solve(SolveArgs),
    /// parse a DMDGP instance and re-write it, without searching
    Dump(DumpArgs),
}

#[derive(Parser, Debug)]
pub struct SolveArgs {
    /// input DMDGP file name
    #[clap(short, long)]
    pub infile: String,
    /// output file for the enumerated solutions ("stdout" or "" for standard output)
    #[clap(short, long, default_value = "stdout")]
    pub out: String,
    /// number of worker threads to run the search with
    #[clap(short, long, default_value_t = 1)]
    pub threads: u32,
    /// maximum number of solutions to emit; 0 means unlimited
    #[clap(long, default_value_t = 0)]
    pub emit_limit: u32,
    /// number of discretization samples to take across each interval edge
    #[clap(long, default_value_t = 3)]
    pub interval_samples: u32,
    /// absolute tolerance applied to distance and dihedral bound checks
    #[clap(long, default_value_t = 1e-3)]
    pub ddf_tol: f64,
    /// BP order level at which the search tree is split across worker
    /// threads; 0 chooses automatically
    #[clap(long, default_value_t = 0)]
    pub split_level: u32,
    /// print pruner test/prune counters to the log after the search
    #[clap(long, action)]
    pub stats: bool,
}

#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// input DMDGP file name
    #[clap(short, long)]
    pub infile: String,
    /// output file name ("stdout" or "" for standard output)
    #[clap(short, long, default_value = "stdout")]
    pub out: String,
}
