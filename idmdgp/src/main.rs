#![doc(hidden)]

use std::env;
use std::io::{Read, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use log::info;
use thiserror::Error;

use idmdgp_core::config::Config;
use idmdgp_core::enumerator::{run_partitioned, EnumContext};
use idmdgp_io::{open_file, out_writer, parse_dmdgp, write_dmdgp};

mod cli;

use cli::{Args, Command, DumpArgs, SolveArgs};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Io(#[from] idmdgp_io::IoError),
    #[error(transparent)]
    Core(#[from] idmdgp_core::CoreError),
    #[error("could not open '{path}': {source}")]
    OpenFile { path: String, #[source] source: std::io::Error },
}

/// Reads and parses a DMDGP instance, transparently decompressing a
/// `.gz`-suffixed `infile`.
fn read_instance(infile: &str) -> Result<(idmdgp_core::Peptide, idmdgp_core::Graph), AppError> {
    let mut reader = open_file(infile).map_err(|source| AppError::OpenFile { path: infile.to_string(), source })?;
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| AppError::OpenFile { path: infile.to_string(), source })?;
    let (peptide, graph) = parse_dmdgp(&text)?;
    Ok((peptide, graph))
}

fn run_solve(args: &SolveArgs) -> Result<(), AppError> {
    let (peptide, graph) = read_instance(&args.infile)?;

    let config = Config {
        ddf_tol: args.ddf_tol,
        interval_samples: args.interval_samples,
        thread_count: args.threads,
        emit_limit: args.emit_limit,
        split_level: args.split_level,
    };
    info!(
        "solving '{}': {} atoms, {} ordered, {} threads",
        args.infile,
        peptide.atoms.len(),
        graph.n_order(),
        config.thread_count.max(1),
    );

    let ctx = EnumContext::new(&peptide, &graph, config)?;
    let cancel = Arc::new(AtomicBool::new(false));
    let report = run_partitioned(&ctx, cancel)?;

    info!("found {} solution(s)", report.solutions.len());

    let mut out = out_writer(&args.out).map_err(|source| AppError::OpenFile { path: args.out.clone(), source })?;
    for (i, solution) in report.solutions.iter().enumerate() {
        writeln!(out, "MODEL {}", i + 1).ok();
        for (atom, pos) in solution.positions.iter().enumerate() {
            writeln!(out, "{:>5} {:>4} {:12.6} {:12.6} {:12.6}", atom + 1, peptide.atoms[atom].name, pos.x, pos.y, pos.z).ok();
        }
        writeln!(out, "ENDMDL").ok();
    }

    if args.stats {
        for (key, counter) in report.stats.iter() {
            info!("{key:?}: tested {} pruned {} ({:.1}%)", counter.ntest, counter.nprune, counter.percent_pruned());
        }
    }
    Ok(())
}

fn run_dump(args: &DumpArgs) -> Result<(), AppError> {
    let (peptide, graph) = read_instance(&args.infile)?;
    let mut out = out_writer(&args.out).map_err(|source| AppError::OpenFile { path: args.out.clone(), source })?;
    write_dmdgp(&mut out, &peptide, &graph, &args.infile)?;
    Ok(())
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", if args.verbose { "debug" } else { "info" });
    }
    env_logger::init();

    match &args.command {
        Command::Solve(solve_args) => run_solve(solve_args),
        Command::Dump(dump_args) => run_dump(dump_args),
    }
}
