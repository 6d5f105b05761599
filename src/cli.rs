//! Command-Line Interface related code.
//!
//! This module handles the parsing of CLI arguments using the [`clap`][1] crate.
//! It defines the available runtime options of the profiler.
//!
//! [1]: https://crates.io/crates/clap

use clap::Parser;

use std::path::PathBuf;

/// GEMM algorithm profiler.
///
/// Sweeps the algorithm variants the compute backend offers for one dense GEMM problem, times
/// each variant, verifies its output against an independent host reference and reports the
/// variants ranked by performance, one CSV record per candidate.
#[derive(Clone, Debug, Parser)]
pub struct CliArgs {
    /// Number of rows of op(A) and C.
    #[arg(
        short,
        long,
        value_name = "M",
        default_value_t = 32,
        value_parser = clap::value_parser!(u32).range(1..),
    )]
    pub m: u32,

    /// Number of columns of op(B) and C.
    #[arg(
        short,
        long,
        value_name = "N",
        default_value_t = 32,
        value_parser = clap::value_parser!(u32).range(1..),
    )]
    pub n: u32,

    /// Number of columns of op(A) and rows of op(B).
    #[arg(
        short,
        long,
        value_name = "K",
        default_value_t = 32,
        value_parser = clap::value_parser!(u32).range(1..),
    )]
    pub k: u32,

    /// Device ID to profile on.
    #[arg(short, long, value_name = "ID", default_value_t = 0)]
    pub device: u32,

    /// Number of repetitions of each candidate's timed loop.
    #[arg(
        short,
        long = "loop",
        value_name = "LOOP",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..),
    )]
    pub loop_count: u32,

    /// Transpose operand A, else it is taken as-is.
    #[arg(long)]
    pub ta: bool,

    /// Transpose operand B, else it is taken as-is.
    #[arg(long)]
    pub tb: bool,

    /// Operand type combination IDs to sweep (see `gemmprof::types::GEMM_TYPES`).
    #[arg(long = "type", value_name = "ID", value_delimiter = ',', default_value = "5")]
    pub dtypes: Vec<usize>,

    /// Numbered algorithm IDs to profile (0..=23); defaults to the backend's default algorithm.
    #[arg(long, value_name = "ID", value_delimiter = ',')]
    pub algo: Option<Vec<usize>>,

    /// Numbered tensor-op algorithm IDs to profile (0..=15).
    #[arg(long, value_name = "ID", value_delimiter = ',')]
    pub tensor_algo: Option<Vec<usize>>,

    /// Profile every algorithm of both enumerations.
    #[arg(long)]
    pub all_algo: bool,

    /// Scratch workspace size shared by all candidates, unit: MiB.
    #[arg(short, long, value_name = "MIB", default_value_t = 0)]
    pub workspace: usize,

    /// Output file, defaults to `stdout` if unspecified.
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// Seed for the operand initialization pattern.
    #[arg(short, long, value_name = "SEED")]
    pub seed: Option<u64>,
}
