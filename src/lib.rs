//! gemmprof - GEMM algorithm profiler
//!
//! # About
//! gemmprof sweeps the algorithm variants an accelerated BLAS backend offers for a single dense
//! matrix-multiply (GEMM) problem, times every variant on the execution target, checks each result
//! against an independent host reference, and prints the variants ranked by measured performance.
//!
//! A sweep covers one or more operand type combinations (half, single and double precision
//! floating point, and 8-bit integer inputs with 32-bit accumulation), optional transposition of
//! either input operand, and either the backend's default algorithm, an explicit list of numbered
//! algorithms, or the whole enumeration.
//!
//! Candidates that the backend rejects for the given configuration, or whose output does not match
//! the reference, are reported with a sentinel time and a NaN throughput instead of being dropped,
//! so the report always accounts for every requested candidate.
//!
//! # Quickstart
//! ## Build
//! As any Rust-based project, gemmprof is built and run with `cargo`:
//! ```sh
//! cargo build --release
//! ```
//!
//! The default build profiles on an emulated host target, which is useful for exercising the
//! harness on machines without an accelerator. Enable the `cuda` feature to profile cuBLAS on an
//! NVIDIA GPU (requires the CUDA toolkit and a cuBLAS library at link time):
//! ```sh
//! cargo build --release --features cuda
//! ```
//!
//! ## Example run
//! Profile every algorithm of the enumeration for a 1024^3 single-precision GEMM with A
//! transposed, averaging each candidate over 10 invocations:
//! ```sh
//! cargo run --release --features cuda -- --m 1024 --n 1024 --k 1024 --ta --all-algo -l 10
//! ```
//!
//! ## Documentation
//! The crate's documentation is available using `cargo`:
//! ```sh
//! cargo doc --open
//! ```

pub mod algo;
pub mod cli;
pub mod consts;
pub mod drivers;
pub mod error;
pub mod kernels;
pub mod perf_report;
pub mod types;
pub mod utils;
pub mod verify;
