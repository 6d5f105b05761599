use gemmprof::cli::CliArgs;
use gemmprof::drivers;
use gemmprof::error::ProfError;

use clap::Parser;

use std::fs::OpenOptions;
use std::io::{stdout, Write};
use std::process;

fn main() {
    let args = CliArgs::parse();

    if let Err(err) = run(&args) {
        eprintln!("gemmprof: {err}");
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), ProfError> {
    let mut output: Box<dyn Write> = match args.output_file {
        Some(ref name) => Box::new(
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(name)?,
        ),
        None => Box::new(stdout()),
    };

    #[cfg(feature = "cuda")]
    {
        let mut target = drivers::cuda::CudaTarget::new(args.device)?;
        drivers::run(&mut target, args, &mut output)
    }

    #[cfg(not(feature = "cuda"))]
    {
        let mut target = drivers::host::HostTarget::new();
        drivers::run(&mut target, args, &mut output)
    }
}
