mod args;
mod exec;
mod fds;
mod limits;
mod logger;
mod shmem;

#[macro_use]
extern crate log;
extern crate simplelog;

use std::process;

use anyhow::Result;
use clap::{error::ErrorKind, Parser};

use crate::{args::Args, logger::Logger, shmem::StatusShMem};

/// Builds the execution environment and hands the process over to the
/// target. Only returns on failure.
fn launch(args: &Args) -> Result<()> {
    let input = fds::open_input(args.input())?;
    let null = fds::open_null()?;

    limits::set_address_space_limit(args.mem_limit_mb())?;

    fds::remap(&input, &null)?;

    // The copies at 0/1/2 and 198/199 are what the target inherits, the
    // originals are done.
    drop(input);
    drop(null);

    exec::exec_target(&args.argv())
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                // Exit code 1 on bad usage is part of the launch contract.
                _ => process::exit(1),
            }
        }
    };

    if let Err(e) = Logger::init() {
        eprintln!("{e:}");
        process::exit(1);
    }

    info!("Started forksrv-shim...");
    info!("Args: {args:#?}");

    if let Err(e) = launch(&args) {
        error!("Launch failed: {e:?}");

        // The fuzzer never reads our exit status or stderr; once the
        // descriptors are remapped it cannot. The status segment is the one
        // channel it does inspect after the process is gone.
        match StatusShMem::from_env() {
            Ok(mut status) => status.signal_exec_failure(),
            Err(e) => error!("Cannot report the failure: {e:}"),
        }
    }

    process::exit(1);
}
