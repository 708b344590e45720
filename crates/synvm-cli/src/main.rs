//! synvm - CLI
//!
//! Runs a program image with stdin as guest input and stdout as guest output.
//! Debugger command lines (`!halt`, `!dump`, `!save`, `!load`, `!set`) typed on
//! stdin are handled by the VM and never reach the guest.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;

use synvm_core::snapshot;
use synvm_core::{HaltReason, ProgramLoader, RunOutcome, VirtualMachine, VmConfig};

#[derive(Parser, Debug)]
#[command(name = "synvm", about = "Run a 15-bit VM program image with an inline debugger.")]
struct Args {
    /// Program image: little-endian 16-bit code units.
    #[arg(value_name = "PROGRAM")]
    program: PathBuf,

    /// File written by the `!dump` debugger command.
    #[arg(long, value_name = "PATH", default_value = synvm_core::config::DEFAULT_DUMP_PATH)]
    dump_path: PathBuf,

    /// File used by the `!save` and `!load` debugger commands.
    #[arg(long, value_name = "PATH", default_value = synvm_core::config::DEFAULT_SNAPSHOT_PATH)]
    snapshot_path: PathBuf,

    /// Restore this snapshot before running.
    #[arg(long, value_name = "PATH")]
    load_snapshot: Option<PathBuf>,

    /// Stop after this many instructions.
    #[arg(long, value_name = "N")]
    cycle_limit: Option<u64>,

    /// Pass `!` lines straight to the guest.
    #[arg(long)]
    no_debugger: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace per instruction).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn run(args: &Args) -> Result<ExitCode> {
    let memory = ProgramLoader::load_file(&args.program)
        .with_context(|| format!("failed to load program {}", args.program.display()))?;

    let config = VmConfig::new()
        .with_dump_path(&args.dump_path)
        .with_snapshot_path(&args.snapshot_path)
        .with_cycle_limit(args.cycle_limit)
        .with_debugger(!args.no_debugger);

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut vm = VirtualMachine::new(config, memory, stdin, stdout);

    if let Some(path) = &args.load_snapshot {
        let state = snapshot::load_snapshot(path)
            .with_context(|| format!("failed to load snapshot {}", path.display()))?;
        vm.restore(state);
    }

    match vm.run() {
        Ok(RunOutcome::Halted(reason)) => {
            log::info!("halted ({}) after {} cycles", describe(reason), vm.cycles());
            Ok(ExitCode::SUCCESS)
        }
        Ok(RunOutcome::CycleLimit) => {
            eprintln!("cycle limit reached at pc {} after {} cycles", vm.pc(), vm.cycles());
            Ok(ExitCode::from(2))
        }
        Err(err) if err.is_fault() => {
            eprintln!("Runtime fault: {} (after {} cycles)", err, vm.cycles());
            Ok(ExitCode::from(3))
        }
        Err(err) => Err(err).context("execution stopped"),
    }
}

fn describe(reason: HaltReason) -> &'static str {
    match reason {
        HaltReason::Instruction => "halt instruction",
        HaltReason::EmptyReturn => "return with empty stack",
        HaltReason::Debugger => "debugger",
    }
}
