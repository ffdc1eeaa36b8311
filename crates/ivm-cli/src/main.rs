use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Integer bytecode virtual machine.
///
/// Loads a JSON program image (code, globals and function table) and
/// executes it from the entry function's address.
///
/// EXAMPLES:
///     ivm run prog.json              Run an image
///     ivm run prog.json --trace      Trace every instruction to stderr
///     ivm disasm prog.json           Print a listing
///     ivm sample factorial --arg 6   Run a built-in sample
///
/// ENVIRONMENT VARIABLES:
///     IVM_STACK_SIZE      Operand stack capacity
///     IVM_MAX_CALL_DEPTH  Maximum number of live frames
///     IVM_TRACE           Set to 'true' to trace by default
///     RUST_LOG            Log filter for diagnostics on stderr
#[derive(Parser)]
#[command(name = "ivm")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Emit debug diagnostics on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON program image
    ///
    /// EXAMPLES:
    ///     ivm run prog.json
    ///     ivm run prog.json --start 21 --trace
    #[command(visible_alias = "r")]
    Run {
        /// Path to the program image
        file: PathBuf,
        /// Start address (defaults to the entry function's address)
        #[arg(long)]
        start: Option<usize>,
        /// Trace every instruction to stderr
        #[arg(long, short = 't')]
        trace: bool,
        /// Explicit config file instead of the discovered ivm.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Disassemble a JSON program image
    #[command(visible_alias = "d")]
    Disasm {
        /// Path to the program image
        file: PathBuf,
    },

    /// Run one of the built-in sample programs
    ///
    /// EXAMPLES:
    ///     ivm sample hello
    ///     ivm sample factorial --arg 10
    ///     ivm sample call --emit > call.json
    Sample {
        /// Sample name: hello, loop, factorial or call
        name: String,
        /// Trace every instruction to stderr
        #[arg(long, short = 't')]
        trace: bool,
        /// Argument for the factorial sample
        #[arg(long)]
        arg: Option<i32>,
        /// Print the sample as a JSON image instead of running it
        #[arg(long)]
        emit: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            file,
            start,
            trace,
            config,
        } => {
            let settings = commands::load_settings(config.as_deref(), trace)?;
            commands::run::run(&file, start, &settings)?;
        }
        Commands::Disasm { file } => {
            commands::disasm::run(&file)?;
        }
        Commands::Sample {
            name,
            trace,
            arg,
            emit,
        } => {
            if emit {
                commands::sample::emit(&name, arg)?;
            } else {
                let settings = commands::load_settings(None, trace)?;
                commands::sample::run(&name, arg, &settings)?;
            }
        }
    }

    Ok(())
}

/// Install the stderr subscriber; RUST_LOG wins over the verbosity flag
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|expr| EnvFilter::try_new(expr).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
