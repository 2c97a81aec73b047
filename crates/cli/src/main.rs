mod cmd;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use slsrust_lib::platform::HostPlatform;

use cmd::ServiceArgs;
use output::{OutputFormat, print_error};

/// slsrust - Build Rust functions for serverless `provided` runtimes
#[derive(Parser)]
#[command(name = "slsrust")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build every Rust function and stage its binary as `bootstrap`
  Build {
    #[command(flatten)]
    service: ServiceArgs,

    /// Build as if running on this host (linux, darwin, win32, other)
    #[arg(long)]
    host: Option<HostPlatform>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Remove the `bootstrap` staged by a previous build
  Clean {
    #[command(flatten)]
    service: ServiceArgs,
  },

  /// Build, run a packaging command, then clean
  Package {
    #[command(flatten)]
    service: ServiceArgs,

    /// Build as if running on this host (linux, darwin, win32, other)
    #[arg(long)]
    host: Option<HostPlatform>,

    /// Packaging command to run after the build, e.g. `-- zip fn.zip bootstrap`
    #[arg(last = true)]
    command: Vec<String>,
  },

  /// Print the JSON schema of the function-level `rust` block
  Schema,

  /// Show the build setup for this host
  Info {
    /// Show the setup for another host (linux, darwin, win32, other)
    #[arg(long)]
    host: Option<HostPlatform>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Build { service, host, output } => cmd::cmd_build(&service, host, output),
    Commands::Clean { service } => cmd::cmd_clean(&service),
    Commands::Package { service, host, command } => cmd::cmd_package(&service, host, &command),
    Commands::Schema => cmd::cmd_schema(),
    Commands::Info { host, output } => cmd::cmd_info(host, output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
