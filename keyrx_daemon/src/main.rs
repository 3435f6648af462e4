//! keyrx — OS-level keyboard remapping daemon and CLI.
//!
//! Intercepts keyboard events via evdev, remaps them through `keyrx_core`,
//! and injects the result through a virtual uinput device.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use keyrx_daemon::cli::error::format_cli_error;
use keyrx_daemon::cli::{devices, run, status};
use keyrx_daemon::daemon::exit_code_for;
use keyrx_daemon::ipc::DEFAULT_SOCKET_PATH;

#[derive(Parser)]
#[command(name = "keyrx", version, about = "Keyboard remapping daemon")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit machine-readable JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon in the foreground.
    Run {
        /// Path to a compiled `.krx` configuration.
        #[arg(short, long)]
        config: PathBuf,

        /// Only manage devices whose name/path/serial matches this pattern
        /// (supports `*` wildcard and trailing-`*` prefix match).
        #[arg(short, long, default_value = "*")]
        device: String,
    },
    /// List evdev devices recognized as keyboards.
    Devices,
    /// Query a running daemon's status over its IPC socket.
    Status {
        #[arg(long, default_value = DEFAULT_SOCKET_PATH)]
        socket: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, device } => match run::run(run::RunArgs { config, device_pattern: device }) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", format_cli_error(&e, cli.json));
                ExitCode::from(exit_code_for(&e))
            }
        },
        Commands::Devices => match devices::list_devices() {
            Ok(devices) => {
                if cli.json {
                    println!("{}", serde_json::to_string(&devices).expect("device list always serializes"));
                } else {
                    for d in &devices {
                        println!("{}  {}{}", d.path, d.name, d.serial.as_deref().map(|s| format!("  (serial: {s})")).unwrap_or_default());
                    }
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Status { socket } => match status::status(socket) {
            Ok(s) => {
                if cli.json {
                    println!("{}", serde_json::to_string(&s).expect("status always serializes"));
                } else {
                    println!("running: {}\nuptime: {}s\ndevices: {}", s.running, s.uptime_secs, s.device_count);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", format_cli_error(&e, cli.json));
                ExitCode::from(exit_code_for(&e))
            }
        },
    }
}
