use std::time::Duration;

use clap::{Args, Subcommand};
use simcom_modem::{Modem, ModemConfig};
use simcom_transport::{SerialPortTransport, DEFAULT_BAUD_RATE};

use crate::exit::{modem_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod envinfo;
pub mod info;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one AT command and print its reply.
    Send(SendArgs),
    /// Print unsolicited messages as they arrive.
    Listen(ListenArgs),
    /// Identify the module and report its signal quality.
    Info(InfoArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct PortArgs {
    /// Serial device of the AT port (e.g. /dev/ttyUSB2, COM5).
    #[arg(env = "SIMCOM_PORT")]
    pub port: String,
    /// Baud rate.
    #[arg(long, env = "SIMCOM_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// AT command, without terminator.
    pub command: String,
    /// Substring identifying the result frame.
    #[arg(long, default_value = "OK", conflicts_with = "first_frame")]
    pub expect: Option<String>,
    /// Take the first frame of the reply as the result.
    #[arg(long)]
    pub first_frame: bool,
    /// Substring marking a failed command (repeatable).
    #[arg(long = "error", value_name = "MARKER", default_value = "ERROR")]
    pub errors: Vec<String>,
    /// Substring marking information text of the reply (repeatable).
    #[arg(long, value_name = "MARKER")]
    pub collect: Vec<String>,
    /// Maximum time to wait for the reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// How long each poll waits for traffic (e.g. 1s, 250ms).
    #[arg(long, default_value = "1s")]
    pub interval: String,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Per-command timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}

/// Open the port as an externally powered modem.
pub(crate) fn open_modem(
    port: &PortArgs,
    config: ModemConfig,
) -> CliResult<Modem<SerialPortTransport>> {
    let transport = SerialPortTransport::new(port.port.as_str(), port.baud);
    let modem = Modem::with_config(transport, config);
    modem
        .open()
        .map_err(|err| modem_error(&format!("open {} failed", port.port), err))?;
    Ok(modem)
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if unit == "ms" {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}
