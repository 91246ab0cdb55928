use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use simcom_modem::ModemConfig;
use tracing::info;

use crate::cmd::{open_modem, parse_duration, ListenArgs};
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;

    // Each drain blocks for up to one interval while the port is quiet.
    let config = ModemConfig {
        drain_timeout: interval,
        ..ModemConfig::default()
    };
    let modem = open_modem(&args.port, config)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;
    info!(port = %args.port.port, "listening for unsolicited messages");

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        for message in modem.unsolicited_messages(true) {
            print_message(&args.port.port, &message, format);
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
