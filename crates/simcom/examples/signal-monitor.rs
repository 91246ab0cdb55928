//! Poll signal quality and print unsolicited messages in between.
//!
//! ```text
//! cargo run -p simcom --example signal-monitor -- /dev/ttyUSB2
//! ```

use std::thread;
use std::time::Duration;

use simcom::modem::Modem;
use simcom::transport::{SerialPortTransport, DEFAULT_BAUD_RATE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB2".to_string());

    let modem = Modem::new(SerialPortTransport::new(port.as_str(), DEFAULT_BAUD_RATE));
    modem.open()?;

    let id = modem.v25ter().identify()?;
    println!("{} {} (IMEI {})", id.manufacturer, id.model, id.imei);

    loop {
        match modem.status().signal_quality() {
            Ok(quality) => match quality.strength_dbm {
                Some(dbm) => println!("signal: {dbm} dBm, BER class {}", quality.bit_error_rate),
                None => println!("signal: unknown"),
            },
            Err(err) => eprintln!("signal query failed: {err}"),
        }

        for message in modem.unsolicited_messages(true) {
            println!("unsolicited: {message}");
        }

        thread::sleep(Duration::from_secs(5));
    }
}
