use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use simcom_modem::{ConnectionState, Identification, ModemConfig, PinStatus, SignalQuality};
use tracing::warn;

use crate::cmd::{open_modem, parse_duration, InfoArgs};
use crate::exit::{modem_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    port: String,
    baud: u32,
    state: ConnectionState,
    identification: Identification,
    pin_status: Option<PinStatus>,
    iccid: Option<String>,
    signal: Option<SignalQuality>,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let config = ModemConfig {
        default_timeout: timeout,
        ..ModemConfig::default()
    };
    let modem = open_modem(&args.port, config)?;

    let responsive = modem
        .verify()
        .map_err(|err| modem_error("verify failed", err))?;
    if !responsive {
        return Err(CliError::new(
            FAILURE,
            format!("{} did not answer AT", args.port.port),
        ));
    }

    let identification = modem
        .v25ter()
        .identify()
        .map_err(|err| modem_error("identify failed", err))?;

    let status = modem.status();
    let out = InfoOutput {
        port: args.port.port.clone(),
        baud: args.port.baud,
        state: modem.state(),
        identification,
        pin_status: optional("pin status", status.pin_status()),
        iccid: optional("iccid", status.iccid()),
        signal: optional("signal quality", status.signal_quality()),
    };

    print_info(&out, format);
    Ok(SUCCESS)
}

/// SIM-dependent queries fail on modules without a card; report them as absent.
fn optional<T>(what: &str, result: simcom_modem::Result<T>) -> Option<T> {
    result
        .inspect_err(|err| warn!(query = what, error = %err, "query failed"))
        .ok()
}

fn signal_text(signal: Option<&SignalQuality>) -> String {
    match signal {
        Some(quality) => {
            let scale = if quality.rscp { "RSCP" } else { "RSSI" };
            let strength = quality
                .strength_dbm
                .map(|dbm| format!("{dbm} dBm"))
                .unwrap_or_else(|| "unknown".to_string());
            format!("{scale} {strength}, BER class {}", quality.bit_error_rate)
        }
        None => "unavailable".to_string(),
    }
}

fn rows(out: &InfoOutput) -> Vec<(&'static str, String)> {
    let id = &out.identification;
    vec![
        ("Port", format!("{} @ {} baud", out.port, out.baud)),
        ("Manufacturer", id.manufacturer.clone()),
        ("Model", id.model.clone()),
        ("Revision", id.revision.clone()),
        ("IMEI", id.imei.clone()),
        ("Capabilities", id.capabilities.join(", ")),
        (
            "PIN status",
            out.pin_status
                .map(|status| status.to_string())
                .unwrap_or_else(|| "unavailable".to_string()),
        ),
        (
            "ICCID",
            out.iccid.clone().unwrap_or_else(|| "unavailable".to_string()),
        ),
        ("Signal", signal_text(out.signal.as_ref())),
    ]
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in rows(out) {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Modem Info:");
            for (field, value) in rows(out) {
                println!("  {:<14} {value}", format!("{field}:"));
            }
        }
        OutputFormat::Raw => println!("{}", out.identification.imei),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InfoOutput {
        InfoOutput {
            port: "/dev/ttyUSB2".to_string(),
            baud: 115_200,
            state: ConnectionState::Powered,
            identification: Identification {
                manufacturer: "SIMCOM INCORPORATED".to_string(),
                model: "SIMCOM_SIM7600E-H".to_string(),
                revision: "SIM7600M22_V1.1".to_string(),
                imei: "861234567890123".to_string(),
                capabilities: vec!["CGSM".to_string()],
            },
            pin_status: Some(PinStatus::Ready),
            iccid: None,
            signal: SignalQuality::from_codes(22, 0),
        }
    }

    #[test]
    fn info_serializes_state_and_signal() {
        let json = serde_json::to_value(sample()).expect("info should serialize");
        assert_eq!(json["state"], "powered");
        assert_eq!(json["pin_status"], "ready");
        assert_eq!(json["signal"]["strength_dbm"], -69);
        assert!(json["iccid"].is_null());
    }

    #[test]
    fn signal_text_formats_units() {
        let quality = SignalQuality::from_codes(22, 0);
        assert_eq!(signal_text(quality.as_ref()), "RSSI -69 dBm, BER class 0");
        assert_eq!(signal_text(None), "unavailable");

        let unknown = SignalQuality::from_codes(199, 99);
        assert_eq!(signal_text(unknown.as_ref()), "RSCP unknown, BER class 99");
    }

    #[test]
    fn optional_swallows_errors() {
        let failed: simcom_modem::Result<u8> = Err(simcom_modem::ModemError::NotPowered);
        assert_eq!(optional("x", failed), None);
        assert_eq!(optional("x", Ok(3)), Some(3));
    }
}
