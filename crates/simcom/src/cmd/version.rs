use crate::cmd::envinfo::{defaults, target_triple};
use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("simcom {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let defaults = defaults();
    println!("name: simcom");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", target_triple());
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("modules: {}", simcom_modem::SIM7600_MODEL);
    println!("framing: {}", framing_summary());
    println!(
        "defaults: baud={} settle={}ms command_timeout={}ms drain={}ms",
        defaults.baud_rate,
        defaults.settle_window_ms,
        defaults.command_timeout_ms,
        defaults.drain_timeout_ms
    );
    println!("features: modem={}, cli=true", cfg!(feature = "modem"));

    Ok(SUCCESS)
}

/// Delimiter and command terminator, escaped for display.
fn framing_summary() -> String {
    let frame = simcom_frame::FrameConfig::default();
    let modem = simcom_modem::ModemConfig::default();
    format!(
        "frames delimited by \"{}\", commands terminated by \"{}\"",
        frame.delimiter.escape_ascii(),
        modem.command_terminator.escape_ascii()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_summary_escapes_control_bytes() {
        assert_eq!(
            framing_summary(),
            "frames delimited by \"\\r\\n\", commands terminated by \"\\r\""
        );
    }
}
