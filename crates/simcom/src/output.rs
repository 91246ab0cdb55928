use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct SendOutput {
    pub port: String,
    pub command: String,
    pub result: String,
    pub information: Vec<String>,
    pub unsolicited: Vec<String>,
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    port: &'a str,
    message: &'a str,
    timestamp: String,
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_reply(out: &SendOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "FRAME"]);
            for line in &out.information {
                table.add_row(vec!["information", line.as_str()]);
            }
            table.add_row(vec!["result", out.result.as_str()]);
            for line in &out.unsolicited {
                table.add_row(vec!["unsolicited", line.as_str()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{} -> {}", out.command, out.result);
            for line in &out.information {
                println!("  {line}");
            }
            for line in &out.unsolicited {
                println!("  (unsolicited) {line}");
            }
        }
        OutputFormat::Raw => {
            let mut text = String::new();
            for line in out.information.iter().chain(std::iter::once(&out.result)) {
                text.push_str(line);
                text.push('\n');
            }
            print_raw(text.as_bytes());
        }
    }
}

pub fn print_message(port: &str, message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&MessageOutput {
            port,
            message,
            timestamp: now_unix_seconds(),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TIME", "PORT", "MESSAGE"])
                .add_row(vec![now_unix_seconds().as_str(), port, message]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("[{}] {port}: {message}", now_unix_seconds()),
        OutputFormat::Raw => {
            print_raw(message.as_bytes());
            print_raw(b"\n");
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
