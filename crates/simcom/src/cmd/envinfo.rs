use std::collections::BTreeMap;

use serde::Serialize;
use simcom_frame::FrameConfig;
use simcom_modem::ModemConfig;

use crate::cmd::EnvinfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

const ENV_VARS: [&str; 3] = ["SIMCOM_PORT", "SIMCOM_BAUD", "RUST_LOG"];

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
pub(crate) struct DefaultsInfo {
    pub(crate) baud_rate: u32,
    pub(crate) command_timeout_ms: u128,
    pub(crate) drain_timeout_ms: u128,
    pub(crate) settle_window_ms: u128,
    pub(crate) poll_interval_ms: u128,
}

#[derive(Serialize)]
struct EnvInfoOutput {
    version: String,
    target: String,
    rust_version: String,
    git_hash: String,
    platform: PlatformInfo,
    features: Vec<String>,
    defaults: DefaultsInfo,
    dependencies: BTreeMap<String, String>,
    environment: BTreeMap<String, Option<String>>,
}

pub fn run(_args: EnvinfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut deps = BTreeMap::new();
    deps.insert("clap".to_string(), "4.5".to_string());
    deps.insert("serialport".to_string(), "4".to_string());
    deps.insert("tracing".to_string(), "0.1".to_string());

    let environment = ENV_VARS
        .iter()
        .map(|name| (name.to_string(), std::env::var(name).ok()))
        .collect();

    let output = EnvInfoOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        target: target_triple(),
        rust_version: option_env!("RUSTC_VERSION")
            .unwrap_or("unknown")
            .to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        platform: PlatformInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        features: active_features(),
        defaults: defaults(),
        dependencies: deps,
        environment,
    };

    print_envinfo(&output, format);
    Ok(SUCCESS)
}

pub(crate) fn defaults() -> DefaultsInfo {
    let modem = ModemConfig::default();
    let frame = FrameConfig::default();
    DefaultsInfo {
        baud_rate: simcom_transport::DEFAULT_BAUD_RATE,
        command_timeout_ms: modem.default_timeout.as_millis(),
        drain_timeout_ms: modem.drain_timeout.as_millis(),
        settle_window_ms: frame.settle_window.as_millis(),
        poll_interval_ms: frame.poll_interval.as_millis(),
    }
}

pub(crate) fn target_triple() -> String {
    if let Some(target) = option_env!("SIMCOM_BUILD_TARGET") {
        return target.to_string();
    }

    match (std::env::consts::ARCH, std::env::consts::OS) {
        ("aarch64", "macos") => "aarch64-apple-darwin".to_string(),
        ("x86_64", "macos") => "x86_64-apple-darwin".to_string(),
        ("aarch64", "linux") => "aarch64-unknown-linux-gnu".to_string(),
        ("arm", "linux") => "armv7-unknown-linux-gnueabihf".to_string(),
        ("x86_64", "linux") => "x86_64-unknown-linux-gnu".to_string(),
        ("x86_64", "windows") => "x86_64-pc-windows-msvc".to_string(),
        (arch, os) => format!("{arch}-unknown-{os}"),
    }
}

fn print_envinfo(output: &EnvInfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("simcom environment\n");
            println!("  Version:    {}", output.version);
            println!("  Target:     {}", output.target);
            println!("  Rust:       {}", output.rust_version);
            println!("  Git hash:   {}", output.git_hash);
            println!(
                "  Platform:   {} ({})",
                output.platform.os, output.platform.arch
            );
            println!("  Features:   {}", output.features.join(", "));
            println!("\n  Defaults:");
            println!("    {:<16} {}", "baud", output.defaults.baud_rate);
            println!("    {:<16} {}ms", "command timeout", output.defaults.command_timeout_ms);
            println!("    {:<16} {}ms", "drain timeout", output.defaults.drain_timeout_ms);
            println!("    {:<16} {}ms", "settle window", output.defaults.settle_window_ms);
            println!("    {:<16} {}ms", "poll interval", output.defaults.poll_interval_ms);
            println!("\n  Dependencies:");
            for (k, v) in &output.dependencies {
                println!("    {:<12} {}", k, v);
            }
            println!("\n  Environment:");
            for (k, v) in &output.environment {
                println!("    {:<20} {}", k, v.as_deref().unwrap_or("(not set)"));
            }
        }
        OutputFormat::Raw => println!("{}", output.version),
    }
}

fn active_features() -> Vec<String> {
    let mut features = Vec::new();
    if cfg!(feature = "modem") {
        features.push("modem".to_string());
    }
    if cfg!(feature = "cli") {
        features.push("cli".to_string());
    }
    features
}
