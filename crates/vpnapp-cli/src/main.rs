// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    fs,
    io::{self, Read},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use vpnapp::{BackgroundRunner, STATUS_NO_ACTIVE_SESSION};

use crate::cli::{Command, ConvertArgs, RunArgs};

mod cli;
mod config;
mod logging;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, PartialEq, Eq)]
enum AfterStop {
    /// The engine accepted the stop or the run thread is already gone.
    Join,
    /// No session yet, the engine is still being loaded.
    Retry,
    /// The engine cannot be stopped; joining would block forever.
    Abort(i32),
}

fn after_stop(stop_status: Option<i32>) -> AfterStop {
    match stop_status {
        None => AfterStop::Join,
        Some(code) if code >= 0 => {
            tracing::info!("tun2proxy stop returned {code}");
            AfterStop::Join
        }
        Some(STATUS_NO_ACTIVE_SESSION) => AfterStop::Retry,
        Some(code) => AfterStop::Abort(code),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::CliArgs::parse();
    logging::setup_logging();

    match args.command {
        Command::Convert(ref convert_args) => convert(convert_args),
        Command::Run(ref run_args) => run(run_args).await,
    }
}

fn convert(args: &ConvertArgs) -> Result<()> {
    let text = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read share links from stdin")?;
            text
        }
    };

    let converted = vpnapp_xray_config::convert_links(&text)?;
    if converted.outbounds.is_empty() {
        tracing::warn!("No usable share links found");
    }

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;
    let path = vpnapp_xray_config::save_config(&converted.to_json()?, &args.output_dir)?;
    println!("{}", path.display());
    Ok(())
}

async fn run(args: &RunArgs) -> Result<()> {
    let settings = config::load_settings(args.settings.as_deref())?;
    let session_args = args.session_args(settings);
    tracing::info!(
        "Starting tun2proxy on fd {} via {} (mtu {}, dns {}, verbosity {})",
        session_args.tun_fd,
        session_args.proxy_url,
        session_args.tun_mtu,
        session_args.dns_strategy,
        session_args.verbosity,
    );

    let runner = BackgroundRunner::new(vpnapp::global());
    runner.start(session_args)?;

    let mut ctrl_c = Box::pin(tokio::signal::ctrl_c());
    let mut poll = tokio::time::interval(EXIT_POLL_INTERVAL);

    loop {
        tokio::select! {
            result = ctrl_c.as_mut() => {
                result.context("failed to listen for Ctrl-C")?;
                tracing::info!("Received Ctrl-C, stopping tun2proxy");
                match after_stop(runner.stop()) {
                    AfterStop::Join => break,
                    AfterStop::Retry => {
                        tracing::warn!("tun2proxy is still starting, press Ctrl-C again to stop it");
                        ctrl_c.set(tokio::signal::ctrl_c());
                    }
                    AfterStop::Abort(code) => bail!("failed to stop tun2proxy: status {code}"),
                }
            }
            _ = poll.tick() => {
                if !runner.is_running() {
                    break;
                }
            }
        }
    }

    let code = tokio::task::spawn_blocking(move || runner.join())
        .await
        .context("failed to wait for the tun2proxy thread")?;
    match code {
        Some(0) => Ok(()),
        Some(code) => bail!("tun2proxy exited with status {code}"),
        None => bail!("tun2proxy run thread ended abnormally"),
    }
}
