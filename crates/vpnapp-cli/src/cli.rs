// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vpnapp::{DnsStrategy, SessionArgs, SessionSettings, Verbosity};

#[derive(Parser, Clone, Debug)]
#[clap(author, version, about)]
pub(crate) struct CliArgs {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub(crate) enum Command {
    /// Convert share links into an Xray config.json.
    Convert(ConvertArgs),

    /// Hand a TUN descriptor to tun2proxy and run until Ctrl-C.
    Run(RunArgs),
}

#[derive(Args, Clone, Debug)]
pub(crate) struct ConvertArgs {
    /// File with one share link per line. Reads stdin when omitted.
    #[arg(short, long, value_parser = check_path)]
    pub(crate) input: Option<PathBuf>,

    /// Directory the config.json is written to.
    #[arg(short, long, default_value = ".")]
    pub(crate) output_dir: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub(crate) struct RunArgs {
    /// An already open TUN file descriptor.
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) tun_fd: i32,

    /// TOML file with session settings. Flags below override it.
    #[arg(short, long, value_parser = check_path)]
    pub(crate) settings: Option<PathBuf>,

    #[arg(long)]
    pub(crate) proxy_url: Option<String>,

    #[arg(long)]
    pub(crate) mtu: Option<u16>,

    /// Engine log level: off, error, warn, info, debug, trace or a raw number.
    #[arg(long)]
    pub(crate) verbosity: Option<Verbosity>,

    /// DNS strategy: virtual, over-tcp, direct or a raw number.
    #[arg(long)]
    pub(crate) dns: Option<DnsStrategy>,

    /// Let the engine close the descriptor when the session ends.
    #[arg(long)]
    pub(crate) close_fd_on_drop: bool,
}

impl RunArgs {
    pub(crate) fn session_args(&self, mut settings: SessionSettings) -> SessionArgs {
        if let Some(proxy_url) = &self.proxy_url {
            settings.proxy_url = proxy_url.clone();
        }
        if let Some(mtu) = self.mtu {
            settings.tun_mtu = mtu;
        }
        if let Some(verbosity) = self.verbosity {
            settings.verbosity = verbosity;
        }
        if let Some(dns) = self.dns {
            settings.dns_strategy = dns;
        }
        if self.close_fd_on_drop {
            settings.close_fd_on_drop = true;
        }
        settings.into_args(self.tun_fd)
    }
}

fn check_path(path: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(format!("Path {:?} does not exist", path));
    }
    if !path.is_file() {
        return Err(format!("Path {:?} is not a file", path));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> RunArgs {
        let cli = CliArgs::try_parse_from(["vpnapp-cli", "run"].iter().chain(args)).unwrap();
        match cli.command {
            Command::Run(run) => run,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_defaults() {
        let args = run_args(&["--tun-fd", "42"]).session_args(SessionSettings::default());
        assert_eq!(args, SessionArgs::new(42));
    }

    #[test]
    fn flags_override_settings() {
        let settings = SessionSettings {
            proxy_url: "http://10.1.1.1:3128".to_string(),
            tun_mtu: 9000,
            ..Default::default()
        };
        let args = run_args(&[
            "--tun-fd",
            "5",
            "--mtu",
            "1400",
            "--verbosity",
            "info",
            "--dns",
            "0",
            "--close-fd-on-drop",
        ])
        .session_args(settings);

        assert_eq!(args.proxy_url, "http://10.1.1.1:3128");
        assert_eq!(args.tun_mtu, 1400);
        assert_eq!(args.verbosity, Verbosity::INFO);
        assert_eq!(args.dns_strategy, DnsStrategy::VIRTUAL);
        assert!(args.close_fd_on_drop);
    }

    #[test]
    fn bad_verbosity_is_rejected() {
        let parsed =
            CliArgs::try_parse_from(["vpnapp-cli", "run", "--tun-fd", "3", "--verbosity", "loud"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_settings_file_is_rejected() {
        let parsed = CliArgs::try_parse_from([
            "vpnapp-cli",
            "run",
            "--tun-fd",
            "3",
            "--settings",
            "/nonexistent/vpnapp.toml",
        ]);
        assert!(parsed.is_err());
    }
}
