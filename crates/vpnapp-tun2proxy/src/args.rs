// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, os::raw::c_int, str::FromStr};

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROXY_URL: &str = "socks5://127.0.0.1:1080";
pub const DEFAULT_TUN_MTU: u16 = 1500;

/// Engine log level. Values the engine does not know are carried through unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Verbosity(pub c_int);

impl Verbosity {
    pub const OFF: Self = Self(0);
    pub const ERROR: Self = Self(1);
    pub const WARN: Self = Self(2);
    pub const INFO: Self = Self(3);
    pub const DEBUG: Self = Self(4);
    pub const TRACE: Self = Self(5);

    const NAMES: [(&'static str, Self); 6] = [
        ("off", Self::OFF),
        ("error", Self::ERROR),
        ("warn", Self::WARN),
        ("info", Self::INFO),
        ("debug", Self::DEBUG),
        ("trace", Self::TRACE),
    ];

    pub fn name(self) -> Option<&'static str> {
        lookup_name(&Self::NAMES, self)
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::TRACE
    }
}

/// How the engine handles DNS. Opaque to the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DnsStrategy(pub c_int);

impl DnsStrategy {
    pub const VIRTUAL: Self = Self(0);
    pub const OVER_TCP: Self = Self(1);
    pub const DIRECT: Self = Self(2);

    const NAMES: [(&'static str, Self); 3] = [
        ("virtual", Self::VIRTUAL),
        ("over-tcp", Self::OVER_TCP),
        ("direct", Self::DIRECT),
    ];

    pub fn name(self) -> Option<&'static str> {
        lookup_name(&Self::NAMES, self)
    }
}

impl Default for DnsStrategy {
    fn default() -> Self {
        Self::DIRECT
    }
}

fn lookup_name<T: PartialEq + Copy>(names: &[(&'static str, T)], value: T) -> Option<&'static str> {
    names
        .iter()
        .find(|(_, candidate)| *candidate == value)
        .map(|(name, _)| *name)
}

fn parse_named<T: Copy>(
    names: &[(&'static str, T)],
    raw: fn(c_int) -> T,
    s: &str,
) -> Result<T, ParseLevelError> {
    let s = s.trim();
    if let Ok(value) = s.parse::<c_int>() {
        return Ok(raw(value));
    }
    names
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s))
        .map(|(_, value)| *value)
        .ok_or_else(|| ParseLevelError(s.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized value: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Verbosity {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Self::NAMES, Self, s)
    }
}

impl FromStr for DnsStrategy {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(&Self::NAMES, Self, s)
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unknown({})", self.0),
        }
    }
}

impl fmt::Display for DnsStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unknown({})", self.0),
        }
    }
}

/// Arguments for a single engine session. Not retained by the bridge after the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionArgs {
    pub proxy_url: String,
    pub tun_fd: c_int,
    pub close_fd_on_drop: bool,
    pub tun_mtu: u16,
    pub verbosity: Verbosity,
    pub dns_strategy: DnsStrategy,
}

impl SessionArgs {
    pub fn new(tun_fd: c_int) -> Self {
        SessionSettings::default().into_args(tun_fd)
    }

    pub fn proxy_url(&mut self, proxy_url: impl Into<String>) -> &mut Self {
        self.proxy_url = proxy_url.into();
        self
    }

    pub fn close_fd_on_drop(&mut self, close_fd_on_drop: bool) -> &mut Self {
        self.close_fd_on_drop = close_fd_on_drop;
        self
    }

    pub fn tun_mtu(&mut self, tun_mtu: u16) -> &mut Self {
        self.tun_mtu = tun_mtu;
        self
    }

    pub fn verbosity(&mut self, verbosity: Verbosity) -> &mut Self {
        self.verbosity = verbosity;
        self
    }

    pub fn dns_strategy(&mut self, dns_strategy: DnsStrategy) -> &mut Self {
        self.dns_strategy = dns_strategy;
        self
    }
}

/// Everything in [`SessionArgs`] except the descriptor, in a form that can live in a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub proxy_url: String,
    pub tun_mtu: u16,
    pub verbosity: Verbosity,
    pub dns_strategy: DnsStrategy,
    pub close_fd_on_drop: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            tun_mtu: DEFAULT_TUN_MTU,
            verbosity: Verbosity::default(),
            dns_strategy: DnsStrategy::default(),
            close_fd_on_drop: false,
        }
    }
}

impl SessionSettings {
    pub fn into_args(self, tun_fd: c_int) -> SessionArgs {
        SessionArgs {
            proxy_url: self.proxy_url,
            tun_fd,
            close_fd_on_drop: self.close_fd_on_drop,
            tun_mtu: self.tun_mtu,
            verbosity: self.verbosity,
            dns_strategy: self.dns_strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_mobile_host() {
        let args = SessionArgs::new(7);
        assert_eq!(args.proxy_url, "socks5://127.0.0.1:1080");
        assert_eq!(args.tun_fd, 7);
        assert!(!args.close_fd_on_drop);
        assert_eq!(args.tun_mtu, 1500);
        assert_eq!(args.verbosity, Verbosity(5));
        assert_eq!(args.dns_strategy, DnsStrategy(2));
    }

    #[test]
    fn parse_names_and_raw_values() {
        assert_eq!("Debug".parse::<Verbosity>().unwrap(), Verbosity::DEBUG);
        assert_eq!("9".parse::<Verbosity>().unwrap(), Verbosity(9));
        assert_eq!("over-tcp".parse::<DnsStrategy>().unwrap(), DnsStrategy::OVER_TCP);
        assert!("loud".parse::<Verbosity>().is_err());
    }

    #[test]
    fn unknown_values_display_raw() {
        assert_eq!(Verbosity::INFO.to_string(), "info");
        assert_eq!(DnsStrategy(42).to_string(), "unknown(42)");
    }

    #[test]
    fn settings_fill_missing_fields_from_defaults() {
        let settings: SessionSettings = toml::from_str(
            r#"
            proxy_url = "http://10.0.0.1:8080"
            verbosity = 3
            "#,
        )
        .unwrap();
        assert_eq!(settings.proxy_url, "http://10.0.0.1:8080");
        assert_eq!(settings.verbosity, Verbosity::INFO);
        assert_eq!(settings.tun_mtu, DEFAULT_TUN_MTU);
        assert_eq!(settings.dns_strategy, DnsStrategy::DIRECT);
    }

    #[test]
    fn builder_overrides_defaults() {
        let mut args = SessionArgs::new(3);
        args.proxy_url("socks5://192.168.1.2:9050")
            .close_fd_on_drop(true)
            .tun_mtu(1280)
            .verbosity(Verbosity::WARN)
            .dns_strategy(DnsStrategy::VIRTUAL);
        assert_eq!(args.proxy_url, "socks5://192.168.1.2:9050");
        assert!(args.close_fd_on_drop);
        assert_eq!(args.tun_mtu, 1280);
        assert_eq!(args.verbosity, Verbosity::WARN);
        assert_eq!(args.dns_strategy, DnsStrategy::VIRTUAL);
    }
}
