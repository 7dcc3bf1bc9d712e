// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

//! Share link parsing. Each supported scheme becomes one Xray [`Outbound`].

mod authority;
mod trojan;
mod vless;
mod vmess;

use crate::{
    error::{Error, Result},
    outbound::Outbound,
};

pub const VMESS_PREFIX: &str = "vmess://";
pub const VLESS_PREFIX: &str = "vless://";
pub const TROJAN_PREFIX: &str = "trojan://";

pub fn parse_link(link: &str) -> Result<Outbound> {
    if let Some(payload) = link.strip_prefix(VMESS_PREFIX) {
        vmess::parse(payload)
    } else if let Some(rest) = link.strip_prefix(VLESS_PREFIX) {
        vless::parse(rest)
    } else if let Some(rest) = link.strip_prefix(TROJAN_PREFIX) {
        trojan::parse(rest)
    } else {
        let scheme = link.split_once("://").map_or("", |(scheme, _)| scheme);
        Err(Error::UnsupportedScheme {
            scheme: scheme.to_string(),
        })
    }
}
