// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

//! Turns `vmess://`, `vless://` and `trojan://` share links into Xray outbounds and writes the
//! `config.json` the Xray core runs with. The core exposes a local socks inbound on
//! `127.0.0.1:1080`, which is the default proxy the tun2proxy bridge forwards to.

mod convert;
mod document;
mod error;
pub mod link;
pub mod outbound;

pub use crate::{
    convert::{convert_links, ConvertedConfig},
    document::{
        config_path, default_inbounds, default_log, default_routing, load_config, save_config,
        CONFIG_FILE_NAME, SOCKS_INBOUND_TAG, SOCKS_LISTEN_ADDR, SOCKS_LISTEN_PORT,
    },
    error::{Error, Result},
    link::parse_link,
    outbound::Outbound,
};
