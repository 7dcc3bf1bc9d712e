// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use log::debug;

use super::authority;
use crate::{
    error::Result,
    outbound::{Outbound, OutboundSettings, Protocol, TrojanServer},
};

pub(super) fn parse(rest: &str) -> Result<Outbound> {
    let link = authority::parse(rest)?;
    debug!("Parsed trojan link for {}:{}", link.host, link.port);

    Ok(Outbound {
        tag: link.tag.clone(),
        protocol: Protocol::Trojan,
        settings: OutboundSettings::Servers {
            servers: vec![TrojanServer {
                address: link.host.to_string(),
                port: link.port,
                password: link.credential.to_string(),
            }],
        },
        stream_settings: link.stream_settings(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn trojan_outbound_json() {
        let outbound =
            parse("s3cr3t@trojan.example.net:443?security=tls&type=tcp#Tokyo%201").unwrap();

        assert_eq!(
            serde_json::to_value(&outbound).unwrap(),
            json!({
                "tag": "Tokyo 1",
                "protocol": "trojan",
                "settings": {
                    "servers": [{
                        "address": "trojan.example.net",
                        "port": 443,
                        "password": "s3cr3t"
                    }]
                },
                "streamSettings": {
                    "network": "tcp",
                    "security": "tls",
                    "tcpSettings": { "header": { "type": "none" } }
                }
            })
        );
    }
}
