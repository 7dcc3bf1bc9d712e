// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use super::authority;
use crate::{
    error::Result,
    outbound::{Outbound, OutboundSettings, Protocol, User, VnextServer, NONE},
};

pub(super) fn parse(rest: &str) -> Result<Outbound> {
    let link = authority::parse(rest)?;

    Ok(Outbound {
        tag: link.tag.clone(),
        protocol: Protocol::Vless,
        settings: OutboundSettings::Vnext {
            vnext: vec![VnextServer {
                address: link.host.to_string(),
                port: link.port,
                users: vec![User::Vless {
                    id: link.credential.to_string(),
                    encryption: NONE.to_string(),
                }],
            }],
        },
        stream_settings: link.stream_settings(),
    })
}
