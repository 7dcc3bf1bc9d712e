// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    error::{Error, Result},
    outbound::{Outbound, OutboundSettings, Protocol, StreamSettings, User, VnextServer},
};

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// The JSON object carried base64-encoded in a `vmess://` link. Share generators disagree on
/// whether numbers are quoted, so both forms are accepted.
#[derive(Debug, Deserialize)]
struct VmessShare {
    #[serde(default, deserialize_with = "lenient_string")]
    ps: String,
    #[serde(deserialize_with = "lenient_string")]
    add: String,
    #[serde(deserialize_with = "lenient_int")]
    port: i64,
    #[serde(deserialize_with = "lenient_string")]
    id: String,
    #[serde(deserialize_with = "lenient_int")]
    aid: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    scy: String,
    #[serde(default, deserialize_with = "lenient_string")]
    net: String,
    #[serde(default, deserialize_with = "lenient_string")]
    tls: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    header_type: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    use serde::de::Error as _;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| D::Error::custom(format!("{n} is not an integer"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("{s:?} is not an integer"))),
        other => Err(D::Error::custom(format!("{other} is not an integer"))),
    }
}

fn decode(payload: &str) -> Result<Vec<u8>> {
    let payload = payload.trim();
    STANDARD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .map_err(Error::from)
}

pub(super) fn parse(payload: &str) -> Result<Outbound> {
    let share: VmessShare =
        serde_json::from_slice(&decode(payload)?).map_err(Error::InvalidVmess)?;

    let port = u16::try_from(share.port).map_err(|_| Error::InvalidPort {
        value: share.port.to_string(),
    })?;
    let alter_id = i32::try_from(share.aid).map_err(|_| {
        Error::InvalidVmess(serde::de::Error::custom(format!(
            "aid {} is out of range",
            share.aid
        )))
    })?;

    Ok(Outbound {
        tag: Some(share.ps),
        protocol: Protocol::Vmess,
        settings: OutboundSettings::Vnext {
            vnext: vec![VnextServer {
                address: share.add,
                port,
                users: vec![User::Vmess {
                    id: share.id,
                    alter_id,
                    security: share.scy,
                }],
            }],
        },
        stream_settings: StreamSettings::new(share.net, share.tls, share.header_type),
    })
}
