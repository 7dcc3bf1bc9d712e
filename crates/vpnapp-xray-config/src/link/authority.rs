// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::{
    error::{Error, Result},
    outbound::{StreamSettings, NONE},
};

/// `<credential>@<host>:<port>[?key=value&...][#tag]`, shared by vless and trojan links.
#[derive(Debug)]
pub(super) struct AuthorityLink<'a> {
    pub(super) credential: &'a str,
    pub(super) host: &'a str,
    pub(super) port: u16,
    pub(super) params: HashMap<&'a str, &'a str>,
    pub(super) tag: Option<String>,
}

impl AuthorityLink<'_> {
    pub(super) fn stream_settings(&self) -> StreamSettings {
        let param = |key: &str| self.params.get(key).copied().unwrap_or(NONE);
        StreamSettings::new(param("type"), param("security"), param("headerType"))
    }
}

pub(super) fn parse(rest: &str) -> Result<AuthorityLink<'_>> {
    let (credential, server) = rest.split_once('@').ok_or(Error::MissingServer)?;

    let (server, tag) = match server.split_once('#') {
        Some((server, fragment)) => (server, Some(decode_tag(fragment))),
        None => (server, None),
    };
    let (authority, query) = server.split_once('?').unwrap_or((server, ""));

    let (host, port) = authority.rsplit_once(':').ok_or(Error::MissingPort)?;
    let host = host
        .strip_prefix('[')
        .and_then(|host| host.strip_suffix(']'))
        .unwrap_or(host);
    let port = port.parse::<u16>().map_err(|_| Error::InvalidPort {
        value: port.to_string(),
    })?;

    Ok(AuthorityLink {
        credential,
        host,
        port,
        params: parse_query(query),
        tag,
    })
}

// Pairs without exactly one '=' are dropped. Values are kept as written.
fn parse_query(query: &str) -> HashMap<&str, &str> {
    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => Some((key, value)),
                _ => None,
            }
        })
        .collect()
}

// Form decoding: '+' is a space.
fn decode_tag(fragment: &str) -> String {
    percent_decode_str(&fragment.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
