// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    link::parse_link,
    outbound::Outbound,
};

/// Result of converting a batch of share links: `{"outbounds": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedConfig {
    pub outbounds: Vec<Outbound>,
}

impl ConvertedConfig {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::InvalidJson)
    }
}

/// Convert one share link per line. Lines that do not parse are skipped.
pub fn convert_links(text: &str) -> Result<ConvertedConfig> {
    if text.is_empty() {
        return Err(Error::EmptyInput);
    }

    let text = text.replace('\r', "");
    let outbounds: Vec<_> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .filter_map(|(index, line)| {
            parse_link(line)
                .inspect_err(|err| warn!("Skipping share link #{}: {err}", index + 1))
                .ok()
        })
        .collect();

    info!("Converted {} share link(s)", outbounds.len());
    Ok(ConvertedConfig { outbounds })
}
