// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no share links given")]
    EmptyInput,

    #[error("no config to save")]
    NoConfig,

    #[error("unsupported share link scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("vmess payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("vmess payload is not a valid share object: {0}")]
    InvalidVmess(#[source] serde_json::Error),

    #[error("share link has no server part")]
    MissingServer,

    #[error("share link has no port")]
    MissingPort,

    #[error("invalid port: {value}")]
    InvalidPort { value: String },

    #[error("invalid config json: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("{what} is not a json object")]
    NotAnObject { what: String },

    #[error("failed to read config file {file}: {error}")]
    ReadConfig {
        file: PathBuf,
        error: std::io::Error,
    },

    #[error("failed to write config file {file}: {error}")]
    WriteConfig {
        file: PathBuf,
        error: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
