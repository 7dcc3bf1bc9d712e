// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use vpnapp::SessionSettings;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigSetupError {
    #[error("failed to parse config file {file}: {error}")]
    Parse {
        file: PathBuf,
        error: Box<toml::de::Error>,
    },

    #[error("failed to read config file {file}: {error}")]
    ReadConfig {
        file: PathBuf,
        error: std::io::Error,
    },
}

pub(crate) fn read_config_file<C>(file_path: &Path) -> Result<C, ConfigSetupError>
where
    C: DeserializeOwned,
{
    let file_content =
        fs::read_to_string(file_path).map_err(|error| ConfigSetupError::ReadConfig {
            file: file_path.to_path_buf(),
            error,
        })?;
    toml::from_str(&file_content).map_err(|error| ConfigSetupError::Parse {
        file: file_path.to_path_buf(),
        error: Box::new(error),
    })
}

/// Session settings from `path`, or the built-in defaults.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<SessionSettings, ConfigSetupError> {
    match path {
        Some(path) => {
            let settings = read_config_file(path)?;
            tracing::info!("Loaded session settings from {}", path.display());
            Ok(settings)
        }
        None => Ok(SessionSettings::default()),
    }
}
