// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

//! The `config.json` document handed to the Xray core.
//!
//! Saving always rewrites the `log`, `inbounds`, `outbounds` and `routing` sections and keeps
//! any other top-level key already present in the file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;
use serde::Serialize;
use serde_json::{json, ser::PrettyFormatter, Map, Value};

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const SOCKS_INBOUND_TAG: &str = "socks";
pub const SOCKS_LISTEN_ADDR: &str = "127.0.0.1";
pub const SOCKS_LISTEN_PORT: u16 = 1080;

pub fn default_log() -> Value {
    json!({
        "loglevel": "debug",
        "access": "",
        "error": "",
    })
}

/// Local socks inbound the tun2proxy engine forwards to.
pub fn default_inbounds() -> Value {
    json!([{
        "tag": SOCKS_INBOUND_TAG,
        "port": SOCKS_LISTEN_PORT,
        "listen": SOCKS_LISTEN_ADDR,
        "protocol": "socks",
        "sniffing": {
            "enabled": true,
            "destOverride": ["http", "tls"],
        },
        "settings": {
            "auth": "noauth",
            "udp": true,
            "allowTransparent": false,
        },
    }])
}

pub fn default_routing() -> Value {
    json!({
        "domainStrategy": "IPIfNonMatch",
        "domainMatcher": "hybrid",
        "rules": [
            {
                "type": "field",
                "domain": ["geosite:category-ads-all"],
                "outboundTag": "block",
            },
            {
                "type": "field",
                "domain": ["geosite:cn"],
                "outboundTag": "direct",
            },
            {
                "type": "field",
                "ip": ["geoip:private", "geoip:cn"],
                "outboundTag": "direct",
            },
            {
                "type": "field",
                "port": "0-65535",
                "outboundTag": "proxy",
            },
        ],
    })
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Merge converted outbounds (`{"outbounds": [...]}` as JSON) into `<dir>/config.json`.
pub fn save_config(converted: &str, dir: &Path) -> Result<PathBuf> {
    if converted.is_empty() {
        return Err(Error::NoConfig);
    }
    let converted = parse_object(converted, "converted config")?;

    let file = config_path(dir);
    let mut document = if file.exists() {
        let contents = fs::read_to_string(&file).map_err(|error| Error::ReadConfig {
            file: file.clone(),
            error,
        })?;
        parse_object(&contents, &file.display().to_string())?
    } else {
        Map::new()
    };

    document.insert("log".to_string(), default_log());
    document.insert("inbounds".to_string(), default_inbounds());
    match converted.get("outbounds") {
        Some(outbounds @ Value::Array(_)) => {
            document.insert("outbounds".to_string(), outbounds.clone());
        }
        _ => {
            document.remove("outbounds");
        }
    }
    document.insert("routing".to_string(), default_routing());

    fs::write(&file, to_pretty_json(&document)?).map_err(|error| Error::WriteConfig {
        file: file.clone(),
        error,
    })?;
    info!("Config saved to {}", file.display());
    Ok(file)
}

/// Contents of `<dir>/config.json`, if it exists.
pub fn load_config(dir: &Path) -> Result<Option<String>> {
    let file = config_path(dir);
    if !file.exists() {
        return Ok(None);
    }
    fs::read_to_string(&file)
        .map(Some)
        .map_err(|error| Error::ReadConfig { file, error })
}

fn parse_object(json: &str, what: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(json).map_err(Error::InvalidJson)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::NotAnObject {
            what: what.to_string(),
        }),
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(Error::InvalidJson)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert_links;

    #[test]
    fn save_into_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let converted = convert_links("trojan://pw@t.example:443#T").unwrap();

        let path = save_config(&converted.to_json().unwrap(), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("config.json"));

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["log"], default_log());
        assert_eq!(saved["inbounds"][0]["port"], 1080);
        assert_eq!(saved["outbounds"][0]["protocol"], "trojan");
        assert_eq!(saved["routing"]["rules"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn save_keeps_unrelated_keys_and_replaces_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            r#"{"dns": {"servers": ["1.1.1.1"]}, "outbounds": [{"tag": "old"}], "log": {}}"#,
        )
        .unwrap();

        save_config(r#"{"outbounds": [{"tag": "new"}]}"#, dir.path()).unwrap();

        let saved: Value =
            serde_json::from_str(&load_config(dir.path()).unwrap().unwrap()).unwrap();
        assert_eq!(saved["dns"]["servers"][0], "1.1.1.1");
        assert_eq!(saved["outbounds"], json!([{"tag": "new"}]));
        assert_eq!(saved["log"]["loglevel"], "debug");
    }

    #[test]
    fn missing_outbounds_removes_the_section() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(config_path(dir.path()), r#"{"outbounds": [{"tag": "old"}]}"#).unwrap();

        save_config(r#"{"something": 1}"#, dir.path()).unwrap();

        let saved: Value =
            serde_json::from_str(&load_config(dir.path()).unwrap().unwrap()).unwrap();
        assert!(saved.get("outbounds").is_none());
        assert!(saved.get("routing").is_some());
    }

    #[test]
    fn output_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        save_config(r#"{"outbounds": []}"#, dir.path()).unwrap();
        let text = load_config(dir.path()).unwrap().unwrap();
        assert!(text.starts_with("{\n    \""));
    }

    #[test]
    fn empty_and_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(save_config("", dir.path()), Err(Error::NoConfig)));
        assert!(matches!(
            save_config("[1, 2]", dir.path()),
            Err(Error::NotAnObject { .. })
        ));
        assert!(matches!(
            save_config("{", dir.path()),
            Err(Error::InvalidJson(_))
        ));
        assert!(!config_path(dir.path()).exists());
    }

    #[test]
    fn load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), None);
    }
}
