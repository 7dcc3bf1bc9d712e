// Copyright 2023 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use std::env;

pub(crate) const LOG_TAG: &str = "libvpnapp";

/// Log filter used when `RUST_LOG` is unset.
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

pub(crate) fn log_level_from_env() -> String {
    env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
}

/// Route `log` records to logcat. Safe to call more than once.
pub(crate) fn init_logs(level: String) {
    use android_logger::{Config, FilterBuilder};

    android_logger::init_once(
        Config::default()
            .with_max_level(log::LevelFilter::Trace)
            .with_tag(LOG_TAG)
            .with_filter(FilterBuilder::new().parse(level.as_str()).build()),
    );
    log::debug!("Logger initialized");
}
