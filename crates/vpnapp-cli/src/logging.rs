// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: GPL-3.0-only

use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Compact stderr logging filtered by `RUST_LOG`, `info` by default. Also picks up records the
/// libraries emit through `log`.
pub(crate) fn setup_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
