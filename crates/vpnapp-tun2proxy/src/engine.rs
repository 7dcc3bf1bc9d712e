// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::{args::SessionArgs, error::Result};

/// A loaded tunneling engine.
///
/// Both calls resolve their entry point at call time. `run` blocks for as long as the engine's
/// own run routine does; `stop` may be called from another thread while `run` is blocked.
pub trait Engine: Send + Sync {
    /// Forward a session start. `Ok` carries the engine's own status code.
    fn run(&self, args: &SessionArgs) -> Result<i32>;

    /// Ask the engine to tear down its session. `Ok` carries the engine's own status code.
    fn stop(&self) -> Result<i32>;
}

/// Source of engine instances for the session bridge.
pub trait EngineProvider: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Engine>>;
}
