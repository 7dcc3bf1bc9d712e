// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! Native bridge between the vpnapp host and the `tun2proxy` engine.
//!
//! The engine is a separately built shared library that is loaded at runtime. This crate only
//! finds its entry points, forwards a start and a stop request, and makes sure at most one
//! session exists per process. Every outcome reaches the host as a single integer status:
//!
//! | code | `start` | `stop` |
//! |---|---|---|
//! | ≥ 0 | engine result | engine result |
//! | -1 | engine library not found | no active session |
//! | -2 | run entry point missing | stop entry point missing |
//! | -3 | session already active | |
//! | -4 | proxy url not representable | |
//!
//! `start` blocks until the engine's run routine returns. Hosts that need their control thread
//! back run it through [`BackgroundRunner`].

#[cfg(target_os = "android")]
pub mod android;
mod args;
mod background;
mod dynamic;
mod engine;
mod error;
#[cfg(target_os = "android")]
mod logging;
mod session;

pub use crate::{
    args::{
        DnsStrategy, ParseLevelError, SessionArgs, SessionSettings, Verbosity, DEFAULT_PROXY_URL,
        DEFAULT_TUN_MTU,
    },
    background::BackgroundRunner,
    dynamic::{DynamicEngine, DynamicEngineProvider, ENGINE_LIBRARY, RUN_SYMBOL, STOP_SYMBOL},
    engine::{Engine, EngineProvider},
    error::{
        status_code, Error, Result, STATUS_ENTRY_POINT_MISSING, STATUS_INVALID_ARGUMENT,
        STATUS_LIBRARY_NOT_FOUND, STATUS_NO_ACTIVE_SESSION, STATUS_SESSION_ALREADY_ACTIVE,
        STATUS_SPAWN_FAILED, STATUS_STOP_ENTRY_POINT_MISSING,
    },
    session::{global, start_session, stop_session, SessionBridge},
};
