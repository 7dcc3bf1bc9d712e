// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

/// Status returned when the engine library cannot be loaded.
pub const STATUS_LIBRARY_NOT_FOUND: i32 = -1;
/// Status returned when the run entry point is not exported by the engine.
pub const STATUS_ENTRY_POINT_MISSING: i32 = -2;
/// Status returned when a session is already active.
pub const STATUS_SESSION_ALREADY_ACTIVE: i32 = -3;
/// Status returned when `stop` is called without an active session.
pub const STATUS_NO_ACTIVE_SESSION: i32 = -1;
/// Status returned when the stop entry point is not exported by the engine.
pub const STATUS_STOP_ENTRY_POINT_MISSING: i32 = -2;
/// Status returned when an argument cannot be marshaled for the engine.
pub const STATUS_INVALID_ARGUMENT: i32 = -4;
/// Status returned when the background run thread cannot be spawned.
pub const STATUS_SPAWN_FAILED: i32 = -5;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load engine library {name}: {reason}")]
    LibraryNotFound { name: String, reason: String },

    #[error("engine library does not export {symbol}")]
    EntryPointMissing { symbol: &'static str },

    #[error("a tun2proxy session is already active")]
    SessionAlreadyActive,

    #[error("no active tun2proxy session")]
    NoActiveSession,

    #[error("engine library does not export {symbol}")]
    StopEntryPointMissing { symbol: &'static str },

    #[error("proxy url contains nul byte")]
    ProxyUrlContainsNulByte,

    #[error("failed to read proxy url from the host: {details}")]
    ReadProxyUrl { details: String },

    #[error("failed to spawn the engine thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl Error {
    /// Integer status reported to the host for this error.
    pub fn status_code(&self) -> i32 {
        match self {
            Error::LibraryNotFound { .. } => STATUS_LIBRARY_NOT_FOUND,
            Error::EntryPointMissing { .. } => STATUS_ENTRY_POINT_MISSING,
            Error::SessionAlreadyActive => STATUS_SESSION_ALREADY_ACTIVE,
            Error::NoActiveSession => STATUS_NO_ACTIVE_SESSION,
            Error::StopEntryPointMissing { .. } => STATUS_STOP_ENTRY_POINT_MISSING,
            Error::ProxyUrlContainsNulByte | Error::ReadProxyUrl { .. } => STATUS_INVALID_ARGUMENT,
            Error::Spawn(_) => STATUS_SPAWN_FAILED,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Collapses a bridge result into the single integer the host receives. Engine codes pass
/// through untouched.
pub fn status_code(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => err.status_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_failures_have_distinct_codes() {
        let codes = [
            Error::LibraryNotFound {
                name: "libtun2proxy.so".to_string(),
                reason: "not found".to_string(),
            }
            .status_code(),
            Error::EntryPointMissing {
                symbol: "tun2proxy_with_fd_run",
            }
            .status_code(),
            Error::SessionAlreadyActive.status_code(),
            Error::ProxyUrlContainsNulByte.status_code(),
        ];
        assert_eq!(codes, [-1, -2, -3, -4]);
    }

    #[test]
    fn stop_failures_reuse_the_low_codes() {
        assert_eq!(Error::NoActiveSession.status_code(), -1);
        assert_eq!(
            Error::StopEntryPointMissing {
                symbol: "tun2proxy_with_fd_stop"
            }
            .status_code(),
            -2
        );
    }

    #[test]
    fn engine_codes_pass_through() {
        assert_eq!(status_code(Ok(0)), 0);
        assert_eq!(status_code(Ok(-77)), -77);
        assert_eq!(status_code(Err(Error::SessionAlreadyActive)), -3);
    }
}
