// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! The production engine: `tun2proxy` loaded as a shared library at runtime.
//!
//! The library is never linked at build time. Its two entry points are looked up by name on
//! every call, so a library without them loads fine and only the affected call fails.
//!
//! Release policy: the provider keeps the first successfully loaded library and hands the same
//! instance out on every later load. The library is unmapped only when the provider is dropped.
//! The process-wide bridge is a `static`, so in production the engine stays loaded until the
//! process exits.

use std::{
    ffi::{CString, OsString},
    fmt,
    os::raw::{c_char, c_int, c_ushort},
    sync::Arc,
};

use libloading::{Library, Symbol};
use log::{debug, info};
use parking_lot::Mutex;

use crate::{
    args::SessionArgs,
    engine::{Engine, EngineProvider},
    error::{Error, Result},
};

/// Library stem; the platform prefix and suffix are added by [`libloading::library_filename`].
pub const ENGINE_LIBRARY: &str = "tun2proxy";
pub const RUN_SYMBOL: &str = "tun2proxy_with_fd_run";
pub const STOP_SYMBOL: &str = "tun2proxy_with_fd_stop";

// The `bool` before the mtu is the engine's packet-information flag, always false for a
// descriptor handed over by the host.
type RunFn = unsafe extern "C" fn(
    proxy_url: *const c_char,
    tun_fd: c_int,
    close_fd_on_drop: bool,
    packet_information: bool,
    tun_mtu: c_ushort,
    dns_strategy: c_int,
    verbosity: c_int,
) -> c_int;

type StopFn = unsafe extern "C" fn() -> c_int;

// Engine argument order: dns strategy comes before verbosity.
fn invoke_run(run: RunFn, args: &SessionArgs) -> Result<i32> {
    let proxy_url =
        CString::new(args.proxy_url.as_str()).map_err(|_| Error::ProxyUrlContainsNulByte)?;

    debug!(
        "Calling {RUN_SYMBOL} (tun_fd: {}, mtu: {}, dns: {}, verbosity: {})",
        args.tun_fd, args.tun_mtu, args.dns_strategy, args.verbosity
    );
    // SAFETY: `proxy_url` outlives the call and the engine does not keep the pointer.
    let code = unsafe {
        run(
            proxy_url.as_ptr(),
            args.tun_fd,
            args.close_fd_on_drop,
            false,
            args.tun_mtu,
            args.dns_strategy.0,
            args.verbosity.0,
        )
    };
    Ok(code)
}

pub struct DynamicEngineProvider {
    file_name: OsString,
    loaded: Mutex<Option<Arc<DynamicEngine>>>,
}

impl DynamicEngineProvider {
    pub fn new() -> Self {
        Self::with_file_name(libloading::library_filename(ENGINE_LIBRARY))
    }

    pub(crate) fn with_file_name(file_name: impl Into<OsString>) -> Self {
        Self {
            file_name: file_name.into(),
            loaded: Mutex::new(None),
        }
    }

    pub fn file_name(&self) -> &OsString {
        &self.file_name
    }

    fn load_library(&self) -> Result<Arc<DynamicEngine>> {
        let mut loaded = self.loaded.lock();
        if let Some(engine) = loaded.as_ref() {
            return Ok(engine.clone());
        }

        // SAFETY: loading runs the library's initialisers; tun2proxy has no unsound ones.
        let library =
            unsafe { Library::new(&self.file_name) }.map_err(|err| Error::LibraryNotFound {
                name: self.file_name.to_string_lossy().into_owned(),
                reason: err.to_string(),
            })?;
        info!("Loaded engine library {}", self.file_name.to_string_lossy());

        let engine = Arc::new(DynamicEngine { library });
        *loaded = Some(engine.clone());
        Ok(engine)
    }
}

impl Default for DynamicEngineProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DynamicEngineProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicEngineProvider")
            .field("file_name", &self.file_name)
            .field("loaded", &self.loaded.lock().is_some())
            .finish()
    }
}

impl EngineProvider for DynamicEngineProvider {
    fn load(&self) -> Result<Arc<dyn Engine>> {
        let engine: Arc<dyn Engine> = self.load_library()?;
        Ok(engine)
    }
}

pub struct DynamicEngine {
    library: Library,
}

impl DynamicEngine {
    fn symbol<T>(&self, name: &str) -> Option<Symbol<'_, T>> {
        // SAFETY: callers pair each symbol name with the signature the engine exports it with.
        unsafe { self.library.get::<T>(name.as_bytes()) }.ok()
    }
}

impl Engine for DynamicEngine {
    fn run(&self, args: &SessionArgs) -> Result<i32> {
        let run = *self
            .symbol::<RunFn>(RUN_SYMBOL)
            .ok_or(Error::EntryPointMissing { symbol: RUN_SYMBOL })?;
        invoke_run(run, args)
    }

    fn stop(&self) -> Result<i32> {
        let stop = self
            .symbol::<StopFn>(STOP_SYMBOL)
            .ok_or(Error::StopEntryPointMissing {
                symbol: STOP_SYMBOL,
            })?;
        debug!("Calling {STOP_SYMBOL}");
        Ok(unsafe { stop() })
    }
}
