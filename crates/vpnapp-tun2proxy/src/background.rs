// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use std::{ops::Deref, sync::Arc, thread};

use log::{debug, error, info};
use parking_lot::Mutex;

use crate::{
    args::SessionArgs,
    engine::EngineProvider,
    error::{status_code, Error, Result},
    session::SessionBridge,
};

const RUN_THREAD_NAME: &str = "tun2proxy-run";

enum BridgeRef<P: 'static> {
    Static(&'static SessionBridge<P>),
    Shared(Arc<SessionBridge<P>>),
}

impl<P: 'static> Deref for BridgeRef<P> {
    type Target = SessionBridge<P>;

    fn deref(&self) -> &Self::Target {
        match self {
            BridgeRef::Static(bridge) => bridge,
            BridgeRef::Shared(bridge) => bridge,
        }
    }
}

impl<P: 'static> Clone for BridgeRef<P> {
    fn clone(&self) -> Self {
        match self {
            BridgeRef::Static(bridge) => BridgeRef::Static(*bridge),
            BridgeRef::Shared(bridge) => BridgeRef::Shared(bridge.clone()),
        }
    }
}

/// Runs the blocking `start` call on its own thread so the host's control thread stays free.
///
/// At most one run thread exists per runner. The bridge underneath still enforces the
/// single-session rule across runners.
pub struct BackgroundRunner<P: 'static> {
    bridge: BridgeRef<P>,
    thread: Mutex<Option<thread::JoinHandle<i32>>>,
}

impl<P: EngineProvider + 'static> BackgroundRunner<P> {
    pub fn new(bridge: &'static SessionBridge<P>) -> Self {
        Self::from_ref(BridgeRef::Static(bridge))
    }

    pub fn with_bridge(bridge: Arc<SessionBridge<P>>) -> Self {
        Self::from_ref(BridgeRef::Shared(bridge))
    }

    fn from_ref(bridge: BridgeRef<P>) -> Self {
        Self {
            bridge,
            thread: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Spawn the run thread. Returns `false` without doing anything if one is still alive.
    pub fn start(&self, args: SessionArgs) -> Result<bool> {
        let mut slot = self.thread.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("tun2proxy run thread is already alive");
            return Ok(false);
        }

        let bridge = self.bridge.clone();
        let handle = thread::Builder::new()
            .name(RUN_THREAD_NAME.to_string())
            .spawn(move || {
                let code = status_code(bridge.start(&args));
                info!("tun2proxy run thread exiting with {code}");
                code
            })
            .map_err(Error::Spawn)?;

        *slot = Some(handle);
        Ok(true)
    }

    /// Stop the engine if the run thread is alive. The thread is kept so its exit status can
    /// still be collected with [`BackgroundRunner::join`].
    pub fn stop(&self) -> Option<i32> {
        if !self.is_running() {
            return None;
        }
        Some(status_code(self.bridge.stop()))
    }

    /// Wait for the run thread and return the status its `start` call produced.
    pub fn join(&self) -> Option<i32> {
        let handle = self.thread.lock().take()?;
        handle
            .join()
            .inspect_err(|_| error!("tun2proxy run thread panicked"))
            .ok()
    }
}
