// Copyright 2024 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::{
    args::SessionArgs,
    dynamic::DynamicEngineProvider,
    engine::{Engine, EngineProvider},
    error::{status_code, Error, Result},
};

lazy_static! {
    static ref BRIDGE: SessionBridge<DynamicEngineProvider> =
        SessionBridge::new(DynamicEngineProvider::new());
}

/// The process-wide bridge over the dynamically loaded engine.
pub fn global() -> &'static SessionBridge<DynamicEngineProvider> {
    &BRIDGE
}

/// Start a session on the process-wide bridge and report the host status code.
pub fn start_session(args: &SessionArgs) -> i32 {
    status_code(global().start(args))
}

/// Stop the session on the process-wide bridge and report the host status code.
pub fn stop_session() -> i32 {
    status_code(global().stop())
}

/// Owns at most one engine session at a time.
///
/// The handle is held for exactly as long as `start` is blocked inside the engine's run routine.
/// `stop` only reaches the engine while that call is in progress.
pub struct SessionBridge<P> {
    provider: P,
    handle: Mutex<Option<Arc<dyn Engine>>>,
}

impl<P: EngineProvider> SessionBridge<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            handle: Mutex::new(None),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn is_active(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Load the engine, run it with `args` and block until its run routine returns.
    pub fn start(&self, args: &SessionArgs) -> Result<i32> {
        let engine = self.acquire()?;
        info!(
            "Starting tun2proxy session (proxy: {}, tun_fd: {})",
            args.proxy_url, args.tun_fd
        );

        let result = engine.run(args);
        self.handle.lock().take();

        match &result {
            Ok(code) => info!("tun2proxy session returned {code}"),
            Err(err) => warn!("tun2proxy session failed to start: {err}"),
        }
        result
    }

    /// Ask the running engine to stop. Returns the engine's status.
    pub fn stop(&self) -> Result<i32> {
        let engine = self
            .handle
            .lock()
            .clone()
            .ok_or(Error::NoActiveSession)?;

        let code = engine.stop().inspect_err(|err| warn!("{err}"))?;
        debug!("tun2proxy stop returned {code}");
        Ok(code)
    }

    fn acquire(&self) -> Result<Arc<dyn Engine>> {
        let mut handle = self.handle.lock();
        if handle.is_some() {
            warn!("Refusing to start tun2proxy: a session is already active");
            return Err(Error::SessionAlreadyActive);
        }

        let engine = self.provider.load().inspect_err(|err| warn!("{err}"))?;
        *handle = Some(engine.clone());
        Ok(engine)
    }
}


#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread, time::Duration};

    use super::{mock::*, *};
    use crate::args::{DnsStrategy, Verbosity};

    fn scenario_a_args() -> SessionArgs {
        let mut args = SessionArgs::new(42);
        args.proxy_url("socks5://127.0.0.1:1080")
            .close_fd_on_drop(true)
            .tun_mtu(1500)
            .verbosity(Verbosity(1))
            .dns_strategy(DnsStrategy(0));
        args
    }

    #[test]
    fn start_returns_engine_status() {
        let bridge = SessionBridge::new(MockProvider::with(MockEngine::returning(0)));
        assert_eq!(status_code(bridge.start(&scenario_a_args())), 0);

        let runs = bridge.provider().engine().runs.lock();
        assert_eq!(runs.as_slice(), &[scenario_a_args()]);
    }

    #[test]
    fn start_passes_sentinel_through_unmodified() {
        for sentinel in [7, -99, i32::MAX] {
            let bridge = SessionBridge::new(MockProvider::with(MockEngine::returning(sentinel)));
            assert_eq!(status_code(bridge.start(&SessionArgs::new(3))), sentinel);
        }
    }

    #[test]
    fn second_start_while_running_is_rejected_without_loading() {
        let (engine, entered) = MockEngine::blocking(0);
        let bridge = Arc::new(SessionBridge::new(MockProvider::with(engine)));

        let first = {
            let bridge = bridge.clone();
            thread::spawn(move || status_code(bridge.start(&scenario_a_args())))
        };
        entered.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(bridge.is_active());

        assert_eq!(status_code(bridge.start(&scenario_a_args())), -3);
        assert_eq!(bridge.provider().loads(), 1);

        assert_eq!(status_code(bridge.stop()), 0);
        assert_eq!(first.join().unwrap(), 0);
        assert!(!bridge.is_active());
    }

    #[test]
    fn handle_is_free_again_after_start_returns() {
        let bridge = SessionBridge::new(MockProvider::with(MockEngine::returning(1)));
        assert_eq!(status_code(bridge.start(&SessionArgs::new(5))), 1);
        assert!(!bridge.is_active());
        assert_eq!(status_code(bridge.start(&SessionArgs::new(5))), 1);
        assert_eq!(bridge.provider().engine().runs.lock().len(), 2);
    }

    #[test]
    fn stop_without_session_is_repeatable() {
        let bridge = SessionBridge::new(MockProvider::with(MockEngine::returning(0)));
        for _ in 0..3 {
            assert_eq!(status_code(bridge.stop()), -1);
        }
        assert_eq!(bridge.provider().loads(), 0);
    }

    #[test]
    fn stop_after_session_ended_reports_no_session() {
        let bridge = SessionBridge::new(MockProvider::with(MockEngine::returning(0)));
        bridge.start(&SessionArgs::new(5)).unwrap();
        assert!(matches!(bridge.stop(), Err(Error::NoActiveSession)));
        assert_eq!(
            bridge
                .provider()
                .engine()
                .stops
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[test]
    fn missing_run_entry_point_does_not_wedge_the_bridge() {
        let bridge = SessionBridge::new(MockProvider::with(MockEngine::without_entry_points()));
        assert_eq!(status_code(bridge.start(&SessionArgs::new(5))), -2);
        assert!(!bridge.is_active());
        assert_eq!(status_code(bridge.start(&SessionArgs::new(5))), -2);
        assert_eq!(bridge.provider().loads(), 2);
    }

    #[test]
    fn missing_stop_entry_point_is_reported() {
        let (mut engine, entered) = MockEngine::blocking(0);
        engine.stop_code = None;
        let bridge = Arc::new(SessionBridge::new(MockProvider::with(engine)));

        let first = {
            let bridge = bridge.clone();
            thread::spawn(move || bridge.start(&SessionArgs::new(9)).map_err(|e| e.status_code()))
        };
        entered.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(status_code(bridge.stop()), -2);

        // The engine still runs; release it through its own channel.
        bridge.provider().engine().release();
        assert_eq!(first.join().unwrap(), Ok(0));
    }

    #[test]
    fn absent_library_then_stop() {
        let bridge = SessionBridge::new(MockProvider::missing());
        assert_eq!(status_code(bridge.start(&scenario_a_args())), -1);
        assert!(!bridge.is_active());
        assert_eq!(status_code(bridge.stop()), -1);
    }

    #[test]
    fn global_bridge_without_engine_library() {
        // The engine library is not installed next to the test binary.
        assert_eq!(stop_session(), -1);
        assert_eq!(start_session(&scenario_a_args()), -1);
        assert_eq!(stop_session(), -1);
        assert!(!global().is_active());
    }
}
