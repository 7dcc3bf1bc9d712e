// Copyright 2023 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! JNI entry points bound by the host's `MainActivity` companion object.

use jnix::jni::{
    objects::{JClass, JString},
    sys::{jboolean, jchar, jint, JNI_FALSE},
    JNIEnv,
};
use log::warn;

use crate::{
    args::{DnsStrategy, SessionArgs, Verbosity},
    error::Error,
    logging::{init_logs, log_level_from_env},
    session,
};

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_lucas_vpnapp_MainActivity_startTun2proxy(
    env: JNIEnv<'_>,
    _class: JClass<'_>,
    proxy_url: JString<'_>,
    tun_fd: jint,
    close_fd_on_drop: jboolean,
    tun_mtu: jchar,
    verbosity: jint,
    dns_strategy: jint,
) -> jint {
    init_logs(log_level_from_env());

    let proxy_url: String = match env.get_string(proxy_url) {
        Ok(proxy_url) => proxy_url.into(),
        Err(err) => {
            let err = Error::ReadProxyUrl {
                details: err.to_string(),
            };
            warn!("{err}");
            return err.status_code();
        }
    };

    let args = SessionArgs {
        proxy_url,
        tun_fd,
        close_fd_on_drop: close_fd_on_drop != JNI_FALSE,
        tun_mtu,
        verbosity: Verbosity(verbosity),
        dns_strategy: DnsStrategy(dns_strategy),
    };
    session::start_session(&args)
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_lucas_vpnapp_MainActivity_stopTun2proxy(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
) -> jint {
    init_logs(log_level_from_env());
    session::stop_session()
}
