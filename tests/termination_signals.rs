//! Real SIGTERM/SIGINT delivery. Kept in its own binary: the signals are
//! sent to the whole test process.
#![cfg(unix)]

use std::time::Duration;

use blog_webhook::lifecycle::{signals, Shutdown};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast;

fn raise(sig: libc::c_int) {
    // SAFETY: kill only sends a signal to this process.
    let ret = unsafe { libc::kill(libc::getpid(), sig) };
    assert_eq!(ret, 0);
}

/// Send `sig` repeatedly until `rx` fires, so the test does not depend on
/// when the listener task installs its handlers.
async fn raise_until_notified(sig: libc::c_int, rx: &mut broadcast::Receiver<()>) {
    let notified = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            raise(sig);
            match tokio::time::timeout(Duration::from_millis(100), rx.recv()).await {
                Ok(result) => return result,
                Err(_) => continue,
            }
        }
    })
    .await
    .expect("signal never reached the shutdown coordinator");
    assert!(notified.is_ok());
}

#[tokio::test]
async fn termination_signals_trigger_shutdown() {
    // Installed first so no delivery falls back to the default action.
    let _sigterm = signal(SignalKind::terminate()).unwrap();
    let _sigint = signal(SignalKind::interrupt()).unwrap();

    let shutdown = Shutdown::new();
    let mut rx = shutdown.subscribe();
    let listener = signals::listen(shutdown.clone());
    raise_until_notified(libc::SIGTERM, &mut rx).await;
    listener.await.unwrap();

    let shutdown = Shutdown::new();
    let mut rx = shutdown.subscribe();
    let listener = signals::listen(shutdown.clone());
    raise_until_notified(libc::SIGINT, &mut rx).await;
    listener.await.unwrap();

    let name = tokio::time::timeout(Duration::from_secs(5), async {
        let waiting = tokio::spawn(signals::termination());
        loop {
            raise(libc::SIGTERM);
            tokio::time::sleep(Duration::from_millis(100)).await;
            if waiting.is_finished() {
                return waiting.await.unwrap().unwrap();
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(name, "SIGTERM");
}
