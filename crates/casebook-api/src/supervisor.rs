//! # Process-Level Failure Supervision
//!
//! A panic inside a spawned task or request handler must never take the
//! process down or vanish silently. The hook installed here reports every
//! panic through `tracing`; tokio isolates the panicking task and keeps
//! serving. Request-bound panics are additionally converted into opaque
//! failures by [`crate::middleware::normalize::catch_panics`], so the
//! waiting client still receives an envelope.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};

static PANICS_REPORTED: AtomicU64 = AtomicU64::new(0);

/// Install the process-wide panic hook, replacing any previous one.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        PANICS_REPORTED.fetch_add(1, Ordering::Relaxed);
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "<unknown>".to_string());
        tracing::error!(
            panic = %panic_message(info.payload()),
            location = %location,
            "unhandled panic; process continues"
        );
    }));
}

/// Panics seen by the hook since process start.
pub fn panics_reported() -> u64 {
    PANICS_REPORTED.load(Ordering::Relaxed)
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
