//! Panic recovery middleware.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::{Future, poll_fn};
use std::panic::{self, AssertUnwindSafe};
use std::pin::pin;
use std::sync::Once;

use axum::{extract::Request, middleware::Next, response::Response};
use futures::FutureExt;

use crate::context::scoped_logger;
use crate::error::internal_server_error;

thread_local! {
    /// Number of recovery boundaries currently polling on this thread.
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    /// Backtrace captured by the panic hook at the panic site.
    static PANIC_STACK: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Chains a panic hook that, inside a recovery boundary, captures the
/// backtrace of the panicking frame and silences the default stderr report.
/// Panics outside any boundary reach the previous hook unchanged.
fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) > 0 {
                let stack = Backtrace::force_capture().to_string();
                PANIC_STACK.with(|slot| slot.replace(Some(stack)));
            } else {
                previous(info);
            }
        }));
    });
}

/// Marks the current thread as polling inside a recovery boundary.
struct Guard;

impl Guard {
    fn enter() -> Self {
        GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
        PANIC_STACK.with(|slot| slot.take());
        Guard
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        GUARD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Polls `fut`, catching a panic together with the stack recorded at the
/// panic site.
async fn catch_panic<F: Future>(fut: F) -> Result<F::Output, (Box<dyn Any + Send>, String)> {
    install_panic_hook();

    let mut fut = pin!(AssertUnwindSafe(fut).catch_unwind());
    poll_fn(|cx| {
        let _guard = Guard::enter();
        fut.as_mut().poll(cx).map(|result| {
            result.map_err(|payload| {
                let stack = PANIC_STACK
                    .with(|slot| slot.take())
                    .unwrap_or_else(|| Backtrace::force_capture().to_string());
                (payload, stack)
            })
        })
    })
    .await
}

/// Converts panics in the inner service into `500 Internal Server Error`.
///
/// On a panic, one `ERROR` record `panic recovered` is written with the
/// panic payload (`panic`), the backtrace of the panicking code (`stack`)
/// and the request `path`, through the request-scoped logger when
/// [`request_log::layer`](super::request_log::layer) runs outside this layer,
/// otherwise through the current logger. The client receives
/// `{"message":"internal server error"}`; panic details never leave the logs.
///
/// Requests that complete normally pass through untouched.
pub async fn layer(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let logger = scoped_logger(req.extensions());

    match catch_panic(next.run(req)).await {
        Ok(response) => response,
        Err((payload, stack)) => {
            let panic = panic_message(payload.as_ref());

            tracing::error!(
                parent: logger.span(),
                panic = %panic,
                stack = %stack,
                path = %path,
                "panic recovered"
            );

            internal_server_error()
        }
    }
}

/// Extracts the message of `panic!`-style payloads.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
