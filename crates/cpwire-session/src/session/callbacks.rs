//! Typed callback slots, one per inbound event.

use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use super::Solver;
use crate::error::{BoxError, Result, SessionError};
use crate::protocol::{LowerBoundEvent, SolutionEvent, Summary};

/// What a callback returns. An `Err` aborts the run with
/// [`SessionError::Callback`], except from the error callback, whose
/// failures are ignored.
pub type CallbackResult = std::result::Result<(), BoxError>;

pub type CallbackFuture = BoxFuture<'static, CallbackResult>;

pub(crate) type Handler<E> = Arc<dyn Fn(E) -> CallbackFuture + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct Callbacks {
    pub(crate) solution: Option<Handler<SolutionEvent>>,
    pub(crate) lower_bound: Option<Handler<LowerBoundEvent>>,
    pub(crate) log: Option<Handler<String>>,
    pub(crate) warning: Option<Handler<String>>,
    pub(crate) error: Option<Handler<String>>,
    pub(crate) summary: Option<Handler<Summary>>,
}

impl Callbacks {
    /// Whether the host observes intermediate results.
    pub(crate) fn wants_incremental(&self) -> bool {
        self.solution.is_some() || self.lower_bound.is_some()
    }
}

/// Invokes an optional handler and converts its failure.
pub(crate) async fn invoke<E>(handler: &Option<Handler<E>>, event: E) -> Result<()> {
    match handler {
        Some(handler) => handler(event).await.map_err(SessionError::Callback),
        None => Ok(()),
    }
}

impl Solver {
    /// Applies `change` to the callback table unless a run is in flight.
    fn set_callback(&self, change: impl FnOnce(&mut Callbacks)) -> Result<()> {
        let state = self.shared.state.lock();
        if state.phase.is_active() {
            return Err(SessionError::Busy);
        }
        change(&mut *self.callbacks.lock());
        Ok(())
    }

    /// Removes every registered callback.
    pub fn clear_callbacks(&self) -> Result<()> {
        self.set_callback(|callbacks| *callbacks = Callbacks::default())
    }
}

macro_rules! callback_setters {
    ($($(#[$doc:meta])* $slot:ident: $event:ty => $sync:ident, $async_fn:ident;)*) => {
        impl Solver {
            $(
                $(#[$doc])*
                ///
                /// Fails with [`SessionError::Busy`] while a run is in flight.
                pub fn $sync<F>(&self, callback: F) -> Result<()>
                where
                    F: Fn($event) -> CallbackResult + Send + Sync + 'static,
                {
                    let handler: Handler<$event> =
                        Arc::new(move |event| future::ready(callback(event)).boxed());
                    self.set_callback(|callbacks| callbacks.$slot = Some(handler))
                }

                $(#[$doc])*
                ///
                /// The returned future is awaited before the next event is
                /// dispatched.
                pub fn $async_fn<F, Fut>(&self, callback: F) -> Result<()>
                where
                    F: Fn($event) -> Fut + Send + Sync + 'static,
                    Fut: Future<Output = CallbackResult> + Send + 'static,
                {
                    let handler: Handler<$event> = Arc::new(move |event| callback(event).boxed());
                    self.set_callback(|callbacks| callbacks.$slot = Some(handler))
                }
            )*
        }
    };
}

callback_setters! {
    /// Called for every improving solution.
    solution: SolutionEvent => on_solution, on_solution_async;
    /// Called for every lower bound improvement.
    lower_bound: LowerBoundEvent => on_lower_bound, on_lower_bound_async;
    /// Called for every solver log line.
    log: String => on_log, on_log_async;
    /// Called for every solver warning, including process stderr lines.
    warning: String => on_warning, on_warning_async;
    /// Called for every solver error message.
    error: String => on_error, on_error_async;
    /// Called with the final summary of a solve.
    summary: Summary => on_summary, on_summary_async;
}
