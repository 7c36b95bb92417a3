//! Per-request dispatch sessions.

use strata_core::{AccessControls, Diagnostics, ErrorState, Value};

use crate::dispatcher::{Served, TieredDispatcher};
use crate::error::DispatchError;

/// One logical request against a [`TieredDispatcher`].
///
/// A session owns the request's bypass controls, its trace log and its last
/// error. Calls take `&mut self`, so a session is never shared between
/// concurrent dispatches; open one session per request.
pub struct Session<'a> {
    dispatcher: &'a TieredDispatcher,
    controls: AccessControls,
    diagnostics: Diagnostics,
}

impl<'a> Session<'a> {
    pub(crate) fn new(dispatcher: &'a TieredDispatcher, controls: AccessControls) -> Self {
        let diagnostics = if dispatcher.debug() {
            Diagnostics::new()
        } else {
            Diagnostics::silent()
        };
        Self {
            dispatcher,
            controls,
            diagnostics,
        }
    }

    /// Replaces the request controls. Meant to be called before the first
    /// dispatch.
    pub fn set_controls(&mut self, controls: AccessControls) {
        self.controls = controls;
    }

    /// The effective controls: dispatcher settings merged with the request's.
    pub fn controls(&self) -> AccessControls {
        self.dispatcher.controls().merge(self.controls)
    }

    /// Runs an operation and returns its result.
    pub async fn invoke(
        &mut self,
        operation: &str,
        args: Vec<Value>,
    ) -> Result<Value, DispatchError> {
        self.dispatch(operation, args).await.map(|served| served.value)
    }

    /// Runs an operation and reports which tier served it.
    pub async fn dispatch(
        &mut self,
        operation: &str,
        args: Vec<Value>,
    ) -> Result<Served, DispatchError> {
        let mut call = if self.diagnostics.is_enabled() {
            Diagnostics::new()
        } else {
            Diagnostics::silent()
        };
        let result = self
            .dispatcher
            .run(operation, &args, self.controls, &mut call)
            .await;
        self.diagnostics.absorb(call);
        result
    }

    /// Everything traced by this session, in order.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Trace entries recorded so far.
    pub fn trace(&self) -> &[String] {
        self.diagnostics.entries()
    }

    /// The most recent error of this session.
    pub fn last_error(&self) -> Option<&ErrorState> {
        self.diagnostics.last_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::OriginRegistry;

    fn dispatcher(debug: bool) -> TieredDispatcher {
        TieredDispatcher::builder()
            .registry(OriginRegistry::new().with_fn("ping", |_| async { Ok(Some(Value::from("pong"))) }))
            .debug(debug)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_trace_accumulates_across_calls() {
        let dispatcher = dispatcher(true);
        let mut session = dispatcher.session();

        session.invoke("ping", vec![]).await.unwrap();
        let after_first = session.trace().len();
        session.invoke("ping", vec![]).await.unwrap();

        assert!(after_first > 0);
        assert_eq!(session.trace().len(), after_first * 2);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let dispatcher = dispatcher(true);
        let mut failing = dispatcher.session();
        let ok = dispatcher.session();

        assert!(failing.invoke("missing", vec![]).await.is_err());

        assert!(failing.last_error().is_some());
        assert!(ok.last_error().is_none());
        assert!(ok.trace().is_empty());
    }

    #[tokio::test]
    async fn test_debug_off_keeps_only_errors() {
        let dispatcher = dispatcher(false);
        let mut session = dispatcher.session();

        session.invoke("ping", vec![]).await.unwrap();
        assert!(session.trace().is_empty());

        session.invoke("", vec![]).await.unwrap_err();
        assert!(session.trace().is_empty());
        assert!(session.last_error().is_some());
    }

    #[test]
    fn test_effective_controls_merge() {
        let dispatcher = dispatcher(true);
        let mut session = dispatcher.session();
        session.set_controls(AccessControls::new().clearing_cache());

        let controls = session.controls();
        assert!(controls.clear_cache_on_read);
        // use_storage defaults to false, so storage stays disabled
        assert!(controls.storage_disabled);
    }
}
