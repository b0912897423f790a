// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The facade tying rules, interception, sessions and run tracing together.

use crate::agent::{Agent, WrappedAgent};
use crate::config::{FallbackMode, SenytlConfig};
use crate::engine::{MockEngine, MockRule, PassThroughRequest, Resolution};
use crate::error::SenytlError;
use crate::matching::MatchSpec;
use crate::model::{LlmCallRecord, MockResponse};
use crate::patch::{PatchManager, Resolver};
use crate::providers::{Provider, Sdk};
use crate::recorder::{RecorderMode, SessionRecorder};
use crate::run::{self, RunContext, RunHandle};
use crate::snapshot::SnapshotStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Mock interception for one [`Sdk`].
///
/// Cloning is cheap and every clone drives the same rules, patches and
/// sessions. Interception is removed when the last clone is dropped.
#[derive(Clone)]
pub struct Senytl {
    inner: Arc<Inner>,
}

struct Inner {
    id: u64,
    root: PathBuf,
    config: SenytlConfig,
    engine: MockEngine,
    recorder: SessionRecorder,
    patches: PatchManager,
    sdk: Sdk,
    session: Mutex<Option<ActiveSession>>,
    session_seq: AtomicU64,
}

#[derive(Clone, Debug)]
struct ActiveSession {
    seq: u64,
    name: String,
    mode: RecorderMode,
    previous_fallback: FallbackMode,
}

impl Senytl {
    /// Create a facade for the project at `root`, reading its configuration.
    pub fn new(sdk: Sdk, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config = SenytlConfig::load(&root);
        Self::with_config(sdk, root, config)
    }

    /// Like [`Senytl::new`], but a broken configuration is an error instead
    /// of silently falling back to defaults.
    pub fn try_new(sdk: Sdk, root: impl Into<PathBuf>) -> Result<Self, SenytlError> {
        let root = root.into();
        let config = SenytlConfig::try_load(&root)?;
        Ok(Self::with_config(sdk, root, config))
    }

    pub fn with_config(sdk: Sdk, root: impl Into<PathBuf>, config: SenytlConfig) -> Self {
        let root = root.into();
        let sessions_dir = config.resolve_sessions_dir(&root);
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let resolver: Weak<dyn Resolver> = weak.clone();
            Inner {
                id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
                engine: MockEngine::new(config.fallback),
                recorder: SessionRecorder::new(sessions_dir),
                patches: PatchManager::new(sdk.clone(), resolver),
                sdk,
                root,
                config,
                session: Mutex::new(None),
                session_seq: AtomicU64::new(0),
            }
        });
        Self { inner }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    pub fn config(&self) -> &SenytlConfig {
        &self.inner.config
    }

    pub fn engine(&self) -> &MockEngine {
        &self.inner.engine
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.inner.recorder
    }

    /// Response snapshots under `<root>/.senytl/snapshots`.
    pub fn snapshots(&self) -> SnapshotStore {
        SnapshotStore::for_root(&self.inner.root)
    }

    pub fn patches(&self) -> &PatchManager {
        &self.inner.patches
    }

    pub fn sdk(&self) -> &Sdk {
        &self.inner.sdk
    }

    pub fn fallback(&self) -> FallbackMode {
        self.inner.engine.fallback()
    }

    pub fn set_fallback(&self, fallback: FallbackMode) {
        self.inner.engine.set_fallback(fallback);
    }

    /// Route every registered call site through this facade.
    pub fn install(&self) -> usize {
        self.inner.patches.install()
    }

    /// Stop any session and restore the original clients.
    pub fn uninstall(&self) -> Result<usize, SenytlError> {
        self.stop_session()?;
        Ok(self.inner.patches.uninstall())
    }

    pub fn is_installed(&self) -> bool {
        self.inner.patches.installed()
    }

    /// Stop any session and drop every rule.
    pub fn reset(&self) -> Result<(), SenytlError> {
        self.stop_session()?;
        self.inner.engine.reset();
        Ok(())
    }

    /// Start declaring a rule for `model`, with the provider inferred from
    /// its name.
    pub fn mock(&self, model: impl Into<String>) -> MockModelBuilder<'_> {
        let model = model.into();
        MockModelBuilder {
            senytl: self,
            provider: Provider::infer(&model),
            model,
        }
    }

    /// Record every resolved call into session `name`.
    ///
    /// Unmatched requests go to the real clients while recording. Any
    /// previous session is stopped first.
    pub fn record_session(&self, name: &str) -> Result<SessionGuard, SenytlError> {
        self.start_session(name, RecorderMode::Record)
    }

    /// Answer calls from session `name`; requests it lacks fall through to
    /// rules, and unmatched ones fail.
    pub fn replay_session(&self, name: &str) -> Result<SessionGuard, SenytlError> {
        self.start_session(name, RecorderMode::Replay)
    }

    /// Name and mode of the active session.
    pub fn active_session(&self) -> Option<(String, RecorderMode)> {
        self.inner
            .session
            .lock()
            .as_ref()
            .map(|s| (s.name.clone(), s.mode))
    }

    /// End the active session, restoring the fallback it replaced.
    ///
    /// Returns the written path when a recording was saved. If saving fails
    /// the session stays active.
    pub fn stop_session(&self) -> Result<Option<PathBuf>, SenytlError> {
        self.stop_session_matching(None)
    }

    /// Names of sessions stored on disk.
    pub fn sessions(&self) -> Vec<String> {
        self.inner.recorder.sessions()
    }

    /// Install interception and wrap `agent` for traced invocation.
    pub fn wrap<A: Agent>(&self, agent: A) -> WrappedAgent<A> {
        self.install();
        WrappedAgent::new(agent, self.clone())
    }

    /// Open a run context on the current thread.
    pub fn start_run(&self) -> RunHandle {
        run::start(self.inner.id)
    }

    /// Run `f` inside a fresh run context and return what it traced.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> (T, RunContext) {
        let handle = self.start_run();
        let output = f();
        let (context, _) = handle.finish();
        (output, context)
    }

    /// Resolve a normalized request the way intercepted calls are resolved.
    pub fn resolve(
        &self,
        provider: Provider,
        model: &str,
        request: Value,
    ) -> Result<Resolution, SenytlError> {
        self.inner.resolve(provider, model, request)
    }

    fn start_session(&self, name: &str, mode: RecorderMode) -> Result<SessionGuard, SenytlError> {
        self.stop_session()?;

        let engine = &self.inner.engine;
        let previous_fallback = engine.fallback();
        engine.set_fallback(match mode {
            RecorderMode::Record => FallbackMode::PassThrough,
            RecorderMode::Replay => FallbackMode::Error,
        });

        let started = match mode {
            RecorderMode::Record => self.inner.recorder.start_recording(name),
            RecorderMode::Replay => self.inner.recorder.start_replay(name),
        };
        if let Err(e) = started {
            engine.set_fallback(previous_fallback);
            return Err(e);
        }

        self.install();
        let seq = self.inner.session_seq.fetch_add(1, Ordering::Relaxed) + 1;
        *self.inner.session.lock() = Some(ActiveSession {
            seq,
            name: name.to_string(),
            mode,
            previous_fallback,
        });
        Ok(SessionGuard {
            senytl: Some(self.clone()),
            seq,
        })
    }

    fn stop_session_matching(&self, seq: Option<u64>) -> Result<Option<PathBuf>, SenytlError> {
        let mut slot = self.inner.session.lock();
        let active = match slot.take() {
            Some(active) if seq.map_or(true, |s| s == active.seq) => active,
            other => {
                *slot = other;
                return Ok(None);
            }
        };

        let stopped = match active.mode {
            RecorderMode::Record => self.inner.recorder.stop_recording(),
            RecorderMode::Replay => {
                self.inner.recorder.stop_replay();
                Ok(None)
            }
        };
        match stopped {
            Ok(path) => {
                self.inner.engine.set_fallback(active.previous_fallback);
                Ok(path)
            }
            Err(e) => {
                *slot = Some(active);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Senytl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Senytl")
            .field("id", &self.inner.id)
            .field("root", &self.inner.root)
            .field("fallback", &self.fallback())
            .field("rules", &self.inner.engine.len())
            .field("installed", &self.is_installed())
            .field("session", &self.active_session())
            .finish()
    }
}

impl Inner {
    fn trace(&self, provider: Provider, model: &str, request: Value, response: MockResponse) {
        run::trace(
            self.id,
            LlmCallRecord {
                provider,
                model: model.to_string(),
                request,
                response,
            },
        );
    }
}

impl Resolver for Inner {
    fn resolve(
        &self,
        provider: Provider,
        model: &str,
        request: Value,
    ) -> Result<Resolution, SenytlError> {
        if let Some(replayed) = self.recorder.maybe_replay(provider, model, &request) {
            self.trace(provider, model, request, replayed.clone());
            return Ok(Resolution::Resolved(replayed));
        }

        let resolution = self.engine.handle(provider, model, &request)?;
        if let Resolution::Resolved(response) = &resolution {
            self.recorder.record(provider, model, &request, response, true);
            self.trace(provider, model, request, response.clone());
        }
        Ok(resolution)
    }

    fn record_passthrough(&self, request: PassThroughRequest, response: MockResponse) {
        self.recorder.record(
            request.provider,
            &request.model,
            &request.request,
            &response,
            false,
        );
        self.trace(request.provider, &request.model, request.request, response);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.patches.uninstall();
    }
}

/// First step of rule declaration: the target model.
#[must_use = "a rule is only registered by `respond` or `respond_sequence`"]
pub struct MockModelBuilder<'a> {
    senytl: &'a Senytl,
    provider: Provider,
    model: String,
}

impl<'a> MockModelBuilder<'a> {
    /// Override the inferred provider.
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    pub fn when(self, matcher: MatchSpec) -> MockRuleBuilder<'a> {
        MockRuleBuilder {
            senytl: self.senytl,
            provider: self.provider,
            model: self.model,
            matcher,
        }
    }

    /// Match every prompt.
    pub fn always(self) -> MockRuleBuilder<'a> {
        self.when(MatchSpec::any())
    }
}

#[must_use = "a rule is only registered by `respond` or `respond_sequence`"]
pub struct MockRuleBuilder<'a> {
    senytl: &'a Senytl,
    provider: Provider,
    model: String,
    matcher: MatchSpec,
}

impl MockRuleBuilder<'_> {
    /// Register a rule answering with `response` every time.
    pub fn respond(self, response: impl Into<MockResponse>) -> Arc<MockRule> {
        let rule = MockRule::new(self.provider, self.model, self.matcher, response.into());
        self.senytl.engine().add_rule(Arc::new(rule))
    }

    /// Register a rule answering with `responses` in order, repeating the
    /// last one once exhausted.
    pub fn respond_sequence<I, R>(self, responses: I) -> Arc<MockRule>
    where
        I: IntoIterator<Item = R>,
        R: Into<MockResponse>,
    {
        let responses = responses
            .into_iter()
            .map(Into::into)
            .collect::<Vec<MockResponse>>();
        let rule = MockRule::with_sequence(self.provider, self.model, self.matcher, responses);
        self.senytl.engine().add_rule(Arc::new(rule))
    }
}

/// Keeps a record or replay session open.
///
/// Dropping the guard stops the session, unless a newer session has
/// replaced it or the guard was detached.
#[must_use = "the session stops when the guard is dropped"]
pub struct SessionGuard {
    senytl: Option<Senytl>,
    seq: u64,
}

impl SessionGuard {
    /// Stop the session now, returning the saved path for recordings.
    pub fn stop(mut self) -> Result<Option<PathBuf>, SenytlError> {
        match self.senytl.take() {
            Some(senytl) => senytl.stop_session_matching(Some(self.seq)),
            None => Ok(None),
        }
    }

    /// Leave the session running until `stop_session` or the next session.
    pub fn detach(mut self) {
        self.senytl = None;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(senytl) = self.senytl.take() {
            if let Err(e) = senytl.stop_session_matching(Some(self.seq)) {
                tracing::warn!(error = %e, "failed to stop session");
            }
        }
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("seq", &self.seq)
            .field("attached", &self.senytl.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "senytl_tests.rs"]
mod tests;
