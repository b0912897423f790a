// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Interception of provider call sites.
//!
//! Installing swaps each occupied [`Sdk`] slot for a shim that routes calls
//! through a [`Resolver`]. Uninstalling restores the exact original client.
//! Shims hold the resolver weakly, so a dropped resolver degrades them to
//! plain forwarding instead of keeping it alive. A shim whose patch has been
//! removed is disarmed and forwards as well, even while another manager's
//! shim still sits on top of it.

use crate::engine::{PassThroughRequest, Resolution};
use crate::error::SenytlError;
use crate::model::MockResponse;
use crate::providers::anthropic::AnthropicWire;
use crate::providers::google::GoogleWire;
use crate::providers::openai::OpenAiWire;
use crate::providers::{
    CallSite, ChatCompletion, ChatCompletionRequest, ChatCompletions, Client,
    GenerateContentRequest, GenerateContentResponse, GenerativeModel, Message, Messages,
    MessagesRequest, Provider, Sdk, WireFormat,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Decides how an intercepted request is answered.
pub trait Resolver: Send + Sync {
    /// Resolve a normalized request to a canned response or a pass-through.
    fn resolve(
        &self,
        provider: Provider,
        model: &str,
        request: Value,
    ) -> Result<Resolution, SenytlError>;

    /// Observe the real response to a request that was passed through.
    fn record_passthrough(&self, request: PassThroughRequest, response: MockResponse);
}

/// An installed shim and the client it displaced
#[derive(Clone, Debug)]
pub struct Patch {
    pub site: CallSite,
    pub original: Client,
    shim: Client,
    armed: Arc<AtomicBool>,
}

pub struct PatchManager {
    sdk: Sdk,
    resolver: Weak<dyn Resolver>,
    patches: Mutex<Vec<Patch>>,
}

impl PatchManager {
    pub fn new(sdk: Sdk, resolver: Weak<dyn Resolver>) -> Self {
        Self {
            sdk,
            resolver,
            patches: Mutex::new(Vec::new()),
        }
    }

    pub fn sdk(&self) -> &Sdk {
        &self.sdk
    }

    pub fn installed(&self) -> bool {
        !self.patches.lock().is_empty()
    }

    pub fn patched_sites(&self) -> Vec<CallSite> {
        self.patches.lock().iter().map(|p| p.site).collect()
    }

    pub fn patches(&self) -> Vec<Patch> {
        self.patches.lock().clone()
    }

    /// Wrap every occupied call site that is not already wrapped.
    ///
    /// Returns the number of sites newly wrapped.
    pub fn install(&self) -> usize {
        let mut patches = self.patches.lock();
        let mut added = 0;
        for site in self.sdk.sites() {
            if patches.iter().any(|p| p.site == site) {
                continue;
            }
            let armed = Arc::new(AtomicBool::new(true));
            let mut shim = None;
            let original = self.sdk.wrap_slot(site, |current| {
                let wrapped = shim_for(site, current, &self.resolver, &armed);
                shim = Some(wrapped.clone());
                wrapped
            });
            if let (Some(original), Some(shim)) = (original, shim) {
                tracing::debug!(%site, "installed interception");
                patches.push(Patch {
                    site,
                    original,
                    shim,
                    armed,
                });
                added += 1;
            }
        }
        added
    }

    /// Restore displaced clients, most recent first.
    ///
    /// Every removed shim is disarmed. When another manager's shim covers
    /// ours, ours is retired so that manager restores past it later. A slot
    /// re-registered since installation keeps its new client.
    pub fn uninstall(&self) -> usize {
        let mut patches = self.patches.lock();
        let mut restored = 0;
        while let Some(patch) = patches.pop() {
            patch.armed.store(false, Ordering::SeqCst);
            let still_ours = self
                .sdk
                .client(patch.site)
                .is_some_and(|current| current.ptr_eq(&patch.shim));
            if !still_ours {
                tracing::debug!(site = %patch.site, "call site covered or re-registered, retiring shim");
                self.sdk.retire(patch.site, patch.shim, patch.original);
                continue;
            }
            let original = self.sdk.unwind(patch.site, patch.original);
            self.sdk.replace(patch.site, original);
            tracing::debug!(site = %patch.site, "removed interception");
            restored += 1;
        }
        restored
    }
}

impl std::fmt::Debug for PatchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchManager")
            .field("patched_sites", &self.patched_sites())
            .finish()
    }
}

fn shim_for(
    site: CallSite,
    client: &Client,
    resolver: &Weak<dyn Resolver>,
    armed: &Arc<AtomicBool>,
) -> Client {
    match client {
        Client::Chat(original) => Client::Chat(Arc::new(Shim {
            site,
            original: Arc::clone(original),
            resolver: resolver.clone(),
            armed: Arc::clone(armed),
        })),
        Client::Messages(original) => Client::Messages(Arc::new(Shim {
            site,
            original: Arc::clone(original),
            resolver: resolver.clone(),
            armed: Arc::clone(armed),
        })),
        Client::Generative(original) => Client::Generative(Arc::new(Shim {
            site,
            original: Arc::clone(original),
            resolver: resolver.clone(),
            armed: Arc::clone(armed),
        })),
    }
}

struct Shim<C: ?Sized> {
    site: CallSite,
    original: Arc<C>,
    resolver: Weak<dyn Resolver>,
    armed: Arc<AtomicBool>,
}

impl<C: ?Sized> Shim<C> {
    /// The resolver, while this shim is installed and its owner is alive.
    fn active_resolver(&self) -> Option<Arc<dyn Resolver>> {
        if !self.armed.load(Ordering::SeqCst) {
            return None;
        }
        self.resolver.upgrade()
    }
}

impl ChatCompletions for Shim<dyn ChatCompletions> {
    fn create(&self, request: ChatCompletionRequest) -> Result<ChatCompletion, SenytlError> {
        intercept::<OpenAiWire>(self.site, self.active_resolver(), request, |r| {
            self.original.create(r)
        })
    }
}

impl Messages for Shim<dyn Messages> {
    fn create(&self, request: MessagesRequest) -> Result<Message, SenytlError> {
        intercept::<AnthropicWire>(self.site, self.active_resolver(), request, |r| {
            self.original.create(r)
        })
    }
}

impl GenerativeModel for Shim<dyn GenerativeModel> {
    fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, SenytlError> {
        intercept::<GoogleWire>(self.site, self.active_resolver(), request, |r| {
            self.original.generate_content(r)
        })
    }
}

fn intercept<W: WireFormat>(
    site: CallSite,
    resolver: Option<Arc<dyn Resolver>>,
    request: W::Request,
    original: impl FnOnce(W::Request) -> Result<W::Response, SenytlError>,
) -> Result<W::Response, SenytlError> {
    let Some(resolver) = resolver else {
        return original(request);
    };

    let model = W::model(&request);
    match resolver.resolve(W::PROVIDER, &model, W::normalize(&request))? {
        Resolution::Resolved(response) => Ok(W::synthesize(&response, &model)),
        Resolution::PassThrough(pass) => {
            tracing::debug!(%site, model = %model, "passing request through to real client");
            let raw = original(request)?;
            resolver.record_passthrough(pass, W::parse(&raw));
            Ok(raw)
        }
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
