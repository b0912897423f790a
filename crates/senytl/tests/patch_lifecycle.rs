// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Installing and removing interception on SDK call sites.

mod common;

use common::{ask_google, ask_openai, Harness};
use senytl::{CallSite, FallbackMode, Sdk, Senytl, SenytlConfig};

fn snapshot(sdk: &Sdk) -> Vec<(CallSite, senytl::providers::Client)> {
    sdk.sites()
        .into_iter()
        .filter_map(|site| sdk.client(site).map(|c| (site, c)))
        .collect()
}

#[test]
fn test_uninstall_restores_original_clients() {
    let h = Harness::new();
    let before = snapshot(&h.sdk);

    assert_eq!(h.senytl.install(), 3);
    assert!(h.senytl.is_installed());
    for (site, original) in &before {
        assert!(!h.sdk.client(*site).unwrap().ptr_eq(original));
    }

    assert_eq!(h.senytl.uninstall().unwrap(), 3);
    assert!(!h.senytl.is_installed());
    for (site, original) in &before {
        assert!(h.sdk.client(*site).unwrap().ptr_eq(original));
    }
}

#[test]
fn test_calls_reach_real_clients_after_uninstall() {
    let h = Harness::new();
    h.senytl.mock("gpt-4").always().respond("mocked");
    h.senytl.install();
    assert_eq!(ask_openai(&h.sdk, "gpt-4", "x").unwrap(), "mocked");

    h.senytl.uninstall().unwrap();
    assert_eq!(ask_openai(&h.sdk, "gpt-4", "x").unwrap(), "real openai");
    assert_eq!(h.openai.calls(), 1);
}

#[test]
fn test_repeated_install_is_noop() {
    let h = Harness::new();
    h.senytl.install();
    let shims = snapshot(&h.sdk);
    assert_eq!(h.senytl.install(), 0);
    for (site, shim) in &shims {
        assert!(h.sdk.client(*site).unwrap().ptr_eq(shim));
    }
}

#[test]
fn test_dropping_facade_restores_clients() {
    let h = Harness::new();
    let before = snapshot(&h.sdk);
    {
        let senytl = Senytl::with_config(h.sdk.clone(), h.dir.path(), SenytlConfig::default());
        senytl.install();
        assert!(!h.sdk.client(CallSite::GoogleGenerateContent).unwrap().ptr_eq(&before[2].1));
    }
    for (site, original) in &before {
        assert!(h.sdk.client(*site).unwrap().ptr_eq(original));
    }
    assert_eq!(ask_google(&h.sdk, "gemini-pro", "x").unwrap(), "real google");
}

#[test]
fn test_uninstall_stops_active_session() {
    let h = Harness::new();
    h.senytl.record_session("s").unwrap().detach();
    h.senytl.uninstall().unwrap();
    assert!(h.senytl.active_session().is_none());
    assert!(h.senytl.recorder().session_path("s").exists());
}

#[test]
fn test_missing_call_site_reports_error() {
    let h = Harness::new();
    h.senytl.install();
    let err = h
        .sdk
        .chat_completion_create(senytl::providers::ChatCompletionRequest::default())
        .unwrap_err();
    assert!(matches!(
        err,
        senytl::SenytlError::SdkUnavailable {
            site: CallSite::OpenAiLegacyChatCompletion
        }
    ));
}

#[test]
fn test_facades_sharing_sdk_uninstall_in_any_order() {
    let h = Harness::new();
    let before = snapshot(&h.sdk);
    h.senytl.mock("gpt-4").always().respond("from first");
    h.senytl.install();

    let second = Senytl::with_config(
        h.sdk.clone(),
        h.dir.path(),
        SenytlConfig {
            fallback: FallbackMode::PassThrough,
            ..SenytlConfig::default()
        },
    );
    second.install();

    h.senytl.uninstall().unwrap();
    assert_eq!(ask_openai(&h.sdk, "gpt-4", "hello").unwrap(), "real openai");

    second.uninstall().unwrap();
    for (site, original) in &before {
        assert!(h.sdk.client(*site).unwrap().ptr_eq(original));
    }
    assert_eq!(ask_openai(&h.sdk, "gpt-4", "hello").unwrap(), "real openai");
}
