// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Concurrent agent invocations sharing one installed facade.

mod common;

use common::{ask_openai, Harness};
use senytl::{MockResponse, SenytlError};
use std::sync::Arc;
use std::thread;

const WORKERS: usize = 16;

#[test]
fn test_each_run_sees_only_its_own_calls() {
    let h = Harness::new();
    h.senytl.mock("gpt-4").always().respond("ok");

    let sdk = h.sdk.clone();
    let agent = Arc::new(h.senytl.wrap(move |input: &str| -> Result<String, SenytlError> {
        ask_openai(&sdk, "gpt-4", input)?;
        Ok(input.to_string())
    }));

    let handles: Vec<_> = (0..WORKERS)
        .map(|i| {
            let agent = Arc::clone(&agent);
            thread::spawn(move || {
                let input = format!("worker {}", i);
                (input.clone(), agent.run(&input).unwrap())
            })
        })
        .collect();

    let mut total = 0;
    for handle in handles {
        let (input, response) = handle.join().unwrap();
        assert_eq!(response.text, input);
        assert_eq!(response.llm_calls.len(), 1);
        assert_eq!(
            response.llm_calls[0].request["messages"][0]["content"],
            input.as_str()
        );
        total += response.llm_calls.len();
    }
    assert_eq!(total, WORKERS);
    assert_eq!(h.senytl.engine().rules()[0].match_count(), WORKERS);
}

#[test]
fn test_tool_calls_do_not_cross_runs() {
    let h = Harness::new();
    for i in 0..WORKERS {
        h.senytl
            .mock("gpt-4")
            .when(senytl::MatchSpec::contains(format!("task-{:02}", i)))
            .respond(MockResponse::new("done").with_tools([format!("tool_{}", i)]));
    }

    let sdk = h.sdk.clone();
    let agent = Arc::new(h.senytl.wrap(move |input: &str| ask_openai(&sdk, "gpt-4", input)));

    thread::scope(|scope| {
        for i in 0..WORKERS {
            let agent = Arc::clone(&agent);
            scope.spawn(move || {
                let response = agent.run(&format!("run task-{:02}", i)).unwrap();
                assert_eq!(response.tool_names(), vec![format!("tool_{}", i)]);
            });
        }
    });
}

#[test]
fn test_concurrent_recording_keeps_every_call() {
    let h = Harness::new();
    h.senytl.mock("gpt-4").always().respond("ok");
    let session = h.senytl.record_session("load").unwrap();

    thread::scope(|scope| {
        for i in 0..WORKERS {
            let sdk = &h.sdk;
            scope.spawn(move || {
                for j in 0..10 {
                    ask_openai(sdk, "gpt-4", &format!("{}-{}", i, j)).unwrap();
                }
            });
        }
    });

    assert_eq!(h.senytl.recorder().buffered_calls().len(), WORKERS * 10);
    let path = session.stop().unwrap().unwrap();
    let saved = senytl::capture::SessionFile::load(&path).unwrap();
    assert_eq!(saved.calls.len(), WORKERS * 10);
}

#[test]
fn test_sequence_cursor_is_shared_across_threads() {
    let h = Harness::new();
    let rule = h
        .senytl
        .mock("gpt-4")
        .always()
        .respond_sequence(["first", "rest"]);
    h.senytl.install();

    let firsts: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|_| scope.spawn(|| ask_openai(&h.sdk, "gpt-4", "q").unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| usize::from(handle.join().unwrap() == "first"))
            .sum()
    });
    assert_eq!(firsts, 1);
    assert_eq!(rule.cursor(), WORKERS);
}
