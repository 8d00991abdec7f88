// ABOUTME: Integration tests for the plan generation client against a scripted provider
// ABOUTME: Covers validation failures, the strict JSON retry, provider errors, and the deadline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    client_with, female_profile, init_test_logging, plan_reply, plan_reply_with_total,
    request_for, MockLlmProvider, Step,
};
use nutriplan::config::GenerationConfig;
use nutriplan::errors::{ErrorCode, PlanError, GENERATION_USER_MESSAGE};
use nutriplan::llm::prompts::STRICT_JSON_REMINDER;
use nutriplan::llm::MessageRole;
use nutriplan::plans::PlanGenerationClient;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_valid_reply_becomes_plan() {
    init_test_logging();
    let request = request_for(&female_profile());
    let provider = Arc::new(MockLlmProvider::replies([plan_reply("Lean Day", 1598)]));
    let client = client_with(Arc::clone(&provider));

    let output = client.generate(&request).await.unwrap();

    assert_eq!(output.attempts, 1);
    assert_eq!(output.plan.name, "Lean Day");
    assert_eq!(output.plan.target_calories, 1598);
    assert_eq!(output.plan.meals.len(), 3);
    assert_eq!(output.plan.model, "mock-model");
    assert!(output.plan.calorie_deviation() < 1e-6);

    let sent = provider.requests();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].json_mode);
    assert_eq!(sent[0].model.as_deref(), Some("mock-model"));
    assert_eq!(sent[0].messages[0].role, MessageRole::System);
}

#[tokio::test]
async fn test_fenced_reply_with_prose_is_accepted() {
    let request = request_for(&female_profile());
    let reply = format!(
        "Sure! Here is the plan.\n```json\n{}\n```\nLet me know.",
        plan_reply("Fenced", 1598)
    );
    let provider = Arc::new(MockLlmProvider::replies([reply]));

    let output = client_with(provider).generate(&request).await.unwrap();
    assert_eq!(output.plan.name, "Fenced");
}

#[tokio::test]
async fn test_parse_failure_retries_once_with_strict_instruction() {
    init_test_logging();
    let request = request_for(&female_profile());
    let provider = Arc::new(MockLlmProvider::replies([
        "I think you should eat more vegetables.".to_owned(),
        plan_reply("Second Try", 1598),
    ]));
    let client = client_with(Arc::clone(&provider));

    let output = client.generate(&request).await.unwrap();

    assert_eq!(output.attempts, 2);
    assert_eq!(output.plan.name, "Second Try");

    let sent = provider.requests();
    assert_eq!(sent.len(), 2);
    let last = sent[1].messages.last().unwrap();
    assert_eq!(last.role, MessageRole::User);
    assert_eq!(last.content, STRICT_JSON_REMINDER);
    assert!(sent[1].temperature.unwrap() <= 0.2);
    assert!(!sent[0]
        .messages
        .iter()
        .any(|m| m.content == STRICT_JSON_REMINDER));
}

#[tokio::test]
async fn test_parse_failure_surfaces_after_retry() {
    let request = request_for(&female_profile());
    let provider = Arc::new(MockLlmProvider::replies(["not json", "still not json"]));
    let client = client_with(Arc::clone(&provider));

    let error = client.generate(&request).await.unwrap_err();

    assert!(matches!(error, PlanError::GenerationParse { .. }));
    assert_eq!(error.user_message(), GENERATION_USER_MESSAGE);
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_no_retry_when_disabled() {
    let request = request_for(&female_profile());
    let provider = Arc::new(MockLlmProvider::replies(["nope", "unused"]));
    let config = GenerationConfig {
        strict_retry: false,
        ..GenerationConfig::default()
    };
    let client = PlanGenerationClient::new(provider.clone(), config);

    let error = client.generate(&request).await.unwrap_err();

    assert!(matches!(error, PlanError::GenerationParse { .. }));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_calorie_drift_beyond_tolerance_is_rejected() {
    let request = request_for(&female_profile());
    let target = request.target_calories;
    let over = plan_reply_with_total("Too Much", target, f64::from(target) * 1.2);
    let provider = Arc::new(MockLlmProvider::replies([over.clone(), over]));

    let error = client_with(provider).generate(&request).await.unwrap_err();
    match error {
        PlanError::GenerationParse { reason, .. } => assert!(reason.contains("away from")),
        other => panic!("expected GenerationParse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_calorie_drift_within_tolerance_is_accepted() {
    let request = request_for(&female_profile());
    let target = request.target_calories;
    let close = plan_reply_with_total("Close", target, f64::from(target) * 1.05);
    let provider = Arc::new(MockLlmProvider::replies([close]));

    let plan = client_with(provider).generate(&request).await.unwrap().plan;
    assert!((plan.calorie_deviation() - 0.05).abs() < 1e-6);
}

#[tokio::test]
async fn test_declared_target_mismatch_is_rejected() {
    let request = request_for(&female_profile());
    let wrong = plan_reply_with_total("Wrong Target", 2500, f64::from(request.target_calories));
    let provider = Arc::new(MockLlmProvider::replies([wrong.clone(), wrong]));

    let error = client_with(provider).generate(&request).await.unwrap_err();
    assert!(matches!(error, PlanError::GenerationParse { .. }));
}

#[tokio::test]
async fn test_macro_ratios_must_sum_to_one() {
    let request = request_for(&female_profile());
    let bad = plan_reply("Bad Macros", 1598).replace("\"fats_ratio\":0.3", "\"fats_ratio\":0.4");
    assert!(bad.contains("\"fats_ratio\":0.4"));
    let provider = Arc::new(MockLlmProvider::replies([bad.clone(), bad]));

    let error = client_with(provider).generate(&request).await.unwrap_err();
    match error {
        PlanError::GenerationParse { reason, .. } => assert!(reason.contains("sum to 1.0")),
        other => panic!("expected GenerationParse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_plan_without_meals_is_rejected() {
    let request = request_for(&female_profile());
    let empty = r#"{"name":"Empty","description":"","target_calories":1598,
        "macro_ratios":{"protein_ratio":0.4,"carbs_ratio":0.3,"fats_ratio":0.3},"meals":[]}"#;
    let provider = Arc::new(MockLlmProvider::replies([empty, empty]));

    let error = client_with(provider).generate(&request).await.unwrap_err();
    match error {
        PlanError::GenerationParse { reason, excerpt } => {
            assert!(reason.contains("no meals"));
            assert!(excerpt.starts_with("{\"name\":\"Empty\""));
        }
        other => panic!("expected GenerationParse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_provider_failure_is_unavailable_and_not_retried() {
    let request = request_for(&female_profile());
    let provider = Arc::new(MockLlmProvider::new(vec![
        Step::Fail(ErrorCode::ExternalServiceUnavailable),
        Step::Reply(plan_reply("Unused", 1598)),
    ]));
    let client = client_with(Arc::clone(&provider));

    let error = client.generate(&request).await.unwrap_err();

    assert!(matches!(error, PlanError::GenerationUnavailable { .. }));
    assert!(!error.is_retryable());
    assert_eq!(error.user_message(), GENERATION_USER_MESSAGE);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_timeout_aborts_call() {
    let request = request_for(&female_profile());
    let provider = Arc::new(MockLlmProvider::new(vec![Step::Delayed(
        Duration::from_secs(5),
        plan_reply("Too Late", 1598),
    )]));
    let config = GenerationConfig::default().with_timeout(Duration::from_millis(50));
    let client = PlanGenerationClient::new(provider, config);

    let started = Instant::now();
    let error = client.generate(&request).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2));
    match error {
        PlanError::GenerationUnavailable { reason } => assert!(reason.contains("no reply within")),
        other => panic!("expected GenerationUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_deadline_covers_the_retry() {
    let request = request_for(&female_profile());
    let provider = Arc::new(MockLlmProvider::new(vec![
        Step::Delayed(Duration::from_millis(60), "garbage".to_owned()),
        Step::Delayed(Duration::from_millis(200), plan_reply("Late Retry", 1598)),
    ]));
    let config = GenerationConfig::default().with_timeout(Duration::from_millis(150));
    let client = PlanGenerationClient::new(provider.clone(), config);

    let error = client.generate(&request).await.unwrap_err();

    assert!(matches!(error, PlanError::GenerationUnavailable { .. }));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_unschedulable_timeout_is_unavailable_without_calling() {
    let request = request_for(&female_profile());
    let provider = Arc::new(MockLlmProvider::replies([plan_reply("Unused", 1598)]));
    let config = GenerationConfig::default().with_timeout(Duration::from_secs(u64::MAX));
    let client = PlanGenerationClient::new(provider.clone(), config);

    let error = client.generate(&request).await.unwrap_err();

    match error {
        PlanError::GenerationUnavailable { reason } => assert!(reason.contains("cannot be scheduled")),
        other => panic!("expected GenerationUnavailable, got {other:?}"),
    }
    assert_eq!(provider.call_count(), 0);
}
