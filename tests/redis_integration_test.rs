//! Integration tests against a real Redis instance.
//!
//! These are `#[ignore]`d by default; run them with a local Redis:
//! `cargo test -- --ignored`

mod common;

use std::sync::Arc;

use common::TestContext;
use uuid::Uuid;
use voicebridge::models::{Identity, SignupRequest};
use voicebridge::services::{
    RateLimitRule, RateLimiter, RedisUsageStore, SessionData, SessionService, UsageService,
    UserService,
};

#[tokio::test]
#[ignore]
async fn test_session_roundtrip() {
    let ctx = TestContext::new().await.expect("Failed to setup Redis");
    let sessions = SessionService::new(Arc::new(ctx.redis.clone()), 3600);

    let mut session = SessionData::new_guest();
    let id = session.id.clone();

    assert!(sessions.load(&id).await.expect("load failed").is_none());

    sessions.save(&session).await.expect("save failed");
    let loaded = sessions
        .load(&id)
        .await
        .expect("load failed")
        .expect("session missing");
    assert_eq!(loaded.id, id);
    assert!(loaded.user_id.is_none());
    println!("✅ Guest session persisted");

    sessions
        .attach_user(&mut session, "user123")
        .await
        .expect("attach failed");
    let loaded = sessions
        .load(&id)
        .await
        .expect("load failed")
        .expect("session missing");
    assert_eq!(loaded.user_id.as_deref(), Some("user123"));
    println!("✅ Session upgraded to authenticated");

    sessions.destroy(&id).await.expect("destroy failed");
    assert!(sessions.load(&id).await.expect("load failed").is_none());
    println!("✅ Session destroyed");
}

#[tokio::test]
#[ignore]
async fn test_user_signup_and_authenticate() {
    let ctx = TestContext::new().await.expect("Failed to setup Redis");
    let users = UserService::new(Arc::new(ctx.redis.clone()));

    let email = format!("test-{}@example.com", Uuid::new_v4());
    let req = SignupRequest {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.clone(),
        password: "hunter2hunter2".to_string(),
        country: "Rwanda".to_string(),
        current_country_of_resident: "Rwanda".to_string(),
        how_they_heard: "friend".to_string(),
        organization: None,
        what_they_do: "Student".to_string(),
    };

    let user = users.create_user(&req).await.expect("signup failed");
    println!("✅ User created: {}", user.id);

    // Duplicate email is rejected
    assert!(users.create_user(&req).await.is_err());
    println!("✅ Duplicate email rejected");

    let authed = users
        .authenticate(&email, "hunter2hunter2")
        .await
        .expect("auth failed");
    assert_eq!(authed.id, user.id);
    println!("✅ Login with correct password");

    assert!(users.authenticate(&email, "wrong-password").await.is_err());
    println!("✅ Wrong password rejected");
}

#[tokio::test]
#[ignore]
async fn test_usage_counter_increments_atomically() {
    let ctx = TestContext::new().await.expect("Failed to setup Redis");
    let store = Arc::new(RedisUsageStore::new(Arc::new(ctx.redis.clone())));
    let usage = Arc::new(UsageService::new(store, 3));

    // Fresh identity per run so reruns start clean
    let identity = Identity::Session(Uuid::new_v4().to_string());
    let date = "2025-06-01";

    let mut handles = Vec::new();
    for _ in 0..8 {
        let usage = usage.clone();
        let identity = identity.clone();
        handles.push(tokio::spawn(async move {
            usage.record_usage_on(&identity, date).await
        }));
    }
    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.expect("task panicked").expect("record failed"));
    }

    counts.sort_unstable();
    assert_eq!(counts, (1..=8).collect::<Vec<i64>>());
    println!("✅ Concurrent increments yielded distinct totals");

    let limit = usage
        .check_limit_on(&identity, date)
        .await
        .expect("check failed");
    assert!(!limit.can_translate);
    println!("✅ Exhausted counter denies translation");
}

#[tokio::test]
#[ignore]
async fn test_rate_limiter_window() {
    let ctx = TestContext::new().await.expect("Failed to setup Redis");
    let limiter = RateLimiter::new(Arc::new(ctx.redis.clone()));

    let client = Uuid::new_v4().to_string();
    let rule = RateLimitRule {
        window_secs: 60,
        max_requests: 3,
    };

    for _ in 0..3 {
        limiter
            .check("test", &client, rule, "Too many requests")
            .await
            .expect("check failed");
    }
    println!("✅ Requests within the window pass");

    let denied = limiter.check("test", &client, rule, "Too many requests").await;
    assert!(denied.is_err());
    println!("✅ Request over the limit denied");
}
