//! End-to-end booking flow tests against a real PostgreSQL database.
//!
//! Run with `TEST_DATABASE_URL` pointing at a scratch database:
//! `cargo test -p club-portal-api -- --ignored`

mod common;

use axum::http::{Method, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use common::*;
use domain::services::notification::NotificationKind;

#[tokio::test]
#[ignore]
async fn test_enlist_open_slot_then_loser_is_told_who_won() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, _) = build_app(pool.clone()).await;

    let anna = seed_member(&pool, "Anna Andersson").await;
    let bo = seed_member(&pool, "Bo Berg").await;
    let event = seed_event(&pool, "Race weekend").await;
    let activity = seed_activity(&pool, event, "Flag marshal", 2.0).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/enlist"),
            Some((anna, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["transferred"], false);
    assert_eq!(assigned_member(&pool, activity).await, Some(anna));

    // Second member is refused and told who holds the slot
    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/enlist"),
            Some((bo, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Anna Andersson"));
    assert_eq!(assigned_member(&pool, activity).await, Some(anna));
}

#[tokio::test]
#[ignore]
async fn test_enlist_is_idempotent_for_current_holder() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, _) = build_app(pool.clone()).await;

    let anna = seed_member(&pool, "Anna Andersson").await;
    let event = seed_event(&pool, "Track day").await;
    let activity = seed_activity(&pool, event, "Timekeeper", 1.0).await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                &format!("/api/v1/activities/{activity}/enlist"),
                Some((anna, false)),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(assigned_member(&pool, activity).await, Some(anna));
}

#[tokio::test]
#[ignore]
async fn test_transfer_over_pending_delist_clears_stale_requests() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, _) = build_app(pool.clone()).await;

    let anna = seed_member(&pool, "Anna Andersson").await;
    let bo = seed_member(&pool, "Bo Berg").await;
    let event = seed_event(&pool, "Club championship").await;
    let activity = seed_activity(&pool, event, "Grid marshal", 2.0).await;

    // Anna books and asks to be delisted
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/enlist"),
            Some((anna, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/delist-requests",
            Some((anna, false)),
            Some(serde_json::json!({
                "activity_id": activity,
                "reason": "Away that weekend"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(pending_request_count(&pool, activity).await, 1);

    // Bo takes over; Anna's pending request disappears with the slot
    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/enlist"),
            Some((bo, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["transferred"], true);

    assert_eq!(assigned_member(&pool, activity).await, Some(bo));
    assert_eq!(pending_request_count(&pool, activity).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_delist_request_approval_releases_slot_once() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, notifier) = build_app(pool.clone()).await;

    let anna = seed_member(&pool, "Anna Andersson").await;
    let staff = seed_member(&pool, "Stina Staff").await;
    let event = seed_event(&pool, "Endurance night").await;
    let activity = seed_activity(&pool, event, "Pit marshal", 3.0).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/enlist"),
            Some((anna, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/delist-requests",
            Some((anna, false)),
            Some(serde_json::json!({
                "activity_id": activity,
                "reason": "Family visit"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let request_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["status"], "pending");

    // Members cannot resolve
    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/api/v1/delist-requests/{request_id}"),
            Some((anna, false)),
            Some(serde_json::json!({ "approved": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff approval releases the slot
    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/api/v1/delist-requests/{request_id}"),
            Some((staff, true)),
            Some(serde_json::json!({ "approved": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(assigned_member(&pool, activity).await, None);

    // Resolution is one-shot
    let response = app
        .oneshot(request(
            Method::PATCH,
            &format!("/api/v1/delist-requests/{request_id}"),
            Some((staff, true)),
            Some(serde_json::json!({ "approved": false })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Notification goes out after the commit, on a spawned task
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(notifier
        .recorded_kinds()
        .contains(&NotificationKind::DelistApproved));
}

#[tokio::test]
#[ignore]
async fn test_staff_hard_delist() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, _) = build_app(pool.clone()).await;

    let anna = seed_member(&pool, "Anna Andersson").await;
    let staff = seed_member(&pool, "Stina Staff").await;
    let event = seed_event(&pool, "Spring opener").await;
    let activity = seed_activity(&pool, event, "Scrutineer", 1.0).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/enlist"),
            Some((anna, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Members cannot hard delist
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/delist"),
            Some((anna, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/delist"),
            Some((staff, true)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(assigned_member(&pool, activity).await, None);
}

#[tokio::test]
#[ignore]
async fn test_email_verification_round_trip() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, notifier) = build_app(pool.clone()).await;

    let anna = seed_member(&pool, "Anna Andersson").await;
    sqlx::query("UPDATE members SET email_verified = FALSE WHERE id = $1")
        .bind(anna)
        .execute(&pool)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/members/{anna}/verify/email/request"),
            Some((anna, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let code: String = sqlx::query_scalar(
        "SELECT email_verification_code FROM members WHERE id = $1",
    )
    .bind(anna)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(code.len(), 6);

    // Wrong code is refused
    let wrong = if code == "000000" { "000001" } else { "000000" };
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/members/{anna}/verify/email/confirm"),
            Some((anna, false)),
            Some(serde_json::json!({ "code": wrong })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/members/{anna}/verify/email/confirm"),
            Some((anna, false)),
            Some(serde_json::json!({ "code": code })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["verified"], true);

    let verified: bool = sqlx::query_scalar("SELECT email_verified FROM members WHERE id = $1")
        .bind(anna)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(verified);

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(notifier
        .recorded_kinds()
        .contains(&NotificationKind::EmailVerificationRequested));
}

#[tokio::test]
#[ignore]
async fn test_profile_patch_resets_verified_flag() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, _) = build_app(pool.clone()).await;

    let anna = seed_member(&pool, "Anna Andersson").await;

    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/api/v1/members/{anna}"),
            Some((anna, false)),
            Some(serde_json::json!({ "phone_number": "+46709998877" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["phone_number"], "+46709998877");
    assert_eq!(body["phone_verified"], false);
    assert_eq!(body["email_verified"], true);

    // Membercard changes are staff-only
    let response = app
        .oneshot(request(
            Method::PATCH,
            &format!("/api/v1/members/{anna}"),
            Some((anna, false)),
            Some(serde_json::json!({ "membercard_number": "GK-FAKE" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_reports_are_staff_only() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, _) = build_app(pool.clone()).await;

    let anna = seed_member(&pool, "Anna Andersson").await;
    let staff = seed_member(&pool, "Stina Staff").await;

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/v1/reports/members/has-card",
            Some((anna, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/v1/reports/members/has-card",
            Some((staff, true)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["data"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_missing_caller_identity_is_unauthorized() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, _) = build_app(pool.clone()).await;

    let response = app
        .oneshot(request(Method::GET, "/api/v1/events", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_completed_outcome_round_trip() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, _) = build_app(pool.clone()).await;

    let anna = seed_member(&pool, "Anna Andersson").await;
    let staff = seed_member(&pool, "Stina Staff").await;
    let event = seed_event(&pool, "Autumn finale").await;
    let activity = seed_activity(&pool, event, "Flag marshal", 1.0).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/enlist"),
            Some((anna, false)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/api/v1/activities/{activity}/completed"),
            Some((staff, true)),
            Some(serde_json::json!({ "completed": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["completed"], true);

    // Clearing returns the activity to undetermined
    let response = app
        .oneshot(request(
            Method::PATCH,
            &format!("/api/v1/activities/{activity}/completed"),
            Some((staff, true)),
            Some(serde_json::json!({ "completed": null })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body.get("completed").is_none() || body["completed"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_proxy_booking_attributes_weight_to_held_member() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let (app, _) = build_app(pool.clone()).await;

    let holder = seed_member(&pool, "Anna Andersson").await;
    let minor = seed_member(&pool, "Calle Andersson").await;
    let outsider = seed_member(&pool, "Bo Berg").await;
    sqlx::query("INSERT INTO member_proxies (holder_id, for_member_id) VALUES ($1, $2)")
        .bind(holder)
        .bind(minor)
        .execute(&pool)
        .await
        .unwrap();

    let event = seed_event(&pool, "Junior cup").await;
    let activity = seed_activity(&pool, event, "Kart handler", 2.0).await;

    // Booking for a member you hold no proxy for is refused
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/enlist"),
            Some((outsider, false)),
            Some(serde_json::json!({ "as_member_id": minor })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/activities/{activity}/enlist"),
            Some((holder, false)),
            Some(serde_json::json!({ "as_member_id": minor })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The holder is the assignee, the weight counts for the held member
    assert_eq!(assigned_member(&pool, activity).await, Some(holder));
    let for_proxy: Option<Uuid> = sqlx::query_scalar(
        "SELECT assigned_for_proxy_id FROM activities WHERE id = $1",
    )
    .bind(activity)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(for_proxy, Some(minor));
}
