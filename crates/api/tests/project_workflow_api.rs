//! HTTP-level tests for the project approval workflow.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch, patch_json, post, post_json, put_json};
use netcrm_api::notifications::NotificationRouter;
use netcrm_core::roles::{ROLE_ADMIN, ROLE_MANAGER, ROLE_SALES};
use netcrm_db::repositories::{NotificationRepo, ProjectRepo};
use netcrm_events::project::{APPROVAL_REQUESTED, APPROVED, REJECTED};
use serde_json::json;
use sqlx::PgPool;

/// Create a project through the API and return its id.
async fn create_project(
    app: &axum::Router,
    token: &str,
    lead_id: i64,
    product_id: i64,
    manager_id: Option<i64>,
) -> i64 {
    let response = post_json(
        app,
        "/api/v1/projects",
        token,
        json!({
            "name": "Fiber rollout",
            "description": "Office park, 3 buildings",
            "lead_id": lead_id,
            "product_id": product_id,
            "manager_id": manager_id,
            "estimated_value": "1500000.00",
            "start_date": "2024-01-01",
            "end_date": "2024-03-31",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["message"], "Project created successfully.");
    json["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_date_before_start_date_is_rejected(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/projects",
        &common::token_for(&sales),
        json!({
            "name": "Fiber X",
            "description": "Warehouse",
            "lead_id": 42,
            "product_id": 7,
            "start_date": "2024-01-10",
            "end_date": "2024-01-01",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["errors"]["end_date"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_validation_collects_every_field(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/projects",
        &common::token_for(&sales),
        json!({ "status": "approved", "estimated_value": "-5" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let errors = &body_json(response).await["errors"];
    for field in ["name", "description", "lead_id", "product_id", "estimated_value", "status"] {
        assert!(errors[field].is_string(), "missing error for {field}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_lead_is_a_field_error(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/projects",
        &common::token_for(&sales),
        json!({
            "name": "Orphan",
            "description": "No such lead",
            "lead_id": 999_999,
            "product_id": product.id,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["errors"]["lead_id"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_approve_complete_notifies_manager_then_creator(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let manager = common::create_user(&pool, "Mia Manager", ROLE_MANAGER).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let (app, state) = common::build_test_app_with_state(pool.clone());
    let mut events = state.event_bus.subscribe();
    let router = NotificationRouter::new(pool.clone(), 1);
    let sales_token = common::token_for(&sales);
    let manager_token = common::token_for(&manager);

    let id = create_project(&app, &sales_token, lead.id, product.id, Some(manager.id)).await;

    // Submit: the assigned manager is told.
    let response = post(&app, &format!("/api/v1/projects/{id}/submit-for-approval"), &sales_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "waiting_approval");

    let event = events.try_recv().expect("submit publishes an event");
    assert_eq!(event.event_type, APPROVAL_REQUESTED);
    let notice = router.handle_event(&event).await.expect("stored");
    assert_eq!(notice.user_id, manager.id);
    assert_eq!(notice.project_id, Some(id));
    assert_eq!(notice.actor_user_id, Some(sales.id));

    // Approve: the creator is told.
    let response = patch(&app, &format!("/api/v1/projects/{id}/approve"), &manager_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "approved");
    assert_eq!(json["data"]["manager_id"], manager.id);
    assert!(json["data"]["approved_at"].is_string());
    assert!(json["data"]["completed_at"].is_null());

    let event = events.try_recv().expect("approve publishes an event");
    assert_eq!(event.event_type, APPROVED);
    let notice = router.handle_event(&event).await.expect("stored");
    assert_eq!(notice.user_id, sales.id);

    // Complete: no notification.
    let response = patch(&app, &format!("/api/v1/projects/{id}/complete"), &sales_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "completed");
    assert!(json["data"]["completed_at"].is_string());
    assert!(events.try_recv().is_err());

    let project = ProjectRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(project.approved_at.unwrap() <= project.completed_at.unwrap());
    assert_eq!(NotificationRepo::unread_count(&pool, manager.id).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, sales.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_without_manager_notifies_nobody(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let (app, state) = common::build_test_app_with_state(pool);
    let mut events = state.event_bus.subscribe();
    let token = common::token_for(&sales);

    let id = create_project(&app, &token, lead.id, product.id, None).await;
    let response = post(&app, &format!("/api/v1/projects/{id}/submit-for-approval"), &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(events.try_recv().is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approving_a_pending_project_is_refused(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let manager = common::create_user(&pool, "Mia Manager", ROLE_MANAGER).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let app = common::build_test_app(pool.clone());

    let id = create_project(&app, &common::token_for(&sales), lead.id, product.id, None).await;
    let response = patch(
        &app,
        &format!("/api/v1/projects/{id}/approve"),
        &common::token_for(&manager),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_STATE");
    assert_eq!(json["error"], format!("Cannot approve Project {id} while it is pending"));

    let project = ProjectRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(project.status.as_str(), "pending");
    assert!(project.approved_at.is_none());
    assert!(project.manager_id.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_stores_reason_and_resubmit_clears_it(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let manager = common::create_user(&pool, "Mia Manager", ROLE_MANAGER).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let (app, state) = common::build_test_app_with_state(pool.clone());
    let sales_token = common::token_for(&sales);
    let manager_token = common::token_for(&manager);

    let id = create_project(&app, &sales_token, lead.id, product.id, None).await;
    post(&app, &format!("/api/v1/projects/{id}/submit-for-approval"), &sales_token).await;

    let mut events = state.event_bus.subscribe();
    let response = patch_json(
        &app,
        &format!("/api/v1/projects/{id}/reject"),
        &manager_token,
        json!({ "reason": "Budget too high" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "rejected");
    assert_eq!(json["data"]["rejection_reason"], "Budget too high");
    assert_eq!(json["data"]["manager_id"], manager.id);
    assert!(json["data"]["rejected_at"].is_string());

    let event = events.try_recv().expect("reject publishes an event");
    assert_eq!(event.event_type, REJECTED);
    let notice = NotificationRouter::new(pool.clone(), 1)
        .handle_event(&event)
        .await
        .expect("stored");
    assert_eq!(notice.user_id, sales.id);
    assert!(notice.message.contains("Budget too high"));
    assert_eq!(notice.payload["reason"], "Budget too high");

    // A rejected project may be edited and submitted again.
    let response = put_json(
        &app,
        &format!("/api/v1/projects/{id}"),
        &sales_token,
        json!({ "estimated_value": "900000" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post(&app, &format!("/api/v1/projects/{id}/submit-for-approval"), &sales_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "waiting_approval");
    assert!(json["data"]["rejection_reason"].is_null());
    assert!(json["data"]["rejected_at"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sales_cannot_decide_on_projects(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let app = common::build_test_app(pool);
    let token = common::token_for(&sales);

    let id = create_project(&app, &token, lead.id, product.id, None).await;
    post(&app, &format!("/api/v1/projects/{id}/submit-for-approval"), &token).await;

    let response = patch(&app, &format!("/api/v1/projects/{id}/approve"), &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = get(&app, "/api/v1/projects/pending-approval", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_waiting_project_cannot_be_edited(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let app = common::build_test_app(pool);
    let token = common::token_for(&sales);

    let id = create_project(&app, &token, lead.id, product.id, None).await;
    post(&app, &format!("/api/v1/projects/{id}/submit-for-approval"), &token).await;

    let response = put_json(
        &app,
        &format!("/api/v1/projects/{id}"),
        &token,
        json!({ "name": "Renamed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");

    let response = get(&app, &format!("/api/v1/projects/{id}/edit"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_on_missing_project_is_404(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let app = common::build_test_app(pool);

    let response = patch(&app, "/api/v1/projects/424242/start", &common::token_for(&sales)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Project with id 424242 not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pages_carry_component_and_props(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let manager = common::create_user(&pool, "Mia Manager", ROLE_MANAGER).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let app = common::build_test_app(pool);
    let sales_token = common::token_for(&sales);
    let manager_token = common::token_for(&manager);

    let id = create_project(&app, &sales_token, lead.id, product.id, Some(manager.id)).await;
    post(&app, &format!("/api/v1/projects/{id}/submit-for-approval"), &sales_token).await;

    let json = body_json(get(&app, "/api/v1/projects/create", &sales_token).await).await;
    assert_eq!(json["component"], "Projects/Create");
    assert_eq!(json["props"]["managers"][0]["name"], "Mia Manager");
    assert_eq!(json["props"]["statuses"].as_array().unwrap().len(), 2);

    let json = body_json(get(&app, &format!("/api/v1/projects/{id}"), &manager_token).await).await;
    assert_eq!(json["component"], "Projects/Show");
    assert_eq!(json["props"]["project"]["lead_name"], "Acme");
    assert_eq!(json["props"]["actions"], json!(["approve", "reject"]));
    assert_eq!(json["props"]["can_edit"], false);

    let json = body_json(get(&app, "/api/v1/projects/pending-approval", &manager_token).await).await;
    assert_eq!(json["component"], "Projects/PendingApproval");
    assert_eq!(json["props"]["projects"]["meta"]["total"], 1);
    assert_eq!(json["props"]["projects"]["data"][0]["id"], id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filtered_index_is_repeatable(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let app = common::build_test_app(pool);
    let token = common::token_for(&sales);
    for _ in 0..3 {
        create_project(&app, &token, lead.id, product.id, None).await;
    }

    let uri = "/api/v1/projects?status=pending&search=fiber&per_page=2";
    let first = body_json(get(&app, uri, &token).await).await;
    let second = body_json(get(&app, uri, &token).await).await;

    assert_eq!(first, second);
    let projects = &first["props"]["projects"];
    assert_eq!(projects["meta"]["total"], 3);
    assert_eq!(projects["meta"]["last_page"], 2);
    assert_eq!(projects["data"].as_array().unwrap().len(), 2);
    let next = projects["links"].as_array().unwrap().last().unwrap();
    assert_eq!(next["label"], "Next &raquo;");
    let url = next["url"].as_str().unwrap();
    assert!(url.starts_with("/api/v1/projects?"));
    assert!(url.contains("status=pending"));
    assert!(url.ends_with("page=2"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_keeps_reason_whitespace(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let manager = common::create_user(&pool, "Mia Manager", ROLE_MANAGER).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let (app, state) = common::build_test_app_with_state(pool.clone());
    let sales_token = common::token_for(&sales);

    let id = create_project(&app, &sales_token, lead.id, product.id, None).await;
    post(&app, &format!("/api/v1/projects/{id}/submit-for-approval"), &sales_token).await;

    let mut events = state.event_bus.subscribe();
    let response = patch_json(
        &app,
        &format!("/api/v1/projects/{id}/reject"),
        &common::token_for(&manager),
        json!({ "reason": "  Budget too high\n" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["rejection_reason"], "  Budget too high\n");

    let stored = ProjectRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.rejection_reason.as_deref(), Some("  Budget too high\n"));

    let event = events.try_recv().expect("reject publishes an event");
    assert_eq!(event.payload["reason"], "  Budget too high\n");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_without_body_stores_no_reason(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let manager = common::create_user(&pool, "Mia Manager", ROLE_MANAGER).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let app = common::build_test_app(pool);
    let sales_token = common::token_for(&sales);

    let id = create_project(&app, &sales_token, lead.id, product.id, None).await;
    post(&app, &format!("/api/v1/projects/{id}/submit-for-approval"), &sales_token).await;

    let response = patch(
        &app,
        &format!("/api/v1/projects/{id}/reject"),
        &common::token_for(&manager),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "rejected");
    assert!(json["data"]["rejection_reason"].is_null());
    assert!(json["data"]["rejected_at"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_admin_can_delete_project(pool: PgPool) {
    let sales = common::create_user(&pool, "Sam Sales", ROLE_SALES).await;
    let manager = common::create_user(&pool, "Mia Manager", ROLE_MANAGER).await;
    let admin = common::create_user(&pool, "Ada Admin", ROLE_ADMIN).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let app = common::build_test_app(pool.clone());
    let sales_token = common::token_for(&sales);

    let id = create_project(&app, &sales_token, lead.id, product.id, None).await;
    let uri = format!("/api/v1/projects/{id}");

    let response = delete(&app, &uri, &sales_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = delete(&app, &uri, &common::token_for(&manager)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(ProjectRepo::find_by_id(&pool, id).await.unwrap().is_some());

    let response = delete(&app, &uri, &common::token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(ProjectRepo::find_by_id(&pool, id).await.unwrap().is_none());
}
