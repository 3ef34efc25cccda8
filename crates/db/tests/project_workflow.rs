//! Integration tests for project persistence and workflow transitions.

mod common;

use netcrm_core::pagination::PageRequest;
use netcrm_core::roles::{ROLE_MANAGER, ROLE_SALES};
use netcrm_core::status::ProjectStatus;
use netcrm_core::workflow::{ProjectAction, EDITABLE_STATUSES};
use netcrm_db::models::project::{CreateProject, ProjectFilter, UpdateProject};
use netcrm_db::repositories::ProjectRepo;
use sqlx::PgPool;

fn new_project(name: &str, lead_id: i64, product_id: i64) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: format!("{name} description"),
        lead_id,
        product_id,
        estimated_value: Some("1500000.00".parse().unwrap()),
        ..Default::default()
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find_detail(pool: PgPool) {
    let sales = common::user(&pool, "Sam Sales", ROLE_SALES).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;

    let project = ProjectRepo::create(
        &pool,
        &new_project("Acme fiber", lead.id, product.id),
        ProjectStatus::Pending,
        sales.id,
    )
    .await
    .unwrap();
    assert_eq!(project.status, ProjectStatus::Pending);
    assert_eq!(project.created_by, sales.id);
    assert!(project.approved_at.is_none());

    let detail = ProjectRepo::find_detail(&pool, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.lead_name.as_deref(), Some("Acme"));
    assert_eq!(detail.product_name.as_deref(), Some("Fiber 100"));
    assert_eq!(detail.creator_name.as_deref(), Some("Sam Sales"));
    assert!(detail.manager_name.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_approval_cycle(pool: PgPool) {
    let sales = common::user(&pool, "Sam Sales", ROLE_SALES).await;
    let manager = common::user(&pool, "Mia Manager", ROLE_MANAGER).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let project = ProjectRepo::create(
        &pool,
        &new_project("Cycle", lead.id, product.id),
        ProjectStatus::Pending,
        sales.id,
    )
    .await
    .unwrap();

    let submitted = ProjectRepo::transition(&pool, project.id, ProjectAction::Submit, sales.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submitted.status, ProjectStatus::WaitingApproval);

    let rejected = ProjectRepo::transition(
        &pool,
        project.id,
        ProjectAction::Reject,
        manager.id,
        Some("Budget too high"),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(rejected.status, ProjectStatus::Rejected);
    assert_eq!(rejected.manager_id, Some(manager.id));
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Budget too high"));
    assert!(rejected.rejected_at.is_some());

    let resubmitted =
        ProjectRepo::transition(&pool, project.id, ProjectAction::Submit, sales.id, None)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(resubmitted.status, ProjectStatus::WaitingApproval);
    assert!(resubmitted.rejection_reason.is_none());
    assert!(resubmitted.rejected_at.is_none());

    let approved =
        ProjectRepo::transition(&pool, project.id, ProjectAction::Approve, manager.id, None)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(approved.status, ProjectStatus::Approved);
    assert!(approved.approved_at.is_some());

    let completed =
        ProjectRepo::transition(&pool, project.id, ProjectAction::Complete, manager.id, None)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(completed.status, ProjectStatus::Completed);
    assert!(completed.completed_at.is_some());
    assert_eq!(completed.approved_at, approved.approved_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_illegal_transition_matches_no_row(pool: PgPool) {
    let sales = common::user(&pool, "Sam Sales", ROLE_SALES).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let project = ProjectRepo::create(
        &pool,
        &new_project("Still pending", lead.id, product.id),
        ProjectStatus::Pending,
        sales.id,
    )
    .await
    .unwrap();

    let result = ProjectRepo::transition(&pool, project.id, ProjectAction::Approve, sales.id, None)
        .await
        .unwrap();
    assert!(result.is_none());

    let status = ProjectRepo::status_of(&pool, project.id).await.unwrap();
    assert_eq!(status, Some(ProjectStatus::Pending));
    let unchanged = ProjectRepo::find_by_id(&pool, project.id).await.unwrap().unwrap();
    assert!(unchanged.approved_at.is_none());
    assert!(unchanged.manager_id.is_none());

    assert_eq!(ProjectRepo::status_of(&pool, 999_999).await.unwrap(), None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_blocked_outside_editable_statuses(pool: PgPool) {
    let sales = common::user(&pool, "Sam Sales", ROLE_SALES).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let project = ProjectRepo::create(
        &pool,
        &new_project("Editable", lead.id, product.id),
        ProjectStatus::InProgress,
        sales.id,
    )
    .await
    .unwrap();

    let input = UpdateProject {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };
    let updated = ProjectRepo::update(&pool, project.id, &input, EDITABLE_STATUSES)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.status, ProjectStatus::InProgress);

    ProjectRepo::transition(&pool, project.id, ProjectAction::Submit, sales.id, None)
        .await
        .unwrap()
        .unwrap();
    let blocked = ProjectRepo::update(&pool, project.id, &input, EDITABLE_STATUSES)
        .await
        .unwrap();
    assert!(blocked.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_and_is_repeatable(pool: PgPool) {
    let sales = common::user(&pool, "Sam Sales", ROLE_SALES).await;
    let acme = common::lead(&pool, "Acme").await;
    let globex = common::lead(&pool, "Globex").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;

    for (name, lead_id) in [
        ("Acme tower", acme.id),
        ("Acme annex", acme.id),
        ("Globex HQ 100%", globex.id),
    ] {
        ProjectRepo::create(
            &pool,
            &new_project(name, lead_id, product.id),
            ProjectStatus::Pending,
            sales.id,
        )
        .await
        .unwrap();
    }

    let by_lead = ProjectFilter {
        lead_id: Some(acme.id),
        ..Default::default()
    };
    let (rows, total) = ProjectRepo::list(&pool, &by_lead, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert!(rows.iter().all(|p| p.project.lead_id == acme.id));

    let by_search = ProjectFilter {
        search: Some("100%".to_string()),
        ..Default::default()
    };
    let (rows, total) = ProjectRepo::list(&pool, &by_search, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].project.name, "Globex HQ 100%");

    let everything = ProjectFilter::default();
    let page = PageRequest::new(Some(1), Some(2));
    let (first, total) = ProjectRepo::list(&pool, &everything, page).await.unwrap();
    let (again, _) = ProjectRepo::list(&pool, &everything, page).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(first.len(), 2);
    let ids: Vec<_> = first.iter().map(|p| p.project.id).collect();
    let ids_again: Vec<_> = again.iter().map(|p| p.project.id).collect();
    assert_eq!(ids, ids_again);
    assert!(ids[0] > ids[1], "newest first");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_waiting_approval_queue_and_delete(pool: PgPool) {
    let sales = common::user(&pool, "Sam Sales", ROLE_SALES).await;
    let lead = common::lead(&pool, "Acme").await;
    let product = common::product(&pool, "Fiber 100", "350000").await;
    let project = ProjectRepo::create(
        &pool,
        &new_project("Queued", lead.id, product.id),
        ProjectStatus::Pending,
        sales.id,
    )
    .await
    .unwrap();
    ProjectRepo::transition(&pool, project.id, ProjectAction::Submit, sales.id, None)
        .await
        .unwrap();

    let (queue, total) = ProjectRepo::list_waiting_approval(&pool, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(queue[0].project.id, project.id);

    assert!(ProjectRepo::delete(&pool, project.id).await.unwrap());
    assert!(!ProjectRepo::delete(&pool, project.id).await.unwrap());
    assert!(ProjectRepo::find_by_id(&pool, project.id).await.unwrap().is_none());
}
