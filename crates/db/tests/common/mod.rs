//! Fixtures shared by the db integration tests.

#![allow(dead_code)]

use netcrm_core::status::{BillingCycle, LeadStatus, ProductType};
use netcrm_db::models::lead::{CreateLead, Lead};
use netcrm_db::models::product::{CreateProduct, Product};
use netcrm_db::models::user::{CreateUser, User};
use netcrm_db::repositories::{LeadRepo, ProductRepo, UserRepo};
use sqlx::PgPool;

pub async fn user(pool: &PgPool, name: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn lead(pool: &PgPool, name: &str) -> Lead {
    let input = CreateLead {
        name: name.to_string(),
        email: Some(format!("{}@lead.test", name.to_lowercase().replace(' ', "-"))),
        company: Some(format!("{name} Ltd")),
        ..Default::default()
    };
    LeadRepo::create(pool, &input, LeadStatus::New).await.unwrap()
}

pub async fn product(pool: &PgPool, name: &str, price: &str) -> Product {
    let input = CreateProduct {
        name: name.to_string(),
        product_type: "internet".to_string(),
        price: Some(price.parse().unwrap()),
        speed_mbps: Some(50),
        ..Default::default()
    };
    ProductRepo::create(pool, &input, ProductType::Internet, BillingCycle::Monthly)
        .await
        .unwrap()
}
