use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    netcrm_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "leads",
        "products",
        "projects",
        "customers",
        "customer_services",
        "notifications",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// The code columns carry the named unique constraints allocation relies on.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_code_constraints_exist(pool: PgPool) {
    for name in ["uq_customers_code", "uq_customer_services_number", "uq_users_email"] {
        let found: Option<String> =
            sqlx::query_scalar("SELECT conname::text FROM pg_constraint WHERE conname = $1")
                .bind(name)
                .fetch_optional(&pool)
                .await
                .unwrap();
        assert_eq!(found.as_deref(), Some(name));
    }
}

/// Unknown roles are refused by the named role check.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_users_role_check_is_named(pool: PgPool) {
    let err = sqlx::query(
        "INSERT INTO users (name, email, password_hash, role) VALUES ('Eve', 'eve@example.com', 'x', 'root')",
    )
    .execute(&pool)
    .await
    .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("chk_users_role"));

    for &role in netcrm_core::roles::VALID_ROLES {
        sqlx::query("INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, 'x', $1)")
            .bind(role)
            .bind(format!("{role}@example.com"))
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("{role} should be accepted: {e}"));
    }
}
