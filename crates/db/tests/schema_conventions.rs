use sqlx::PgPool;

/// Every `id` column is bigint.
#[sqlx::test(migrations = "./migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Every table carries created_at and updated_at as timestamptz.
#[sqlx::test(migrations = "./migrations")]
async fn test_all_tables_have_timestamps(pool: PgPool) {
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name
         FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (table,) in &tables {
        for col in ["created_at", "updated_at"] {
            let result: Option<(String,)> = sqlx::query_as(
                "SELECT data_type
                 FROM information_schema.columns
                 WHERE table_schema = 'public'
                   AND table_name = $1
                   AND column_name = $2",
            )
            .bind(table)
            .bind(col)
            .fetch_optional(&pool)
            .await
            .unwrap();

            let (data_type,) =
                result.unwrap_or_else(|| panic!("Table {table} is missing column {col}"));
            assert_eq!(
                data_type, "timestamp with time zone",
                "Table {table}.{col} should be timestamptz, got {data_type}"
            );
        }
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_no_varchar_columns(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, column_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND data_type = 'character varying'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "Found varchar columns: {rows:?}");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_catalogs_are_seeded(pool: PgPool) {
    mesa_db::health_check(&pool).await.unwrap();

    let modules = mesa_db::repositories::CatalogRepo::list_modules(&pool).await.unwrap();
    let types = mesa_db::repositories::CatalogRepo::list_ticket_types(&pool)
        .await
        .unwrap();
    assert_eq!(modules.len(), 3);
    assert_eq!(types.len(), 5);
    assert_eq!(modules[0].label, "HIS - Asistencial");
}

/// The allow-list only accepts lower-case addresses.
#[sqlx::test(migrations = "./migrations")]
async fn test_authorized_email_must_be_lowercase(pool: PgPool) {
    let result = sqlx::query("INSERT INTO authorized_emails (email, allowed_role) VALUES ($1, 'user')")
        .bind("Mixed@Case.org")
        .execute(&pool)
        .await;
    assert!(result.is_err());
}
