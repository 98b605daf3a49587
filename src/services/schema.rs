use sqlx::PgPool;

/// 启动时建表语句，全部幂等
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )"#,
    // 唯一性只在未软删除的用户之间成立
    r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username_active
        ON users (username) WHERE deleted_at IS NULL"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_active
        ON users (LOWER(email)) WHERE deleted_at IS NULL"#,
    r#"CREATE TABLE IF NOT EXISTS reminders (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(30) NOT NULL,
        description VARCHAR(100) NOT NULL,
        remind_at TIMESTAMPTZ NOT NULL,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )"#,
    r#"CREATE INDEX IF NOT EXISTS idx_reminders_owner_remind_at
        ON reminders (user_id, remind_at) WHERE deleted_at IS NULL"#,
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("数据库表结构检查完成");
    Ok(())
}
