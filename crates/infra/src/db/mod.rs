use sqlx::PgPool;

pub type Db = PgPool;

pub async fn ping(pool: &Db) -> Result<(), sqlx::Error> {
    let _: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// True when `err` is a storage-level unique constraint violation, used to
/// turn duplicate emails, applications, entries and tournament names into
/// validation outcomes instead of opaque database errors.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation),
        _ => false,
    }
}