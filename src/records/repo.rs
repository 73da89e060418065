use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

const RECORD_COLUMNS: &str = "id, dosage, time, day, month, year, owner, created_at";

/// One recorded water intake, tagged with its day/month/year and owner.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Record {
    pub id: Uuid,
    pub dosage: i32,
    pub time: String,
    pub day: i32,
    pub month: String,
    pub year: i32,
    #[serde(skip_serializing)]
    pub owner: Uuid,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
}

/// All records of one owner for a month, in insertion order. Year narrows
/// the selection when given.
pub async fn list_by_month(
    db: &PgPool,
    owner: Uuid,
    month: &str,
    year: Option<i32>,
) -> anyhow::Result<Vec<Record>> {
    let rows = sqlx::query_as::<_, Record>(&format!(
        "SELECT {RECORD_COLUMNS}
           FROM records
          WHERE owner = $1 AND month = $2 AND ($3::int IS NULL OR year = $3)
          ORDER BY created_at ASC"
    ))
    .bind(owner)
    .bind(month)
    .bind(year)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_by_day(
    db: &PgPool,
    owner: Uuid,
    day: i32,
    month: &str,
    year: i32,
) -> anyhow::Result<Vec<Record>> {
    let rows = sqlx::query_as::<_, Record>(&format!(
        "SELECT {RECORD_COLUMNS}
           FROM records
          WHERE owner = $1 AND day = $2 AND month = $3 AND year = $4"
    ))
    .bind(owner)
    .bind(day)
    .bind(month)
    .bind(year)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Owner-scoped lookup; an id under a different owner is indistinguishable
/// from a missing one.
pub async fn find_by_id(db: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Record>> {
    let row = sqlx::query_as::<_, Record>(&format!(
        "SELECT {RECORD_COLUMNS} FROM records WHERE id = $1 AND owner = $2"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub struct NewRecord<'a> {
    pub dosage: i32,
    pub time: &'a str,
    pub day: i32,
    pub month: &'a str,
    pub year: i32,
}

pub async fn create(db: &PgPool, owner: Uuid, new: NewRecord<'_>) -> anyhow::Result<Record> {
    let row = sqlx::query_as::<_, Record>(&format!(
        "INSERT INTO records (dosage, time, day, month, year, owner)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(new.dosage)
    .bind(new.time)
    .bind(new.day)
    .bind(new.month)
    .bind(new.year)
    .bind(owner)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    owner: Uuid,
    id: Uuid,
    dosage: i32,
    time: &str,
) -> anyhow::Result<Option<Record>> {
    let row = sqlx::query_as::<_, Record>(&format!(
        "UPDATE records SET dosage = $3, time = $4
          WHERE id = $1 AND owner = $2
      RETURNING {RECORD_COLUMNS}"
    ))
    .bind(id)
    .bind(owner)
    .bind(dosage)
    .bind(time)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Returns whether a row was actually deleted.
pub async fn delete(db: &PgPool, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM records WHERE id = $1 AND owner = $2")
        .bind(id)
        .bind(owner)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
