use quiz_core::model::{CategoryPoints, SetId, UserProfile};
use sqlx::{Row, SqliteConnection};

use super::SqliteRepository;
use super::mapping::{conn, i64_to_u64, map_report_row, parse_login, ser, u64_to_i64};
use crate::repository::{ProfileRepository, RewardPersistence, StorageError};

/// Replaces the stored profile snapshot. Runs on the caller's transaction.
async fn write_profile(
    db: &mut SqliteConnection,
    profile: &UserProfile,
) -> Result<(), StorageError> {
    sqlx::query(
        r"
        INSERT INTO profile (id, xp, currency, streak)
        VALUES (1, ?1, ?2, ?3)
        ON CONFLICT(id) DO UPDATE SET
            xp = excluded.xp,
            currency = excluded.currency,
            streak = excluded.streak
        ",
    )
    .bind(u64_to_i64("xp", profile.xp())?)
    .bind(u64_to_i64("currency", profile.currency())?)
    .bind(i64::from(profile.streak()))
    .execute(&mut *db)
    .await
    .map_err(conn)?;

    sqlx::query("DELETE FROM completed_sets")
        .execute(&mut *db)
        .await
        .map_err(conn)?;
    for set_id in profile.completed_set_ids() {
        sqlx::query("INSERT INTO completed_sets (set_id) VALUES (?1)")
            .bind(u64_to_i64("set_id", set_id.value())?)
            .execute(&mut *db)
            .await
            .map_err(conn)?;
    }

    sqlx::query("DELETE FROM logins")
        .execute(&mut *db)
        .await
        .map_err(conn)?;
    for at in profile.login_timestamps() {
        sqlx::query("INSERT INTO logins (logged_at) VALUES (?1)")
            .bind(at.to_rfc3339())
            .execute(&mut *db)
            .await
            .map_err(conn)?;
    }

    sqlx::query("DELETE FROM score_reports")
        .execute(&mut *db)
        .await
        .map_err(conn)?;
    for report in profile.history() {
        sqlx::query(
            r"
            INSERT INTO score_reports (set_id, category_id, raw_score, total_questions, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(u64_to_i64("set_id", report.set_id().value())?)
        .bind(u64_to_i64("category_id", report.category_id().value())?)
        .bind(i64::from(report.raw_score()))
        .bind(i64::from(report.total_questions()))
        .bind(report.completed_at())
        .execute(&mut *db)
        .await
        .map_err(conn)?;
    }

    Ok(())
}

/// Reads the stored profile snapshot. Runs on the caller's transaction so all
/// four tables come from one consistent view.
async fn read_profile(db: &mut SqliteConnection) -> Result<UserProfile, StorageError> {
    let Some(row) = sqlx::query("SELECT xp, currency, streak FROM profile WHERE id = 1")
        .fetch_optional(&mut *db)
        .await
        .map_err(conn)?
    else {
        return Ok(UserProfile::new());
    };

    let xp = i64_to_u64("xp", row.try_get("xp").map_err(ser)?)?;
    let currency = i64_to_u64("currency", row.try_get("currency").map_err(ser)?)?;
    let streak_raw: i64 = row.try_get("streak").map_err(ser)?;
    let streak = u32::try_from(streak_raw)
        .map_err(|_| StorageError::Serialization(format!("invalid streak: {streak_raw}")))?;

    let completed = sqlx::query("SELECT set_id FROM completed_sets")
        .fetch_all(&mut *db)
        .await
        .map_err(conn)?
        .iter()
        .map(|r| {
            let raw: i64 = r.try_get("set_id").map_err(ser)?;
            Ok(SetId::new(i64_to_u64("set_id", raw)?))
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

    let logins = sqlx::query("SELECT logged_at FROM logins ORDER BY id ASC")
        .fetch_all(&mut *db)
        .await
        .map_err(conn)?
        .iter()
        .map(|r| {
            let raw: String = r.try_get("logged_at").map_err(ser)?;
            parse_login(&raw)
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

    let history = sqlx::query(
        r"
        SELECT set_id, category_id, raw_score, total_questions, completed_at
        FROM score_reports
        ORDER BY id ASC
        ",
    )
    .fetch_all(&mut *db)
    .await
    .map_err(conn)?
    .iter()
    .map(map_report_row)
    .collect::<Result<Vec<_>, StorageError>>()?;

    Ok(UserProfile::from_persisted(
        xp, currency, completed, logins, streak, history,
    ))
}

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn load_profile(&self) -> Result<UserProfile, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let profile = read_profile(&mut *tx).await?;
        tx.commit().await.map_err(conn)?;
        Ok(profile)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        write_profile(&mut *tx, profile).await?;
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RewardPersistence for SqliteRepository {
    async fn persist_reward(
        &self,
        profile: &UserProfile,
        points: CategoryPoints,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query("UPDATE categories SET points = ?1 WHERE id = ?2")
            .bind(u64_to_i64("points", points.points())?)
            .bind(u64_to_i64("category_id", points.category_id().value())?)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        if res.rows_affected() == 0 {
            // dropping `tx` rolls back
            return Err(StorageError::NotFound);
        }

        write_profile(&mut *tx, profile).await?;
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CategoryId, ScoreReport};
    use quiz_core::time::{fixed_clock, fixed_now};

    async fn open(name: &str) -> SqliteRepository {
        let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
            .await
            .unwrap();
        repo.migrate().await.unwrap();
        repo
    }

    fn snapshot() -> UserProfile {
        let report =
            ScoreReport::from_persisted(SetId::new(4), CategoryId::new(1), 2, 3, fixed_now())
                .unwrap();
        UserProfile::from_persisted(
            12,
            20,
            [SetId::new(4)],
            [fixed_clock().now_local()],
            1,
            [report],
        )
    }

    #[tokio::test]
    async fn profile_reads_share_the_callers_transaction() {
        let repo = open("memdb_profile_tx").await;
        let profile = snapshot();

        let mut tx = repo.pool().begin().await.unwrap();
        write_profile(&mut *tx, &profile).await.unwrap();
        assert_eq!(read_profile(&mut *tx).await.unwrap(), profile);
        tx.rollback().await.unwrap();

        assert_eq!(repo.load_profile().await.unwrap(), UserProfile::new());

        repo.save_profile(&profile).await.unwrap();
        assert_eq!(repo.load_profile().await.unwrap(), profile);
    }
}
