use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::db::models::{
    Avatar, Developer, DeveloperProfile, Geekout, Language, NewDeveloper, RelationshipStatus,
    User, UserSession,
};
use crate::error::AppError;

const DEVELOPER_COLUMNS: &str =
    "id, user_id, name, email, cohort, avatar_id, created_at, updated_at";

#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| {
                AppError::DatabaseError(crate::error::DatabaseError::ConnectionError(e.to_string()))
            })?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>, AppError> {
        Ok(self.pool.as_ref().begin().await?)
    }

    // --- users & sessions ---

    pub async fn create_user(&self, user: &User) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, created_at, updated_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, created_at, updated_at, last_login, is_active
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.is_active)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at, last_login, is_active FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at, updated_at, last_login, is_active FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    pub async fn record_login(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    pub async fn create_session(&self, session: &UserSession) -> Result<UserSession, AppError> {
        let session = sqlx::query_as::<_, UserSession>(
            r#"
            INSERT INTO user_sessions (id, user_id, token, expires_at, created_at, last_activity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, token, expires_at, created_at, last_activity
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.token)
        .bind(session.expires_at)
        .bind(session.created_at)
        .bind(session.last_activity)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    pub async fn get_session_by_token(&self, token: &str) -> Result<Option<UserSession>, AppError> {
        let session = sqlx::query_as::<_, UserSession>(
            "SELECT id, user_id, token, expires_at, created_at, last_activity FROM user_sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    pub async fn update_session_activity(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE user_sessions SET last_activity = $1 WHERE token = $2")
            .bind(Utc::now())
            .bind(token)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_sessions WHERE token = $1")
            .bind(token)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let mut transaction = self.begin_transaction().await?;

        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&mut *transaction)
            .await;

        match result {
            Ok(result) => {
                transaction.commit().await?;
                Ok(result.rows_affected())
            }
            Err(e) => {
                transaction.rollback().await?;
                Err(e.into())
            }
        }
    }

    // --- developers ---

    pub async fn create_developer(
        &self,
        user_id: Uuid,
        new_developer: &NewDeveloper,
    ) -> Result<Developer, AppError> {
        let developer = sqlx::query_as::<_, Developer>(&format!(
            r#"
            INSERT INTO developers (user_id, name, email, cohort)
            VALUES ($1, $2, $3, $4)
            RETURNING {DEVELOPER_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&new_developer.name)
        .bind(&new_developer.email)
        .bind(new_developer.cohort)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(developer)
    }

    pub async fn get_developer(&self, id: i64) -> Result<Option<Developer>, AppError> {
        let developer = sqlx::query_as::<_, Developer>(&format!(
            "SELECT {DEVELOPER_COLUMNS} FROM developers WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(developer)
    }

    pub async fn get_developer_by_user(&self, user_id: Uuid) -> Result<Option<Developer>, AppError> {
        let developer = sqlx::query_as::<_, Developer>(&format!(
            "SELECT {DEVELOPER_COLUMNS} FROM developers WHERE user_id = $1",
        ))
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(developer)
    }

    /// A NULL limit means no limit.
    pub async fn list_developers(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Developer>, AppError> {
        let developers = sqlx::query_as::<_, Developer>(&format!(
            "SELECT {DEVELOPER_COLUMNS} FROM developers ORDER BY id LIMIT $1 OFFSET $2",
        ))
        .bind(limit)
        .bind(offset.unwrap_or(0))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(developers)
    }

    pub async fn list_developers_by_language(
        &self,
        language_id: i64,
    ) -> Result<Vec<Developer>, AppError> {
        let developers = sqlx::query_as::<_, Developer>(&format!(
            r#"
            SELECT d.{}
            FROM developers d
            JOIN developer_languages dl ON dl.developer_id = d.id
            WHERE dl.language_id = $1
            ORDER BY d.id
            "#,
            DEVELOPER_COLUMNS.replace(", ", ", d."),
        ))
        .bind(language_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(developers)
    }

    /// Ordered by name ascending, byte-wise (`COLLATE "C"`), so the result is
    /// case-sensitive and independent of the database locale.
    pub async fn list_developers_by_cohort(&self, cohort: i32) -> Result<Vec<Developer>, AppError> {
        let developers = sqlx::query_as::<_, Developer>(&format!(
            r#"SELECT {DEVELOPER_COLUMNS} FROM developers WHERE cohort = $1 ORDER BY name COLLATE "C" ASC"#,
        ))
        .bind(cohort)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(developers)
    }

    pub async fn save_developer(&self, developer: &Developer) -> Result<Developer, AppError> {
        let developer = sqlx::query_as::<_, Developer>(&format!(
            r#"
            UPDATE developers
            SET name = $2, email = $3, cohort = $4, updated_at = $5
            WHERE id = $1
            RETURNING {DEVELOPER_COLUMNS}
            "#,
        ))
        .bind(developer.id)
        .bind(&developer.name)
        .bind(&developer.email)
        .bind(developer.cohort)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(developer)
    }

    pub async fn delete_developer(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM developers WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_developer_by_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM developers WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    // --- avatar ---

    /// Create-or-update the developer's avatar and link it, in one
    /// transaction. A failure after the avatar write rolls everything back
    /// rather than leaving an orphaned avatar row.
    pub async fn set_developer_photo(
        &self,
        developer: &Developer,
        url: &str,
    ) -> Result<Developer, AppError> {
        let mut transaction = self.begin_transaction().await?;

        let result = self
            .set_photo_with_transaction(developer, url, &mut transaction)
            .await;

        match result {
            Ok(developer) => {
                transaction.commit().await?;
                Ok(developer)
            }
            Err(e) => {
                transaction.rollback().await?;
                Err(e)
            }
        }
    }

    async fn set_photo_with_transaction(
        &self,
        developer: &Developer,
        url: &str,
        transaction: &mut Transaction<'_, Postgres>,
    ) -> Result<Developer, AppError> {
        if let Some(avatar_id) = developer.avatar_id {
            // Update the existing avatar in place, never duplicate it.
            sqlx::query("UPDATE avatars SET url = $1 WHERE id = $2")
                .bind(url)
                .bind(avatar_id)
                .execute(&mut **transaction)
                .await?;

            return Ok(developer.clone());
        }

        let avatar = sqlx::query_as::<_, Avatar>(
            "INSERT INTO avatars (url) VALUES ($1) RETURNING id, url",
        )
        .bind(url)
        .fetch_one(&mut **transaction)
        .await?;

        let developer = sqlx::query_as::<_, Developer>(&format!(
            r#"
            UPDATE developers
            SET avatar_id = $2, updated_at = $3
            WHERE id = $1
            RETURNING {DEVELOPER_COLUMNS}
            "#,
        ))
        .bind(developer.id)
        .bind(avatar.id)
        .bind(Utc::now())
        .fetch_one(&mut **transaction)
        .await?;

        Ok(developer)
    }

    pub async fn get_avatar(&self, id: i64) -> Result<Option<Avatar>, AppError> {
        let avatar = sqlx::query_as::<_, Avatar>("SELECT id, url FROM avatars WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(avatar)
    }

    // --- languages ---

    /// Links languages to the developer with set semantics: re-adding an
    /// already-linked language is a no-op. An unknown language id surfaces as
    /// a foreign key violation.
    pub async fn add_developer_languages(
        &self,
        developer_id: i64,
        language_ids: &[i64],
    ) -> Result<(), AppError> {
        for language_id in language_ids {
            sqlx::query(
                r#"
                INSERT INTO developer_languages (developer_id, language_id)
                VALUES ($1, $2)
                ON CONFLICT (developer_id, language_id) DO NOTHING
                "#,
            )
            .bind(developer_id)
            .bind(language_id)
            .execute(self.pool.as_ref())
            .await?;
        }

        Ok(())
    }

    pub async fn languages_for_developer(
        &self,
        developer_id: i64,
    ) -> Result<Vec<Language>, AppError> {
        let languages = sqlx::query_as::<_, Language>(
            r#"
            SELECT l.id, l.name
            FROM languages l
            JOIN developer_languages dl ON dl.language_id = l.id
            WHERE dl.developer_id = $1
            ORDER BY l.id
            "#,
        )
        .bind(developer_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(languages)
    }

    // --- geekouts ---

    pub async fn list_geekouts_approved_by(
        &self,
        developer_id: i64,
    ) -> Result<Vec<Geekout>, AppError> {
        let geekouts = sqlx::query_as::<_, Geekout>(
            r#"
            SELECT g.id, g.developer_id, g.title, g.content, g.created_at
            FROM geekouts g
            JOIN geekout_approvals ga ON ga.geekout_id = g.id
            WHERE ga.developer_id = $1
            ORDER BY g.id
            "#,
        )
        .bind(developer_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(geekouts)
    }

    // --- relationships ---

    /// Friendship is symmetric: an accepted relationship in either direction.
    pub async fn are_friends(&self, a: i64, b: i64) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM relationships
                WHERE status = $3
                  AND ((originator_id = $1 AND recipient_id = $2)
                    OR (originator_id = $2 AND recipient_id = $1))
            )
            "#,
        )
        .bind(a)
        .bind(b)
        .bind(RelationshipStatus::Accepted)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    // --- profile assembly ---

    pub async fn load_profile(&self, developer: Developer) -> Result<DeveloperProfile, AppError> {
        let avatar = match developer.avatar_id {
            Some(avatar_id) => self.get_avatar(avatar_id).await?,
            None => None,
        };
        let languages = self.languages_for_developer(developer.id).await?;

        Ok(DeveloperProfile::assemble(developer, avatar, languages))
    }

    pub async fn load_profiles(
        &self,
        developers: Vec<Developer>,
    ) -> Result<Vec<DeveloperProfile>, AppError> {
        let mut profiles = Vec::with_capacity(developers.len());
        for developer in developers {
            profiles.push(self.load_profile(developer).await?);
        }

        Ok(profiles)
    }
}
