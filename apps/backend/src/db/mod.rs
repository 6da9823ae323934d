//! PostgreSQL database operations

use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new user with generated token and default settings
    pub async fn create_user(&self, name: Option<&str>) -> Result<User> {
        let token = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (token, name)
            VALUES ($1, $2)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(&token)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id)
            VALUES ($1)
            "#,
        )
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Get user by token
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user last_seen_at timestamp
    pub async fn update_last_seen(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Settings Repository ===

    /// Get study settings, falling back to defaults
    pub async fn get_settings(&self, user_id: Uuid) -> Result<DbUserSettings> {
        let settings = sqlx::query_as::<_, DbUserSettings>(
            r#"
            SELECT user_id, smart_grading, updated_at
            FROM user_settings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings.unwrap_or_else(|| DbUserSettings::default_for_user(user_id)))
    }

    /// Upsert study settings
    pub async fn upsert_settings(&self, settings: &DbUserSettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, smart_grading, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                smart_grading = EXCLUDED.smart_grading,
                updated_at = NOW()
            "#,
        )
        .bind(settings.user_id)
        .bind(settings.smart_grading)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Deck Repository ===

    /// Create a deck with its cards in one transaction
    pub async fn create_deck(&self, owner_id: Uuid, name: &str, cards: &[Card]) -> Result<DbDeck> {
        let mut tx = self.pool.begin().await?;

        let deck = sqlx::query_as::<_, DbDeck>(
            r#"
            INSERT INTO decks (owner_id, name)
            VALUES ($1, $2)
            RETURNING id, owner_id, name, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        for (position, card) in cards.iter().enumerate() {
            let row = DbCard::from_core_card(deck.id, position as i32, card);
            sqlx::query(
                r#"
                INSERT INTO cards (deck_id, id, position, term, definition, hint, card_type, options)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(row.deck_id)
            .bind(row.id)
            .bind(row.position)
            .bind(&row.term)
            .bind(&row.definition)
            .bind(&row.hint)
            .bind(&row.card_type)
            .bind(&row.options)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deck)
    }

    /// Get deck row by ID
    pub async fn get_deck(&self, deck_id: Uuid) -> Result<Option<DbDeck>> {
        let deck = sqlx::query_as::<_, DbDeck>(
            r#"
            SELECT id, owner_id, name, created_at, updated_at
            FROM decks
            WHERE id = $1
            "#,
        )
        .bind(deck_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Get the cards of a deck in authored order
    pub async fn get_cards(&self, deck_id: Uuid) -> Result<Vec<DbCard>> {
        let cards = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT deck_id, id, position, term, definition, hint, card_type, options
            FROM cards
            WHERE deck_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// Get a deck with its cards as the core type
    pub async fn get_core_deck(&self, deck_id: Uuid) -> Result<Option<Deck>> {
        let Some(deck) = self.get_deck(deck_id).await? else {
            return Ok(None);
        };
        let cards = self.get_cards(deck_id).await?;
        Ok(Some(deck.into_core_deck(cards)))
    }

    /// List decks owned by a user
    pub async fn list_decks(&self, owner_id: Uuid) -> Result<Vec<DeckInfo>> {
        let decks = sqlx::query_as::<_, DeckInfo>(
            r#"
            SELECT d.id, d.name, COUNT(c.id) AS card_count, d.created_at
            FROM decks d
            LEFT JOIN cards c ON c.deck_id = d.id
            WHERE d.owner_id = $1
            GROUP BY d.id
            ORDER BY d.created_at, d.name
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(decks)
    }

    /// Delete a deck; cards and every user's progress cascade
    pub async fn delete_deck(&self, deck_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM decks WHERE id = $1")
            .bind(deck_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Progress Repository ===

    /// Load a user's progress for a deck; empty when nothing is stored
    pub async fn load_deck_progress(&self, user_id: Uuid, deck_id: Uuid) -> Result<DeckProgress> {
        let progress = sqlx::query_scalar::<_, Json<DeckProgress>>(
            r#"
            SELECT progress
            FROM deck_progress
            WHERE user_id = $1 AND deck_id = $2
            "#,
        )
        .bind(user_id)
        .bind(deck_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progress.map(|p| p.0).unwrap_or_default())
    }

    /// Overwrite a user's progress for a deck (last writer wins)
    pub async fn save_deck_progress(
        &self,
        user_id: Uuid,
        deck_id: Uuid,
        progress: &DeckProgress,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO deck_progress (user_id, deck_id, progress, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, deck_id) DO UPDATE SET
                progress = EXCLUDED.progress,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(deck_id)
        .bind(Json(progress))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
