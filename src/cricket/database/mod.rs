use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::cricket::error::{RosterError, RosterResult};
use crate::cricket::player::Player;
use crate::Error;

/// A user's stored profile: one document per Discord user
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    pub team_name: Option<String>,
    pub players: Vec<Player>,
}

/// Connect to the profile store and bring the schema up to date
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("profile store ready at {}", database_url);

    Ok(pool)
}

pub async fn find_user(pool: &SqlitePool, user_id: &str) -> RosterResult<Option<UserProfile>> {
    let row = sqlx::query_as::<_, (String, Option<String>, String)>(
        r#"
        SELECT user_id, team_name, players
        FROM users
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((user_id, team_name, players)) => {
            let players: Vec<Player> = serde_json::from_str(&players)?;
            Ok(Some(UserProfile {
                user_id,
                team_name,
                players,
            }))
        }
        None => Ok(None),
    }
}

/// Overwrite the stored roster for a user
pub async fn save_players(pool: &SqlitePool, user_id: &str, players: &[Player]) -> RosterResult<()> {
    let document = serde_json::to_string(players)?;

    let result = sqlx::query(
        r#"
        UPDATE users
        SET players = $1
        WHERE user_id = $2
        "#,
    )
    .bind(document)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RosterError::UserNotFound(user_id.to_string()));
    }

    Ok(())
}

/// Create a profile the way the debut flow does
#[cfg(test)]
pub(crate) async fn insert_user(pool: &SqlitePool, profile: &UserProfile) -> RosterResult<()> {
    let document = serde_json::to_string(&profile.players)?;

    sqlx::query(
        r#"
        INSERT INTO users (user_id, team_name, players)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(&profile.user_id)
    .bind(&profile.team_name)
    .bind(document)
    .execute(pool)
    .await?;

    Ok(())
}

/// Single-connection in-memory store; every connection to `sqlite::memory:`
/// would otherwise get its own database
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}
