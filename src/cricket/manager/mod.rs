//! Roster operations that read from or write to the profile store.
//!
//! Every mutation is built on a copy, saved, and only then handed back, so a
//! failed write never shows up as a confirmed change.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::cricket::database::{self, UserProfile};
use crate::cricket::error::{RosterError, RosterResult};
use crate::cricket::player::Player;
use crate::cricket::roster::{Roster, SwapSelection};

/// Names of the two players exchanged by a swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub outgoing: String,
    pub incoming: String,
}

/// Only the roster owner may press the view's buttons
pub fn authorize(owner: u64, actor: u64) -> RosterResult<()> {
    if owner != actor {
        return Err(RosterError::UnauthorizedActor);
    }
    Ok(())
}

/// Fetch a profile that is ready for the XI command
pub async fn load_roster(pool: &SqlitePool, user_id: &str) -> RosterResult<UserProfile> {
    let profile = database::find_user(pool, user_id)
        .await?
        .ok_or_else(|| RosterError::UserNotFound(user_id.to_string()))?;

    if profile.players.is_empty() {
        return Err(RosterError::EmptyRoster(user_id.to_string()));
    }

    debug!("loaded {} players for {}", profile.players.len(), user_id);
    Ok(profile)
}

/// Put the eleven highest rated players into the XI and persist the result.
///
/// Works on the stored roster, not the snapshot the view was rendered from,
/// so players added or removed since then are kept as they are in the store.
/// Returns the refreshed profile alongside the new XI.
pub async fn autobuild(
    pool: &SqlitePool,
    user_id: &str,
) -> RosterResult<(UserProfile, Vec<Player>)> {
    let mut profile = load_roster(pool, user_id).await?;

    let rebuilt = Roster::new(profile.players.clone()).autobuilt();
    database::save_players(pool, user_id, rebuilt.players()).await?;

    let xi = rebuilt.xi().to_vec();
    profile.players = rebuilt.into_players();
    info!("autobuild saved for {}", user_id);

    Ok((profile, xi))
}

/// Apply a swap against the stored roster, not the snapshot the menus were
/// built from. Returns the refreshed profile alongside the swapped names.
pub async fn swap(
    pool: &SqlitePool,
    user_id: &str,
    selection: &SwapSelection,
) -> RosterResult<(UserProfile, SwapOutcome)> {
    let mut profile = load_roster(pool, user_id).await?;

    let mut roster = Roster::new(profile.players.clone());
    let (outgoing, incoming) = roster.swap_verified(selection)?;
    database::save_players(pool, user_id, roster.players()).await?;

    profile.players = roster.into_players();
    info!(
        "swapped {} out for {} in {}'s XI",
        outgoing.name, incoming.name, user_id
    );

    Ok((
        profile,
        SwapOutcome {
            outgoing: outgoing.display_name().to_string(),
            incoming: incoming.display_name().to_string(),
        },
    ))
}
