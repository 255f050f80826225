use std::time::{Duration, Instant};

use crate::cricket::error::{RosterError, RosterResult, Slot};
use crate::cricket::player::{Player, PlayerKey};
use crate::cricket::roster::SwapSelection;

/// One pick from either of the two swap menus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPick {
    Xi(usize),
    Sub(usize),
}

/// Result of feeding a pick into a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// Not from the owner, dropped without a reply
    Ignored,
    /// Stored, still waiting for the other menu
    Pending,
    /// Both sides known, the session is finished
    Ready(SwapSelection),
}

/// Pending state of a single swap interaction.
///
/// Holds a snapshot of the XI and bench taken when the menus were built, so
/// the final selection carries the identity of the players that were shown.
#[derive(Debug, Clone)]
pub struct SwapSession {
    owner: u64,
    number: u32,
    xi: Vec<PlayerKey>,
    subs: Vec<PlayerKey>,
    xi_pick: Option<usize>,
    sub_pick: Option<usize>,
    deadline: Instant,
    complete: bool,
}

impl SwapSession {
    pub fn new(
        owner: u64,
        number: u32,
        xi: &[Player],
        subs: &[Player],
        started: Instant,
        timeout: Duration,
    ) -> Self {
        SwapSession {
            owner,
            number,
            xi: xi.iter().map(Player::key).collect(),
            subs: subs.iter().map(Player::key).collect(),
            xi_pick: None,
            sub_pick: None,
            deadline: started + timeout,
            complete: false,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Record a pick. A later pick from the same menu replaces the earlier one.
    pub fn select(&mut self, actor: u64, pick: SwapPick) -> RosterResult<SessionUpdate> {
        if actor != self.owner || self.complete {
            return Ok(SessionUpdate::Ignored);
        }

        match pick {
            SwapPick::Xi(index) => {
                check_range(Slot::Xi, index, self.xi.len())?;
                self.xi_pick = Some(index);
            }
            SwapPick::Sub(index) => {
                check_range(Slot::Sub, index, self.subs.len())?;
                self.sub_pick = Some(index);
            }
        }

        match (self.xi_pick, self.sub_pick) {
            (Some(xi_index), Some(sub_index)) => {
                self.complete = true;
                Ok(SessionUpdate::Ready(SwapSelection {
                    xi_index,
                    xi_key: self.xi[xi_index].clone(),
                    sub_index,
                    sub_key: self.subs[sub_index].clone(),
                }))
            }
            _ => Ok(SessionUpdate::Pending),
        }
    }
}

fn check_range(slot: Slot, index: usize, len: usize) -> RosterResult<()> {
    if index >= len {
        return Err(RosterError::IndexOutOfRange { slot, index, len });
    }
    Ok(())
}
