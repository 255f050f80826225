use crate::cricket::error::{RosterError, RosterResult, Slot};
use crate::cricket::player::{Player, PlayerKey, Role};

/// Number of players in a starting XI
pub const XI_SIZE: usize = 11;

/// A user's ordered squad. The first `XI_SIZE` entries are the playing XI,
/// everything after them sits on the bench.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Roster {
    players: Vec<Player>,
}

/// A validated swap request: positions plus the players expected there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSelection {
    pub xi_index: usize,
    pub xi_key: PlayerKey,
    pub sub_index: usize,
    pub sub_key: PlayerKey,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Self {
        Roster { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn into_players(self) -> Vec<Player> {
        self.players
    }

    /// Split into (XI, substitutes) without touching the order
    pub fn partition(&self) -> (&[Player], &[Player]) {
        let split = self.players.len().min(XI_SIZE);
        self.players.split_at(split)
    }

    pub fn xi(&self) -> &[Player] {
        self.partition().0
    }

    pub fn subs(&self) -> &[Player] {
        self.partition().1
    }

    /// Rebuild the roster with the highest rated players in the XI.
    ///
    /// The sort is stable, so equal ratings keep their current order. Players
    /// that miss the cut keep their original relative order on the bench.
    pub fn autobuilt(&self) -> Roster {
        let mut ranked: Vec<usize> = (0..self.players.len()).collect();
        ranked.sort_by(|&a, &b| self.players[b].rating().cmp(&self.players[a].rating()));

        let mut in_xi = vec![false; self.players.len()];
        for &idx in ranked.iter().take(XI_SIZE) {
            in_xi[idx] = true;
        }

        let mut players: Vec<Player> = ranked
            .iter()
            .take(XI_SIZE)
            .map(|&idx| self.players[idx].clone())
            .collect();
        players.extend(
            self.players
                .iter()
                .enumerate()
                .filter(|(idx, _)| !in_xi[*idx])
                .map(|(_, p)| p.clone()),
        );

        Roster { players }
    }

    /// Exchange an XI slot with a substitute slot.
    ///
    /// Returns the (outgoing, incoming) players. The roster is unchanged on error.
    pub fn swap(&mut self, xi_index: usize, sub_index: usize) -> RosterResult<(Player, Player)> {
        let (xi, subs) = self.partition();
        if xi_index >= xi.len() {
            return Err(RosterError::IndexOutOfRange {
                slot: Slot::Xi,
                index: xi_index,
                len: xi.len(),
            });
        }
        if sub_index >= subs.len() {
            return Err(RosterError::IndexOutOfRange {
                slot: Slot::Sub,
                index: sub_index,
                len: subs.len(),
            });
        }

        let bench_index = XI_SIZE + sub_index;
        self.players.swap(xi_index, bench_index);
        Ok((
            self.players[bench_index].clone(),
            self.players[xi_index].clone(),
        ))
    }

    /// Swap only if both positions still hold the players the selection was
    /// made against
    pub fn swap_verified(&mut self, selection: &SwapSelection) -> RosterResult<(Player, Player)> {
        let (xi, subs) = self.partition();
        let xi_matches = xi
            .get(selection.xi_index)
            .map_or(false, |p| p.key() == selection.xi_key);
        let sub_matches = subs
            .get(selection.sub_index)
            .map_or(false, |p| p.key() == selection.sub_key);

        if !xi_matches || !sub_matches {
            // Report a plain range error when the roster simply shrank
            if selection.xi_index >= xi.len() || selection.sub_index >= subs.len() {
                return self.swap(selection.xi_index, selection.sub_index);
            }
            return Err(RosterError::StaleSelection);
        }

        self.swap(selection.xi_index, selection.sub_index)
    }
}

/// Group players by role in display order, keeping their relative order.
/// Roles with no players are left out.
pub fn categorize_by_role<'a>(players: &'a [Player]) -> Vec<(Role, Vec<&'a Player>)> {
    Role::DISPLAY_ORDER
        .iter()
        .map(|&role| {
            let group: Vec<&Player> = players.iter().filter(|p| p.role == role).collect();
            (role, group)
        })
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Mean overall rating, 0.0 for an empty slice
pub fn team_rating(players: &[Player]) -> f64 {
    if players.is_empty() {
        return 0.0;
    }
    let total: u64 = players.iter().map(|p| p.rating() as u64).sum();
    total as f64 / players.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cricket::player::test_player;

    fn roster_of(ratings: &[u32]) -> Roster {
        Roster::new(
            ratings
                .iter()
                .enumerate()
                .map(|(i, &r)| test_player(&format!("P{}", i), Role::Batter, r))
                .collect(),
        )
    }

    fn names(players: &[Player]) -> Vec<&str> {
        players.iter().map(|p| p.name.as_str()).collect()
    }

    fn sorted_names(roster: &Roster) -> Vec<String> {
        let mut v: Vec<String> = roster.players().iter().map(|p| p.name.clone()).collect();
        v.sort();
        v
    }

    #[test]
    fn test_partition_full_roster() {
        let roster = roster_of(&[50; 15]);
        let (xi, subs) = roster.partition();
        assert_eq!(xi.len(), 11);
        assert_eq!(subs.len(), 4);
        assert_eq!(subs[0].name, "P11");
    }

    #[test]
    fn test_partition_short_roster() {
        let roster = roster_of(&[50; 7]);
        let (xi, subs) = roster.partition();
        assert_eq!(xi.len(), 7);
        assert!(subs.is_empty());

        let exact = roster_of(&[50; 11]);
        assert_eq!(exact.xi().len(), 11);
        assert!(exact.subs().is_empty());
    }

    #[test]
    fn test_autobuild_example_thirteen_players() {
        // Distinct ratings; P3 and P7 are the two weakest
        let ratings = [80, 70, 75, 40, 90, 85, 60, 45, 65, 72, 88, 77, 55];
        let roster = roster_of(&ratings);

        let built = roster.autobuilt();

        let xi_ratings: Vec<u32> = built.xi().iter().map(|p| p.rating()).collect();
        assert_eq!(xi_ratings, vec![90, 88, 85, 80, 77, 75, 72, 70, 65, 60, 55]);
        assert_eq!(names(built.subs()), vec!["P3", "P7"]);
    }

    #[test]
    fn test_autobuild_bench_keeps_original_order() {
        // P12 and P13 are weaker than everyone but appear in reverse rating order
        let mut ratings = vec![90; 12];
        ratings.push(10);
        ratings.push(20);
        ratings[0] = 15;
        let roster = roster_of(&ratings);

        let built = roster.autobuilt();

        assert_eq!(names(built.subs()), vec!["P0", "P12", "P13"]);
    }

    #[test]
    fn test_autobuild_ties_are_stable() {
        let roster = roster_of(&[70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70, 70]);
        let built = roster.autobuilt();
        assert_eq!(built, roster);
    }

    #[test]
    fn test_autobuild_idempotent_and_preserves_players() {
        let ratings = [61, 78, 93, 55, 70, 82, 66, 74, 59, 88, 91, 47, 85, 77];
        let roster = roster_of(&ratings);

        let once = roster.autobuilt();
        let twice = once.autobuilt();

        let mut first_xi = names(once.xi());
        let mut second_xi = names(twice.xi());
        first_xi.sort();
        second_xi.sort();
        assert_eq!(first_xi, second_xi);

        assert_eq!(once.players().len(), roster.players().len());
        assert_eq!(sorted_names(&once), sorted_names(&roster));
    }

    #[test]
    fn test_autobuild_short_roster_only_reorders() {
        let roster = roster_of(&[40, 90, 60]);
        let built = roster.autobuilt();
        assert_eq!(names(built.xi()), vec!["P1", "P2", "P0"]);
        assert!(built.subs().is_empty());
    }

    #[test]
    fn test_swap_example() {
        let mut roster = roster_of(&[50; 13]);
        let before = roster.clone();

        let (out, incoming) = roster.swap(2, 0).unwrap();

        assert_eq!(out.name, "P2");
        assert_eq!(incoming.name, "P11");
        assert_eq!(roster.players()[2].name, before.players()[11].name);
        assert_eq!(roster.players()[11].name, before.players()[2].name);
        for i in (0..13).filter(|i| *i != 2 && *i != 11) {
            assert_eq!(roster.players()[i], before.players()[i]);
        }
    }

    #[test]
    fn test_swap_is_an_involution() {
        let mut roster = roster_of(&[50; 14]);
        let before = roster.clone();

        roster.swap(5, 2).unwrap();
        assert_ne!(roster, before);
        roster.swap(5, 2).unwrap();
        assert_eq!(roster, before);
    }

    #[test]
    fn test_swap_out_of_range_leaves_roster_untouched() {
        let mut roster = roster_of(&[50; 13]);
        let before = roster.clone();

        let err = roster.swap(11, 0).unwrap_err();
        assert!(matches!(
            err,
            RosterError::IndexOutOfRange { slot: Slot::Xi, index: 11, len: 11 }
        ));

        let err = roster.swap(0, 2).unwrap_err();
        assert!(matches!(
            err,
            RosterError::IndexOutOfRange { slot: Slot::Sub, index: 2, len: 2 }
        ));

        assert_eq!(roster, before);
    }

    #[test]
    fn test_swap_without_subs_fails() {
        let mut roster = roster_of(&[50; 9]);
        assert!(matches!(
            roster.swap(0, 0),
            Err(RosterError::IndexOutOfRange { slot: Slot::Sub, .. })
        ));
    }

    #[test]
    fn test_swap_verified_rejects_moved_players() {
        let mut roster = roster_of(&[50; 13]);
        let selection = SwapSelection {
            xi_index: 2,
            xi_key: roster.players()[2].key(),
            sub_index: 1,
            sub_key: roster.players()[12].key(),
        };

        // Another command reshuffles the roster in the meantime
        roster.swap(2, 0).unwrap();
        let before = roster.clone();

        assert!(matches!(
            roster.swap_verified(&selection),
            Err(RosterError::StaleSelection)
        ));
        assert_eq!(roster, before);
    }

    #[test]
    fn test_swap_verified_applies_matching_selection() {
        let mut roster = roster_of(&[50; 13]);
        let selection = SwapSelection {
            xi_index: 4,
            xi_key: roster.players()[4].key(),
            sub_index: 1,
            sub_key: roster.players()[12].key(),
        };

        let (out, incoming) = roster.swap_verified(&selection).unwrap();
        assert_eq!(out.name, "P4");
        assert_eq!(incoming.name, "P12");
        assert_eq!(roster.players()[4].name, "P12");
    }

    #[test]
    fn test_swap_verified_reports_shrunk_roster_as_range_error() {
        let mut roster = roster_of(&[50; 13]);
        let selection = SwapSelection {
            xi_index: 0,
            xi_key: roster.players()[0].key(),
            sub_index: 1,
            sub_key: roster.players()[12].key(),
        };
        let mut shrunk = Roster::new(roster.players()[..12].to_vec());

        assert!(matches!(
            shrunk.swap_verified(&selection),
            Err(RosterError::IndexOutOfRange { slot: Slot::Sub, .. })
        ));
        assert!(roster.swap_verified(&selection).is_ok());
    }

    #[test]
    fn test_categorize_preserves_order_and_skips_empty() {
        let players = vec![
            test_player("Bowl1", Role::Bowler, 70),
            test_player("Bat1", Role::Batter, 80),
            test_player("Bowl2", Role::Bowler, 75),
            test_player("Bat2", Role::Batter, 60),
            test_player("Ar1", Role::AllRounder, 65),
        ];

        let groups = categorize_by_role(&players);

        let roles: Vec<Role> = groups.iter().map(|(r, _)| *r).collect();
        assert_eq!(roles, vec![Role::Batter, Role::AllRounder, Role::Bowler]);
        assert_eq!(
            groups[0].1.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["Bat1", "Bat2"]
        );
        assert_eq!(
            groups[2].1.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["Bowl1", "Bowl2"]
        );
    }

    #[test]
    fn test_team_rating() {
        let roster = roster_of(&[80, 70, 75]);
        assert!((team_rating(roster.players()) - 75.0).abs() < f64::EPSILON);
        assert_eq!(team_rating(&[]), 0.0);
    }
}
