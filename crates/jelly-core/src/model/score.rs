use crate::model::player::Player;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    totals: [i64; 2],
}

impl ScoreBoard {
    pub const fn new() -> Self {
        Self { totals: [0; 2] }
    }

    pub fn add_points(&mut self, player: Player, points: i64) {
        self.totals[player.index()] += points;
    }

    pub fn set_totals(&mut self, totals: [i64; 2]) {
        self.totals = totals;
    }

    pub fn score(&self, player: Player) -> i64 {
        self.totals[player.index()]
    }

    pub fn standings(&self) -> &[i64; 2] {
        &self.totals
    }

    /// Own score minus the opponent's, seen from `player`.
    pub fn differential(&self, player: Player) -> i64 {
        self.score(player) - self.score(player.other())
    }

    /// `None` when the totals are level.
    pub fn leading_player(&self) -> Option<Player> {
        match self.differential(Player::One) {
            d if d > 0 => Some(Player::One),
            d if d < 0 => Some(Player::Two),
            _ => None,
        }
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}
