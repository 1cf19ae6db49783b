use crate::model::player::Player;
use crate::model::pool::PoolState;
use crate::model::rules::{self, DrawOutcome, MAX_BULLETS, MIN_BULLETS, RulesError};
use crate::model::score::ScoreBoard;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("the match is already over")]
    NotInProgress,
    #[error("illegal draw of {requested} with {remaining} tokens remaining")]
    IllegalDraw { requested: usize, remaining: usize },
    #[error("bullet count {0} is outside the allowed range")]
    BulletCount(usize),
    #[error(transparent)]
    Rules(#[from] RulesError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    InProgress,
    /// `winner` is `None` for a drawn match.
    Finished { winner: Option<Player> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    Start {
        player: Player,
    },
    Draw {
        player: Player,
        count: usize,
        bullets_drawn: usize,
        points: i64,
        /// Only public once a bullet has been seen.
        bullets_left: Option<usize>,
    },
    Reveal {
        player: Player,
        bullets_drawn: usize,
        bullets_left: usize,
    },
    Surrender {
        winner: Player,
    },
    End {
        winner: Option<Player>,
        final_scores: [i64; 2],
    },
}

/// Public information available to the player about to move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub remaining: usize,
    pub score_diff: i64,
    pub bullet_revealed: bool,
    pub bullets_remaining: Option<usize>,
}

/// Result of one realized turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnRecord {
    pub player: Player,
    pub draw_count: usize,
    pub outcome: DrawOutcome,
    pub points: i64,
    pub revealed_now: bool,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct MatchState {
    pool: PoolState,
    total_bullets: usize,
    scores: ScoreBoard,
    tokens_drawn: [usize; 2],
    bullets_drawn: [usize; 2],
    current_turn: Player,
    bullet_revealed: bool,
    status: MatchStatus,
    turns_played: u32,
    history: Vec<MatchEvent>,
    rng: StdRng,
    seed: u64,
}

impl MatchState {
    pub fn new(starting_player: Player) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(starting_player, seed)
    }

    pub fn with_seed(starting_player: Player, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let total_bullets = rules::generate_bullet_count(&mut rng);
        Self::build(starting_player, seed, total_bullets, rng)
    }

    /// Fixes the hidden bullet count instead of drawing it from the seed.
    pub fn with_bullets(
        starting_player: Player,
        seed: u64,
        total_bullets: usize,
    ) -> Result<Self, GameError> {
        if !(MIN_BULLETS..=MAX_BULLETS).contains(&total_bullets) {
            return Err(GameError::BulletCount(total_bullets));
        }
        let rng = StdRng::seed_from_u64(seed);
        Ok(Self::build(starting_player, seed, total_bullets, rng))
    }

    fn build(starting_player: Player, seed: u64, total_bullets: usize, rng: StdRng) -> Self {
        let pool = PoolState::from_parts_unchecked(rules::POOL_SIZE, total_bullets);
        Self {
            pool,
            total_bullets,
            scores: ScoreBoard::new(),
            tokens_drawn: [0; 2],
            bullets_drawn: [0; 2],
            current_turn: starting_player,
            bullet_revealed: false,
            status: MatchStatus::InProgress,
            turns_played: 0,
            history: vec![MatchEvent::Start {
                player: starting_player,
            }],
            rng,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    pub fn total_bullets(&self) -> usize {
        self.total_bullets
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn current_turn(&self) -> Player {
        self.current_turn
    }

    pub fn is_bullet_revealed(&self) -> bool {
        self.bullet_revealed
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, MatchStatus::Finished { .. })
    }

    pub fn winner(&self) -> Option<Player> {
        match self.status {
            MatchStatus::Finished { winner } => winner,
            MatchStatus::InProgress => None,
        }
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn tokens_drawn(&self, player: Player) -> usize {
        self.tokens_drawn[player.index()]
    }

    pub fn bullets_drawn(&self, player: Player) -> usize {
        self.bullets_drawn[player.index()]
    }

    pub fn history(&self) -> &[MatchEvent] {
        &self.history
    }

    pub fn observation(&self, player: Player) -> Observation {
        Observation {
            remaining: self.pool.remaining(),
            score_diff: self.scores.differential(player),
            bullet_revealed: self.bullet_revealed,
            bullets_remaining: self
                .bullet_revealed
                .then_some(self.pool.bullets_remaining()),
        }
    }

    /// Realizes a draw for the player on turn and advances the match.
    pub fn draw(&mut self, draw_count: usize) -> Result<TurnRecord, GameError> {
        if self.is_finished() {
            return Err(GameError::NotInProgress);
        }
        if !self.pool.is_legal_draw(draw_count) {
            return Err(GameError::IllegalDraw {
                requested: draw_count,
                remaining: self.pool.remaining(),
            });
        }

        let player = self.current_turn;
        let outcome = rules::simulate_draw(
            &mut self.rng,
            draw_count,
            self.pool.remaining(),
            self.pool.bullets_remaining(),
        )?;
        let points = rules::score(draw_count, outcome.bullets_drawn)?;

        self.pool.apply(&outcome);
        self.scores.add_points(player, points);
        self.tokens_drawn[player.index()] += draw_count;
        self.bullets_drawn[player.index()] += outcome.bullets_drawn;
        self.turns_played += 1;

        let revealed_before = self.bullet_revealed;
        self.bullet_revealed = revealed_before || outcome.bullets_drawn > 0;
        let revealed_now = !revealed_before && self.bullet_revealed;

        self.history.push(MatchEvent::Draw {
            player,
            count: draw_count,
            bullets_drawn: outcome.bullets_drawn,
            points,
            bullets_left: revealed_before.then_some(outcome.bullets_remaining),
        });
        if revealed_now {
            self.history.push(MatchEvent::Reveal {
                player,
                bullets_drawn: outcome.bullets_drawn,
                bullets_left: outcome.bullets_remaining,
            });
        }

        let finished = self.pool.is_exhausted();
        if finished {
            let winner = self.scores.leading_player();
            self.status = MatchStatus::Finished { winner };
            self.history.push(MatchEvent::End {
                winner,
                final_scores: *self.scores.standings(),
            });
        } else {
            self.current_turn = player.other();
        }

        Ok(TurnRecord {
            player,
            draw_count,
            outcome,
            points,
            revealed_now,
            finished,
        })
    }

    /// The player on turn concedes.
    pub fn surrender(&mut self) -> Result<Player, GameError> {
        if self.is_finished() {
            return Err(GameError::NotInProgress);
        }
        let winner = self.current_turn.other();
        self.status = MatchStatus::Finished {
            winner: Some(winner),
        };
        self.history.push(MatchEvent::Surrender { winner });
        Ok(winner)
    }
}
