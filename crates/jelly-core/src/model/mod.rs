pub mod player;
pub mod pool;
pub mod rules;
pub mod score;
