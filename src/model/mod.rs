pub mod game_save;
pub mod game_state;
pub mod message;
pub mod narrative;
