pub mod dropdown;
pub mod game_card;
