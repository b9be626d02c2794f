pub mod night;
pub mod player;
pub mod role;
pub mod room;
pub mod settings;
pub mod vote;
