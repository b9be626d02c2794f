pub mod analytics;
pub mod deck;
pub mod night;
pub mod phase;
pub mod vote;
pub mod win;
