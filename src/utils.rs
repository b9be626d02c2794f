pub mod config;
pub mod room_code;
pub mod websocket;
