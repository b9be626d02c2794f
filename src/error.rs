use axum::{http::StatusCode, response::IntoResponse, Json};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("room not found")]
    RoomNotFound,
    #[error("could not allocate a room code")]
    RoomCreationFailed,
    #[error("action not valid for the current phase: {0}")]
    InvalidActionForPhase(String),
    #[error("insufficient resource: {0}")]
    InsufficientResource(String),
    #[error("not enough players: need at least {needed}, have {have}")]
    NotEnoughPlayers { needed: usize, have: usize },
    #[error("room was modified concurrently, please retry")]
    ConcurrentModification,
    #[error("only the host may do that")]
    PermissionDenied,
}

impl GameError {
    pub fn status(&self) -> StatusCode {
        match self {
            GameError::RoomNotFound => StatusCode::NOT_FOUND,
            GameError::RoomCreationFailed => StatusCode::INTERNAL_SERVER_ERROR,
            GameError::InvalidActionForPhase(_)
            | GameError::InsufficientResource(_)
            | GameError::NotEnoughPlayers { .. } => StatusCode::BAD_REQUEST,
            GameError::ConcurrentModification => StatusCode::CONFLICT,
            GameError::PermissionDenied => StatusCode::FORBIDDEN,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        GameError::InvalidActionForPhase(reason.into())
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self.to_string())).into_response()
    }
}
