//! Error types for playback

/// Errors starting or retiming playback
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    /// `play()` was called outside a Tokio runtime
    #[error("playback requires a Tokio runtime")]
    NoRuntime,
}

/// Result type alias for player operations
pub type PlayerResult<T> = Result<T, PlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_error_display() {
        assert_eq!(
            PlayerError::NoRuntime.to_string(),
            "playback requires a Tokio runtime"
        );
    }
}
