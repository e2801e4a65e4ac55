//! Errors raised by the engagement tracker.

use harry_common::UserId;
use thiserror::Error;

/// Result type for engagement operations.
pub type FunResult<T> = Result<T, FunError>;

/// What went wrong in an engagement operation.
///
/// Admin operations surface `Validation`, `NotFound` and `Unauthorized` to
/// the invoking admin. `Transport` and `Generation` only occur on the
/// message path, where they are logged and swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FunError {
    /// Bad input, such as a timeout out of range or a bot account.
    #[error("{0}")]
    Validation(String),

    /// The user is not currently targeted in this guild.
    #[error("user {user_id} isn't being targeted")]
    NotFound {
        /// The user that was looked up.
        user_id: UserId,
    },

    /// The caller failed the admin check.
    #[error("Nice try, but no.")]
    Unauthorized,

    /// Sending a message or reaction failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The text generation service failed.
    #[error("generation error: {0}")]
    Generation(String),
}
