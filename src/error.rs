use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScorecardError {
    /// Bad upstream data. The offending pitch is skipped and the game state
    /// is left untouched; the caller logs and moves on.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The run-expectancy table was queried with a state the tracker can
    /// never reach in correct operation. Not recoverable.
    #[error("state out of range: outs={outs} bases={bases} balls={balls} strikes={strikes}")]
    OutOfRange {
        outs: u8,
        bases: u8,
        balls: u8,
        strikes: u8,
    },
}
