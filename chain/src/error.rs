use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("connected node reports chain id {got}, expected {expected}")]
    ChainIdMismatch { expected: u64, got: u64 },

    #[error("could not decode chain response: {0}")]
    Decode(String),

    #[error("proposal {0} not found on chain")]
    ProposalNotFound(u64),
}

impl From<reqwest::Error> for ChainError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
