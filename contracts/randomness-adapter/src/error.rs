use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("randomness request {request_id} not found")]
    RequestNotFound { request_id: u64 },

    #[error("randomness request {request_id} is already fulfilled")]
    AlreadyFulfilled { request_id: u64 },

    #[error("request {request_id} is bound to drand round {target_round}, got round {round}")]
    WrongRound {
        request_id: u64,
        round: u64,
        target_round: u64,
    },

    #[error("BLS verification failed: {reason}")]
    VerificationFailed { reason: String },

    #[error("invalid hex input: {field}")]
    InvalidHex { field: String },

    #[error("invalid pubkey length: expected 96 bytes, got {got}")]
    InvalidPubkeyLength { got: usize },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}
