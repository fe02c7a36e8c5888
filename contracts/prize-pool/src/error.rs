use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid round window: open {open_time} must be before close {close_time}, and close must be after now ({now})")]
    InvalidWindow {
        open_time: u64,
        close_time: u64,
        now: u64,
    },

    #[error("round {round_id} is still in progress")]
    RoundInProgress { round_id: u64 },

    #[error("no round has been started")]
    NoActiveRound,

    #[error("round {round_id} cannot be drawn before {close_time} (now {now})")]
    TooEarly {
        round_id: u64,
        close_time: u64,
        now: u64,
    },

    #[error("draw request {request_id} is already pending for round {round_id}")]
    AlreadyPending { round_id: u64, request_id: u64 },

    #[error("round {round_id} is already resolved")]
    RoundAlreadyResolved { round_id: u64 },

    #[error("round {round_id} is not resolved yet")]
    RoundNotResolved { round_id: u64 },

    #[error("unknown randomness request {request_id}")]
    UnknownRequest { request_id: u64 },

    #[error("cannot draw a round with zero total chances")]
    ZeroWeight,

    #[error("weighted index is empty")]
    EmptyIndex,

    #[error("position {position} is outside the index (total weight {total_weight})")]
    PositionOutOfRange {
        position: Uint128,
        total_weight: Uint128,
    },

    #[error("invalid weight: {reason}")]
    InvalidWeight { reason: String },

    #[error("chance amount must be positive")]
    ZeroAmount,

    #[error("rewards for round {round_id} were already distributed")]
    AlreadyDistributed { round_id: u64 },

    #[error("nothing to claim")]
    NothingToClaim,

    #[error("invalid draws per round: {value} (must be between 1 and {max})")]
    InvalidDrawsPerRound { value: u32, max: u32 },
}
