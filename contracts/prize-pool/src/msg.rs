use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Timestamp, Uint128, Uint256};
use pinata_common::types::RoundStatus;

use crate::state::{HistoryEntry, PendingDrawRequest, PoolConfig, Round};

#[cw_serde]
pub struct InstantiateMsg {
    /// Coordinator address. Defaults to the instantiating sender.
    pub manager: Option<String>,
    pub vault: String,
    pub randomness_adapter: String,
    pub reward_denom: String,
    /// Winners per round, 1 when omitted.
    pub draws_per_round: Option<u32>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Increase a participant's chances. Vault only.
    AddChances { participant: String, amount: Uint128 },
    /// Drop a participant's chances to zero. Vault only.
    Withdraw { participant: String },
    /// Open the next round. Manager only. Times are unix seconds.
    StartNewLottery { open_time: u64, close_time: u64 },
    /// Request randomness for the current round once it has closed. Anyone can call.
    DrawNumber {},
    /// Randomness callback. Randomness adapter only.
    ReceiveRandomness {
        request_id: u64,
        random_value: Uint256,
    },
    /// Credit the resolved round's reward to its winners. Anyone can call.
    DistributeRewards {},
    /// Withdraw up to `amount` of the sender's claimable reward.
    ClaimReward { amount: Uint128 },
    /// Update the role table. Manager only.
    UpdateConfig {
        manager: Option<String>,
        vault: Option<String>,
        randomness_adapter: Option<String>,
        draws_per_round: Option<u32>,
    },
}

pub struct UpdateConfigParams {
    pub manager: Option<String>,
    pub vault: Option<String>,
    pub randomness_adapter: Option<String>,
    pub draws_per_round: Option<u32>,
}

#[cw_serde]
pub struct MigrateMsg {}

/// Execute message for the randomness adapter contract.
#[cw_serde]
pub enum AdapterExecuteMsg {
    RequestRandomness {},
}

/// Query message for the randomness adapter contract.
#[cw_serde]
pub enum AdapterQueryMsg {
    NextRequestId {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(PoolConfig)]
    Config {},
    #[returns(StateResponse)]
    State {},
    #[returns(Uint128)]
    ChancesOf { address: String },
    #[returns(Option<Addr>)]
    OwnerOf { ticket_id: Uint128 },
    #[returns(Option<TicketRangeResponse>)]
    TicketRange { address: String },
    #[returns(Uint128)]
    TotalChances {},
    #[returns(EntryInfoResponse)]
    EntryInfo { address: String },
    #[returns(HistoryEntry)]
    History { round_index: u64 },
    #[returns(HistoryListResponse)]
    HistoryList {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(Round)]
    Round { round_id: u64 },
    #[returns(Option<PendingDrawRequest>)]
    PendingDraw {},
    #[returns(TotalsResponse)]
    Totals {},
}

#[cw_serde]
pub struct StateResponse {
    pub status: RoundStatus,
    pub current_round_id: Option<u64>,
    pub open_time: Option<Timestamp>,
    pub close_time: Option<Timestamp>,
    pub pending_request_id: Option<u64>,
    pub total_chances: Uint128,
    pub rounds_completed: u64,
}

#[cw_serde]
pub struct TicketRangeResponse {
    /// First ticket id owned, inclusive
    pub start: Uint128,
    /// One past the last ticket id owned
    pub end: Uint128,
}

#[cw_serde]
pub struct EntryInfoResponse {
    pub chances: Uint128,
    pub claimable_reward: Uint128,
    pub claimed_reward: Uint128,
}

#[cw_serde]
pub struct HistoryListResponse {
    pub entries: Vec<HistoryEntry>,
}

#[cw_serde]
pub struct TotalsResponse {
    pub total_distributed: Uint128,
    pub total_claimed: Uint128,
    pub outstanding: Uint128,
    pub rounds_completed: u64,
}
