use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Uint256;

use crate::state::{AdapterConfig, RandomnessRequest, StoredBeacon};

#[cw_serde]
pub struct InstantiateMsg {
    pub operators: Vec<String>,
    /// Prize pools allowed to request randomness
    pub requesters: Vec<String>,
    /// Hex-encoded quicknet public key (96 bytes = 192 hex chars)
    pub quicknet_pubkey_hex: String,
    pub chain_hash: String,
    pub genesis_time: u64,
    pub period_seconds: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Open a randomness request. Whitelisted requesters only.
    RequestRandomness {},
    /// Answer a request with a drand beacon. Operators only.
    FulfillRequest {
        request_id: u64,
        round: u64,
        /// Hex-encoded BLS signature (48 bytes = 96 hex chars)
        signature_hex: String,
    },
    /// Allow or revoke a requester (admin only).
    SetRequester { address: String, allowed: bool },
    /// Update operator list (admin only).
    UpdateOperators {
        add: Vec<String>,
        remove: Vec<String>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

/// Callback delivered to the requesting prize pool.
#[cw_serde]
pub enum PoolCallbackMsg {
    ReceiveRandomness {
        request_id: u64,
        random_value: Uint256,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(AdapterConfig)]
    Config {},

    #[returns(Option<RandomnessRequest>)]
    Request { request_id: u64 },

    /// Id the next `RequestRandomness` call will be assigned.
    #[returns(u64)]
    NextRequestId {},

    #[returns(Option<StoredBeacon>)]
    Beacon { round: u64 },

    #[returns(u64)]
    LatestRound {},
}
