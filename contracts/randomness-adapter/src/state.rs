use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint256};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<AdapterConfig> = Item::new("config");
pub const NEXT_REQUEST_ID: Item<u64> = Item::new("next_request_id");
pub const REQUESTS: Map<u64, RandomnessRequest> = Map::new("requests");
pub const BEACONS: Map<u64, StoredBeacon> = Map::new("beacons");
pub const LATEST_ROUND: Item<u64> = Item::new("latest_round");

#[cw_serde]
pub struct AdapterConfig {
    pub admin: Addr,
    /// Allowed to fulfil requests with drand beacons
    pub operators: Vec<Addr>,
    /// Prize pools allowed to request randomness
    pub requesters: Vec<Addr>,
    /// Quicknet public key, 96 bytes (G2 point)
    pub quicknet_pubkey: Vec<u8>,
    /// Chain hash identifying the drand network
    pub chain_hash: String,
    /// Genesis time of the drand network (unix seconds)
    pub genesis_time: u64,
    /// Period between rounds in seconds (3 for quicknet)
    pub period_seconds: u64,
}

impl AdapterConfig {
    /// First drand round published strictly after `time`.
    ///
    /// Round `r` is published at `genesis_time + (r - 1) * period_seconds`.
    pub fn first_round_after(&self, time: Timestamp) -> u64 {
        let now = time.seconds();
        if now < self.genesis_time {
            return 1;
        }
        let published = (now - self.genesis_time) / self.period_seconds + 1;
        published + 1
    }
}

#[cw_serde]
pub struct RandomnessRequest {
    pub id: u64,
    pub requester: Addr,
    pub requested_at: Timestamp,
    /// The only drand round allowed to fulfil this request
    pub target_round: u64,
    pub fulfilled: bool,
    pub fulfilled_round: Option<u64>,
    pub fulfilled_at: Option<Timestamp>,
    pub random_value: Option<Uint256>,
}

#[cw_serde]
pub struct StoredBeacon {
    pub round: u64,
    /// sha256(signature), 32 bytes
    pub randomness: Vec<u8>,
    /// BLS signature on G1, 48 bytes
    pub signature: Vec<u8>,
    pub submitted_at: Timestamp,
    pub submitted_by: Addr,
}
