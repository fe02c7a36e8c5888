use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128, Uint256};
use cw_storage_plus::{Item, Map};
use pinata_common::types::{Role, RoundStatus};

pub const CONFIG: Item<PoolConfig> = Item::new("config");
pub const POOL_STATE: Item<PoolState> = Item::new("pool_state");

/// Append-only round table, keyed by round id.
pub const ROUNDS: Map<u64, Round> = Map::new("rounds");
/// Single pending randomness request. Removed when the callback resolves it.
pub const PENDING_DRAW: Item<PendingDrawRequest> = Item::new("pending_draw");
/// Distributed rounds, keyed by history index (equal to the round id).
pub const HISTORY: Map<u64, HistoryEntry> = Map::new("history");

/// Ticket ledger
pub const CHANCES: Map<&Addr, Uint128> = Map::new("chances");

/// Reward ledger
pub const CLAIMABLE: Map<&Addr, Uint128> = Map::new("claimable");
pub const CLAIMED: Map<&Addr, Uint128> = Map::new("claimed");

/// Weighted index (Fenwick tree over leaves in insertion order, ids from 1)
pub const TREE_META: Item<TreeMeta> = Item::new("tree_meta");
pub const TREE_NODES: Map<u64, Uint128> = Map::new("tree_nodes");
pub const LEAF_WEIGHTS: Map<u64, Uint128> = Map::new("leaf_weights");
pub const LEAF_OWNERS: Map<u64, Addr> = Map::new("leaf_owners");
pub const LEAF_IDS: Map<&Addr, u64> = Map::new("leaf_ids");

/// Most draws a single round may resolve.
pub const MAX_DRAWS_PER_ROUND: u32 = 10;

#[cw_serde]
pub struct PoolConfig {
    /// Coordinator: starts rounds, edits this table
    pub manager: Addr,
    /// Capital custody vault: the only caller of AddChances / Withdraw
    pub vault: Addr,
    /// Contract allowed to deliver ReceiveRandomness
    pub randomness_adapter: Addr,
    /// Native denom the prizes are paid in
    pub reward_denom: String,
    /// Winners drawn per round (1 in the base design)
    pub draws_per_round: u32,
}

impl PoolConfig {
    pub fn role_holder(&self, role: Role) -> &Addr {
        match role {
            Role::Manager => &self.manager,
            Role::Vault => &self.vault,
            Role::RandomnessAdapter => &self.randomness_adapter,
        }
    }
}

#[cw_serde]
pub struct PoolState {
    pub next_round_id: u64,
    pub current_round: Option<u64>,
    pub rounds_completed: u64,
    /// Sum of every recorded round reward
    pub total_distributed: Uint128,
    pub total_claimed: Uint128,
    /// Credited but not yet claimed. Part of the token balance that belongs
    /// to participants, never to a new round.
    pub outstanding: Uint128,
}

#[cw_serde]
pub struct Round {
    pub id: u64,
    pub open_time: Timestamp,
    pub close_time: Timestamp,
    pub created_at: Timestamp,
    /// Winners this round will draw, captured from config at start
    pub draws: u32,
    pub total_weight_at_close: Option<Uint128>,
    pub request_id: Option<u64>,
    pub draw_requested_at: Option<Timestamp>,
    pub random_value: Option<Uint256>,
    pub winners: Vec<Addr>,
    pub winning_tickets: Vec<Uint128>,
    pub resolved: bool,
    pub resolved_at: Option<Timestamp>,
    pub round_reward: Uint128,
    pub distributed: bool,
}

impl Round {
    pub fn status(&self, now: Timestamp) -> RoundStatus {
        if self.resolved {
            RoundStatus::Resolved
        } else if self.request_id.is_some() {
            RoundStatus::DrawRequested
        } else if now < self.close_time {
            RoundStatus::Open
        } else {
            RoundStatus::AwaitingClose
        }
    }
}

#[cw_serde]
pub struct PendingDrawRequest {
    pub round_id: u64,
    pub request_id: u64,
    pub requested_at: Timestamp,
}

#[cw_serde]
pub struct HistoryEntry {
    pub round_id: u64,
    pub round_reward: Uint128,
    pub winners: Vec<Addr>,
}

#[cw_serde]
#[derive(Default)]
pub struct TreeMeta {
    /// Number of leaves ever inserted; also the highest leaf id
    pub leaf_count: u64,
    /// Root sum
    pub total_weight: Uint128,
}
