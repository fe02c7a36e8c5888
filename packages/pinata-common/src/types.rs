use cosmwasm_schema::cw_serde;

/// Lifecycle status of the prize pool's current round.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum RoundStatus {
    /// No round has been started yet.
    NoRound,
    /// Round started and `close_time` not reached yet.
    Open,
    /// Past `close_time` with no draw requested yet; drawable.
    AwaitingClose,
    /// Randomness requested, waiting for the adapter callback.
    DrawRequested,
    /// Winners recorded. Rewards may or may not be distributed yet.
    Resolved,
}

/// Roles in the prize pool's authorization table.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Role {
    /// Coordinator: starts rounds and edits the role table.
    Manager,
    /// Capital custody vault: adds and removes chances.
    Vault,
    /// Randomness adapter: delivers draw callbacks.
    RandomnessAdapter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Vault => "vault",
            Role::RandomnessAdapter => "randomness_adapter",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
