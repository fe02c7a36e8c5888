use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdError, StdResult, Uint128};
use cw_storage_plus::Bound;
use pinata_common::types::RoundStatus;

use crate::msg::{
    EntryInfoResponse, HistoryListResponse, StateResponse, TicketRangeResponse, TotalsResponse,
};
use crate::sortition;
use crate::state::{
    CHANCES, CLAIMABLE, CLAIMED, CONFIG, HISTORY, PENDING_DRAW, POOL_STATE, ROUNDS,
};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_state(deps: Deps, env: Env) -> StdResult<Binary> {
    let state = POOL_STATE.load(deps.storage)?;
    let round = match state.current_round {
        Some(round_id) => Some(ROUNDS.load(deps.storage, round_id)?),
        None => None,
    };

    let status = round
        .as_ref()
        .map(|r| r.status(env.block.time))
        .unwrap_or(RoundStatus::NoRound);
    let pending = PENDING_DRAW.may_load(deps.storage)?;

    to_json_binary(&StateResponse {
        status,
        current_round_id: state.current_round,
        open_time: round.as_ref().map(|r| r.open_time),
        close_time: round.as_ref().map(|r| r.close_time),
        pending_request_id: pending.map(|p| p.request_id),
        total_chances: sortition::total_weight(deps.storage)?,
        rounds_completed: state.rounds_completed,
    })
}

pub fn query_chances_of(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let chances = CHANCES.may_load(deps.storage, &addr)?.unwrap_or_default();
    to_json_binary(&chances)
}

pub fn query_owner_of(deps: Deps, ticket_id: Uint128) -> StdResult<Binary> {
    let owner = sortition::owner_of(deps.storage, ticket_id)
        .map_err(|e| StdError::generic_err(e.to_string()))?;
    to_json_binary(&owner)
}

pub fn query_ticket_range(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let range = sortition::ticket_range(deps.storage, &addr)?
        .map(|(start, end)| TicketRangeResponse { start, end });
    to_json_binary(&range)
}

pub fn query_total_chances(deps: Deps) -> StdResult<Binary> {
    to_json_binary(&sortition::total_weight(deps.storage)?)
}

pub fn query_entry_info(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    to_json_binary(&EntryInfoResponse {
        chances: CHANCES.may_load(deps.storage, &addr)?.unwrap_or_default(),
        claimable_reward: CLAIMABLE.may_load(deps.storage, &addr)?.unwrap_or_default(),
        claimed_reward: CLAIMED.may_load(deps.storage, &addr)?.unwrap_or_default(),
    })
}

pub fn query_history(deps: Deps, round_index: u64) -> StdResult<Binary> {
    let entry = HISTORY.load(deps.storage, round_index)?;
    to_json_binary(&entry)
}

pub fn query_history_list(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let entries: Vec<_> = HISTORY
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, entry)| entry)
        .collect();

    to_json_binary(&HistoryListResponse { entries })
}

pub fn query_round(deps: Deps, round_id: u64) -> StdResult<Binary> {
    let round = ROUNDS.load(deps.storage, round_id)?;
    to_json_binary(&round)
}

pub fn query_pending_draw(deps: Deps) -> StdResult<Binary> {
    let pending = PENDING_DRAW.may_load(deps.storage)?;
    to_json_binary(&pending)
}

pub fn query_totals(deps: Deps) -> StdResult<Binary> {
    let state = POOL_STATE.load(deps.storage)?;
    to_json_binary(&TotalsResponse {
        total_distributed: state.total_distributed,
        total_claimed: state.total_claimed,
        outstanding: state.outstanding,
        rounds_completed: state.rounds_completed,
    })
}
