use cosmwasm_std::{
    coins, to_json_binary, Addr, BankMsg, DepsMut, Env, Event, MessageInfo, QueryRequest,
    Response, StdError, Timestamp, Uint128, Uint256, WasmMsg, WasmQuery,
};
use pinata_common::random::winning_positions;
use pinata_common::types::Role;

use crate::error::ContractError;
use crate::msg::{AdapterExecuteMsg, AdapterQueryMsg, UpdateConfigParams};
use crate::sortition;
use crate::state::{
    HistoryEntry, PendingDrawRequest, PoolConfig, Round, CHANCES, CLAIMABLE, CLAIMED, CONFIG,
    HISTORY, MAX_DRAWS_PER_ROUND, PENDING_DRAW, POOL_STATE, ROUNDS,
};

/// Reject any sender that does not hold `role` in the pool's role table.
fn ensure_role(config: &PoolConfig, role: Role, sender: &Addr) -> Result<(), ContractError> {
    if sender != config.role_holder(role) {
        return Err(ContractError::Unauthorized {
            reason: format!("only the {} can call this", role),
        });
    }
    Ok(())
}

pub fn validate_draws_per_round(value: u32) -> Result<(), ContractError> {
    if value == 0 || value > MAX_DRAWS_PER_ROUND {
        return Err(ContractError::InvalidDrawsPerRound {
            value,
            max: MAX_DRAWS_PER_ROUND,
        });
    }
    Ok(())
}

/// Add `amount` chances to `participant`. Vault only.
/// A participant seen for the first time is appended to the weighted index
/// and takes the range `[prior_total, prior_total + amount)`.
pub fn add_chances(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    participant: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_role(&config, Role::Vault, &info.sender)?;

    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }

    let participant = deps.api.addr_validate(&participant)?;
    let current = CHANCES
        .may_load(deps.storage, &participant)?
        .unwrap_or_default();
    let chances = current
        .checked_add(amount)
        .map_err(|_| ContractError::InvalidWeight {
            reason: format!("chances of {} overflow", participant),
        })?;

    let update = sortition::set_weight(deps.storage, &participant, chances)?;
    CHANCES.save(deps.storage, &participant, &chances)?;

    let total = sortition::total_weight(deps.storage)?;
    let (range_start, range_end) =
        sortition::ticket_range(deps.storage, &participant)?.unwrap_or_default();

    Ok(Response::new()
        .add_attribute("action", "add_chances")
        .add_attribute("participant", participant.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("pinata_chances_added")
                .add_attribute("participant", participant.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("chances", chances.to_string())
                .add_attribute("new_participant", update.inserted.to_string())
                .add_attribute("range_start", range_start.to_string())
                .add_attribute("range_end", range_end.to_string())
                .add_attribute("total_chances", total.to_string()),
        ))
}

/// Drop all of `participant`'s chances. Vault only.
/// The index slot is kept with zero weight; unknown participants are a no-op.
pub fn withdraw(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    participant: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_role(&config, Role::Vault, &info.sender)?;

    let participant = deps.api.addr_validate(&participant)?;
    let removed = CHANCES
        .may_load(deps.storage, &participant)?
        .unwrap_or_default();

    if removed.is_zero() {
        return Ok(Response::new()
            .add_attribute("action", "withdraw")
            .add_attribute("participant", participant.to_string())
            .add_attribute("removed", "0"));
    }

    sortition::set_weight(deps.storage, &participant, Uint128::zero())?;
    CHANCES.remove(deps.storage, &participant);

    let total = sortition::total_weight(deps.storage)?;

    Ok(Response::new()
        .add_attribute("action", "withdraw")
        .add_attribute("participant", participant.to_string())
        .add_attribute("removed", removed.to_string())
        .add_event(
            Event::new("pinata_chances_withdrawn")
                .add_attribute("participant", participant.to_string())
                .add_attribute("removed", removed.to_string())
                .add_attribute("total_chances", total.to_string()),
        ))
}

/// Open the next round. Manager only.
/// The previous round, if any, must be resolved and distributed.
pub fn start_new_lottery(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    open_time: u64,
    close_time: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_role(&config, Role::Manager, &info.sender)?;

    let mut state = POOL_STATE.load(deps.storage)?;
    if let Some(round_id) = state.current_round {
        let previous = ROUNDS.load(deps.storage, round_id)?;
        if !(previous.resolved && previous.distributed) {
            return Err(ContractError::RoundInProgress { round_id });
        }
    }

    let now = env.block.time.seconds();
    if open_time >= close_time || close_time <= now {
        return Err(ContractError::InvalidWindow {
            open_time,
            close_time,
            now,
        });
    }

    let round_id = state.next_round_id;
    let round = Round {
        id: round_id,
        open_time: Timestamp::from_seconds(open_time),
        close_time: Timestamp::from_seconds(close_time),
        created_at: env.block.time,
        draws: config.draws_per_round,
        total_weight_at_close: None,
        request_id: None,
        draw_requested_at: None,
        random_value: None,
        winners: vec![],
        winning_tickets: vec![],
        resolved: false,
        resolved_at: None,
        round_reward: Uint128::zero(),
        distributed: false,
    };
    ROUNDS.save(deps.storage, round_id, &round)?;

    state.next_round_id += 1;
    state.current_round = Some(round_id);
    POOL_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "start_new_lottery")
        .add_attribute("round_id", round_id.to_string())
        .add_event(
            Event::new("pinata_round_started")
                .add_attribute("round_id", round_id.to_string())
                .add_attribute("open_time", open_time.to_string())
                .add_attribute("close_time", close_time.to_string())
                .add_attribute("draws", round.draws.to_string()),
        ))
}

/// Request randomness for the current round. Anyone can call once the
/// round has closed. The adapter assigns the request id; it is read
/// back through `NextRequestId` before the request is dispatched.
pub fn draw_number(deps: DepsMut, env: Env, _info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let state = POOL_STATE.load(deps.storage)?;

    let round_id = state.current_round.ok_or(ContractError::NoActiveRound)?;
    let mut round = ROUNDS.load(deps.storage, round_id)?;

    if let Some(pending) = PENDING_DRAW.may_load(deps.storage)? {
        return Err(ContractError::AlreadyPending {
            round_id: pending.round_id,
            request_id: pending.request_id,
        });
    }
    if round.resolved {
        return Err(ContractError::RoundAlreadyResolved { round_id });
    }
    if env.block.time < round.close_time {
        return Err(ContractError::TooEarly {
            round_id,
            close_time: round.close_time.seconds(),
            now: env.block.time.seconds(),
        });
    }

    let total = sortition::total_weight(deps.storage)?;
    if total.is_zero() {
        return Err(ContractError::ZeroWeight);
    }

    let request_id: u64 = deps
        .querier
        .query(&QueryRequest::Wasm(WasmQuery::Smart {
            contract_addr: config.randomness_adapter.to_string(),
            msg: to_json_binary(&AdapterQueryMsg::NextRequestId {})?,
        }))?;

    round.total_weight_at_close = Some(total);
    round.request_id = Some(request_id);
    round.draw_requested_at = Some(env.block.time);
    ROUNDS.save(deps.storage, round_id, &round)?;

    PENDING_DRAW.save(
        deps.storage,
        &PendingDrawRequest {
            round_id,
            request_id,
            requested_at: env.block.time,
        },
    )?;

    let request_msg = WasmMsg::Execute {
        contract_addr: config.randomness_adapter.to_string(),
        msg: to_json_binary(&AdapterExecuteMsg::RequestRandomness {})?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(request_msg)
        .add_attribute("action", "draw_number")
        .add_attribute("round_id", round_id.to_string())
        .add_attribute("request_id", request_id.to_string())
        .add_event(
            Event::new("pinata_draw_requested")
                .add_attribute("round_id", round_id.to_string())
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("total_chances", total.to_string()),
        ))
}

/// Resolve the pending draw. Randomness adapter only.
pub fn receive_randomness(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    random_value: Uint256,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_role(&config, Role::RandomnessAdapter, &info.sender)?;

    let pending = match PENDING_DRAW.may_load(deps.storage)? {
        Some(pending) if pending.request_id == request_id => pending,
        _ => return Err(ContractError::UnknownRequest { request_id }),
    };
    let mut round = ROUNDS.load(deps.storage, pending.round_id)?;

    let live_total = sortition::total_weight(deps.storage)?;
    if live_total.is_zero() {
        return Err(ContractError::EmptyIndex);
    }
    let total_at_close = round
        .total_weight_at_close
        .filter(|total| !total.is_zero())
        .unwrap_or(live_total);

    let positions = winning_positions(random_value, round.draws, total_at_close)?;

    let mut winners = Vec::with_capacity(positions.len());
    let mut winning_tickets = Vec::with_capacity(positions.len());
    for position in positions {
        // Chances may have been withdrawn while the request was in flight
        let position = if position >= live_total {
            position.checked_rem(live_total).map_err(StdError::from)?
        } else {
            position
        };
        winners.push(sortition::draw(deps.storage, position)?);
        winning_tickets.push(position);
    }

    round.random_value = Some(random_value);
    round.winners = winners;
    round.winning_tickets = winning_tickets;
    round.resolved = true;
    round.resolved_at = Some(env.block.time);
    ROUNDS.save(deps.storage, round.id, &round)?;
    PENDING_DRAW.remove(deps.storage);

    let winner_list = round
        .winners
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let ticket_list = round
        .winning_tickets
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(",");

    Ok(Response::new()
        .add_attribute("action", "receive_randomness")
        .add_attribute("round_id", round.id.to_string())
        .add_attribute("request_id", request_id.to_string())
        .add_event(
            Event::new("pinata_round_resolved")
                .add_attribute("round_id", round.id.to_string())
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("random_value", random_value.to_string())
                .add_attribute("winners", winner_list)
                .add_attribute("winning_tickets", ticket_list),
        ))
}

/// Credit the resolved round's reward to its winners. Anyone can call.
///
/// The reward is the pool's `reward_denom` balance not already owed to
/// earlier winners. Multiple winners split it equally; the first winner
/// also takes the remainder.
pub fn distribute_rewards(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = POOL_STATE.load(deps.storage)?;

    let round_id = state.current_round.ok_or(ContractError::NoActiveRound)?;
    let mut round = ROUNDS.load(deps.storage, round_id)?;

    if !round.resolved {
        return Err(ContractError::RoundNotResolved { round_id });
    }
    if round.distributed {
        return Err(ContractError::AlreadyDistributed { round_id });
    }

    let balance = deps
        .querier
        .query_balance(&env.contract.address, &config.reward_denom)?
        .amount;
    let round_reward = balance.saturating_sub(state.outstanding);

    let winner_count = Uint128::from(round.winners.len() as u128);
    let share = round_reward
        .checked_div(winner_count)
        .map_err(StdError::from)?;
    let remainder = round_reward - share * winner_count;

    for (i, winner) in round.winners.iter().enumerate() {
        let amount = if i == 0 { share + remainder } else { share };
        if amount.is_zero() {
            continue;
        }
        CLAIMABLE.update(deps.storage, winner, |c| -> Result<_, ContractError> {
            Ok(c.unwrap_or_default() + amount)
        })?;
    }

    round.round_reward = round_reward;
    round.distributed = true;
    ROUNDS.save(deps.storage, round_id, &round)?;

    HISTORY.save(
        deps.storage,
        round_id,
        &HistoryEntry {
            round_id,
            round_reward,
            winners: round.winners.clone(),
        },
    )?;

    state.total_distributed += round_reward;
    state.outstanding += round_reward;
    state.rounds_completed += 1;
    POOL_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "distribute_rewards")
        .add_attribute("round_id", round_id.to_string())
        .add_attribute("round_reward", round_reward.to_string())
        .add_event(
            Event::new("pinata_rewards_distributed")
                .add_attribute("round_id", round_id.to_string())
                .add_attribute("round_reward", round_reward.to_string())
                .add_attribute("winner_count", round.winners.len().to_string())
                .add_attribute("share", share.to_string()),
        ))
}

/// Send up to `amount` of the sender's claimable reward.
/// Requests above the claimable balance are clamped to it.
pub fn claim_reward(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let claimable = CLAIMABLE
        .may_load(deps.storage, &info.sender)?
        .unwrap_or_default();
    let payout = amount.min(claimable);
    if payout.is_zero() {
        return Err(ContractError::NothingToClaim);
    }

    let remaining = claimable - payout;
    if remaining.is_zero() {
        CLAIMABLE.remove(deps.storage, &info.sender);
    } else {
        CLAIMABLE.save(deps.storage, &info.sender, &remaining)?;
    }
    CLAIMED.update(deps.storage, &info.sender, |c| -> Result<_, ContractError> {
        Ok(c.unwrap_or_default() + payout)
    })?;

    let mut state = POOL_STATE.load(deps.storage)?;
    state.total_claimed += payout;
    state.outstanding = state
        .outstanding
        .checked_sub(payout)
        .map_err(StdError::from)?;
    POOL_STATE.save(deps.storage, &state)?;

    let send_msg = BankMsg::Send {
        to_address: info.sender.to_string(),
        amount: coins(payout.u128(), &config.reward_denom),
    };

    Ok(Response::new()
        .add_message(send_msg)
        .add_attribute("action", "claim_reward")
        .add_attribute("claimer", info.sender.to_string())
        .add_attribute("amount", payout.to_string())
        .add_event(
            Event::new("pinata_reward_claimed")
                .add_attribute("claimer", info.sender.to_string())
                .add_attribute("requested", amount.to_string())
                .add_attribute("amount", payout.to_string())
                .add_attribute("remaining", remaining.to_string()),
        ))
}

/// Update the role table. Manager only.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateConfigParams,
) -> Result<Response, ContractError> {
    let UpdateConfigParams {
        manager,
        vault,
        randomness_adapter,
        draws_per_round,
    } = params;

    let mut config = CONFIG.load(deps.storage)?;
    ensure_role(&config, Role::Manager, &info.sender)?;

    if let Some(manager) = manager {
        config.manager = deps.api.addr_validate(&manager)?;
    }
    if let Some(vault) = vault {
        config.vault = deps.api.addr_validate(&vault)?;
    }
    if let Some(randomness_adapter) = randomness_adapter {
        config.randomness_adapter = deps.api.addr_validate(&randomness_adapter)?;
    }
    if let Some(draws) = draws_per_round {
        validate_draws_per_round(draws)?;
        config.draws_per_round = draws;
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_event(
            Event::new("pinata_config_updated")
                .add_attribute("manager", config.manager.to_string())
                .add_attribute("vault", config.vault.to_string())
                .add_attribute("randomness_adapter", config.randomness_adapter.to_string())
                .add_attribute("draws_per_round", config.draws_per_round.to_string()),
        ))
}
