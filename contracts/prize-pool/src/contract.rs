use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Uint128,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, UpdateConfigParams};
use crate::query;
use crate::state::{PoolConfig, PoolState, TreeMeta, CONFIG, POOL_STATE, TREE_META};

const CONTRACT_NAME: &str = "crates.io:pinata-prize-pool";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let draws_per_round = msg.draws_per_round.unwrap_or(1);
    execute::validate_draws_per_round(draws_per_round)?;

    let manager = match msg.manager {
        Some(manager) => deps.api.addr_validate(&manager)?,
        None => info.sender.clone(),
    };

    let config = PoolConfig {
        manager,
        vault: deps.api.addr_validate(&msg.vault)?,
        randomness_adapter: deps.api.addr_validate(&msg.randomness_adapter)?,
        reward_denom: msg.reward_denom,
        draws_per_round,
    };
    CONFIG.save(deps.storage, &config)?;

    let state = PoolState {
        next_round_id: 0,
        current_round: None,
        rounds_completed: 0,
        total_distributed: Uint128::zero(),
        total_claimed: Uint128::zero(),
        outstanding: Uint128::zero(),
    };
    POOL_STATE.save(deps.storage, &state)?;
    TREE_META.save(deps.storage, &TreeMeta::default())?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "prize-pool")
        .add_attribute("manager", config.manager.to_string())
        .add_attribute("reward_denom", config.reward_denom))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::AddChances {
            participant,
            amount,
        } => execute::add_chances(deps, env, info, participant, amount),
        ExecuteMsg::Withdraw { participant } => execute::withdraw(deps, env, info, participant),
        ExecuteMsg::StartNewLottery {
            open_time,
            close_time,
        } => execute::start_new_lottery(deps, env, info, open_time, close_time),
        ExecuteMsg::DrawNumber {} => execute::draw_number(deps, env, info),
        ExecuteMsg::ReceiveRandomness {
            request_id,
            random_value,
        } => execute::receive_randomness(deps, env, info, request_id, random_value),
        ExecuteMsg::DistributeRewards {} => execute::distribute_rewards(deps, env, info),
        ExecuteMsg::ClaimReward { amount } => execute::claim_reward(deps, env, info, amount),
        ExecuteMsg::UpdateConfig {
            manager,
            vault,
            randomness_adapter,
            draws_per_round,
        } => execute::update_config(
            deps,
            env,
            info,
            UpdateConfigParams {
                manager,
                vault,
                randomness_adapter,
                draws_per_round,
            },
        ),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::State {} => query::query_state(deps, env),
        QueryMsg::ChancesOf { address } => query::query_chances_of(deps, address),
        QueryMsg::OwnerOf { ticket_id } => query::query_owner_of(deps, ticket_id),
        QueryMsg::TicketRange { address } => query::query_ticket_range(deps, address),
        QueryMsg::TotalChances {} => query::query_total_chances(deps),
        QueryMsg::EntryInfo { address } => query::query_entry_info(deps, address),
        QueryMsg::History { round_index } => query::query_history(deps, round_index),
        QueryMsg::HistoryList { start_after, limit } => {
            query::query_history_list(deps, start_after, limit)
        }
        QueryMsg::Round { round_id } => query::query_round(deps, round_id),
        QueryMsg::PendingDraw {} => query::query_pending_draw(deps),
        QueryMsg::Totals {} => query::query_totals(deps),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
