use cosmwasm_std::{to_json_binary, DepsMut, Env, Event, MessageInfo, Response, WasmMsg};
use pinata_common::random::derive_random_value;

use crate::error::ContractError;
use crate::msg::PoolCallbackMsg;
use crate::state::{
    RandomnessRequest, StoredBeacon, BEACONS, CONFIG, LATEST_ROUND, NEXT_REQUEST_ID, REQUESTS,
};
use crate::verify::{decode_hex, verify_beacon};

/// Open a randomness request. Only whitelisted requesters can call this.
/// The request is bound to the first drand round published after now.
pub fn request_randomness(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if !config.requesters.contains(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: "only whitelisted requesters can request randomness".to_string(),
        });
    }

    let request_id = NEXT_REQUEST_ID.load(deps.storage)?;
    let target_round = config.first_round_after(env.block.time);

    let request = RandomnessRequest {
        id: request_id,
        requester: info.sender.clone(),
        requested_at: env.block.time,
        target_round,
        fulfilled: false,
        fulfilled_round: None,
        fulfilled_at: None,
        random_value: None,
    };
    REQUESTS.save(deps.storage, request_id, &request)?;
    NEXT_REQUEST_ID.save(deps.storage, &(request_id + 1))?;

    Ok(Response::new()
        .add_attribute("action", "request_randomness")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("requester", info.sender.to_string())
        .add_event(
            Event::new("pinata_randomness_requested")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("requester", info.sender.to_string())
                .add_attribute("target_round", target_round.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// Fulfil a request with a drand beacon. Only operators can call this.
/// A round seen before is taken from the beacon store; otherwise the
/// signature is BLS-verified and the beacon stored.
pub fn fulfill_request(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    round: u64,
    signature_hex: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if !config.operators.contains(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: "only operators can fulfil requests".to_string(),
        });
    }

    let mut request = REQUESTS
        .may_load(deps.storage, request_id)?
        .ok_or(ContractError::RequestNotFound { request_id })?;
    if request.fulfilled {
        return Err(ContractError::AlreadyFulfilled { request_id });
    }
    if round != request.target_round {
        return Err(ContractError::WrongRound {
            request_id,
            round,
            target_round: request.target_round,
        });
    }

    let randomness = match BEACONS.may_load(deps.storage, round)? {
        Some(beacon) => beacon.randomness,
        None => {
            let signature = decode_hex("signature_hex", &signature_hex)?;
            let randomness = verify_beacon(&config.quicknet_pubkey, round, &signature)?;

            BEACONS.save(
                deps.storage,
                round,
                &StoredBeacon {
                    round,
                    randomness: randomness.to_vec(),
                    signature,
                    submitted_at: env.block.time,
                    submitted_by: info.sender.clone(),
                },
            )?;

            let latest = LATEST_ROUND.may_load(deps.storage)?.unwrap_or(0);
            if round > latest {
                LATEST_ROUND.save(deps.storage, &round)?;
            }
            randomness.to_vec()
        }
    };

    let random_value = derive_random_value(&randomness, request_id);

    request.fulfilled = true;
    request.fulfilled_round = Some(round);
    request.fulfilled_at = Some(env.block.time);
    request.random_value = Some(random_value);
    REQUESTS.save(deps.storage, request_id, &request)?;

    let callback = WasmMsg::Execute {
        contract_addr: request.requester.to_string(),
        msg: to_json_binary(&PoolCallbackMsg::ReceiveRandomness {
            request_id,
            random_value,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(callback)
        .add_attribute("action", "fulfill_request")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("round", round.to_string())
        .add_event(
            Event::new("pinata_randomness_fulfilled")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("round", round.to_string())
                .add_attribute("randomness", hex::encode(&randomness))
                .add_attribute("random_value", random_value.to_string())
                .add_attribute("requester", request.requester.to_string())
                .add_attribute("fulfilled_by", info.sender.to_string()),
        ))
}

/// Allow or revoke a requester. Admin only.
pub fn set_requester(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    address: String,
    allowed: bool,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can set requesters".to_string(),
        });
    }

    let addr = deps.api.addr_validate(&address)?;
    config.requesters.retain(|a| *a != addr);
    if allowed {
        config.requesters.push(addr.clone());
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "set_requester")
        .add_attribute("requester", addr.to_string())
        .add_attribute("allowed", allowed.to_string()))
}

/// Update the operator list. Admin only.
pub fn update_operators(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update operators".to_string(),
        });
    }

    for addr_str in &remove {
        let addr = deps.api.addr_validate(addr_str)?;
        config.operators.retain(|a| *a != addr);
    }
    for addr_str in &add {
        let addr = deps.api.addr_validate(addr_str)?;
        if !config.operators.contains(&addr) {
            config.operators.push(addr);
        }
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_operators")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}
