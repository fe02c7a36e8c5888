//! Integration tests for the Pinata prize pool and its randomness adapter.
//!
//! Both contracts are driven through their `instantiate` / `execute` /
//! `query` entry points with `cosmwasm_std::testing` mocks. Messages one
//! contract emits for the other are decoded and replayed by hand, playing
//! the part of the chain's message router.
//!
//! The pool's `NextRequestId` query against the adapter is served through
//! `MockQuerier::update_wasm` with the adapter's real answer.
//!
//! Run:
//! ```bash
//! cargo test -p pinata-integration-tests
//! ```

use cosmwasm_std::testing::{
    message_info, mock_dependencies, mock_env, MockApi, MockQuerier, MockStorage,
};
use cosmwasm_std::{
    from_json, Addr, BankMsg, Binary, Coin, ContractResult, CosmosMsg, Env, OwnedDeps, Response,
    SystemResult, Timestamp, Uint128, Uint256, WasmMsg, WasmQuery,
};
use pinata_common::random::{derive_random_value, winning_positions};
use sha2::{Digest, Sha256};

use pinata_prize_pool::msg as pool_msg;
use pinata_randomness_adapter::msg as adapter_msg;

type TestDeps = OwnedDeps<MockStorage, MockApi, MockQuerier>;

// ─── Constants ───

/// Real drand quicknet public key
const QUICKNET_PK_HEX: &str = "83cf0f2896adee7eb8b5f01fcad3912212c437e0073e911fb90022d3e760183c8c4b450b6a0a6c3ac6a5776a2d1064510d1fec758c921cc22b0e17e63aaf4bcb5ed66304de9cf809bd274ca73bab4af5a6e9c76a4bc09e76eae8991ef5ece45a";

/// Real quicknet test vector: round 1000
const TEST_ROUND: u64 = 1000;
const TEST_SIG_HEX: &str = "b44679b9a59af2ec876b1a6b1ad52ea9b1615fc3982b19576350f93447cb1125e342b73a8dd2bacbe47e4b6b63ed5e39";
const TEST_RANDOMNESS_HEX: &str =
    "fe290beca10872ef2fb164d2aa4442de4566183ec51c56ff3cd603d930e54fdd";

const QUICKNET_GENESIS: u64 = 1692803367;

const DENOM: &str = "uprize";
const ROUND_LENGTH: u64 = 3600;

// ─── Helpers ───

fn addr(name: &str) -> Addr {
    MockApi::default().addr_make(name)
}

/// Rounds close at genesis + 2994, while round 999 is the latest public
/// round, so every draw request is bound to round 1000.
fn start_time() -> u64 {
    QUICKNET_GENESIS + 2994 - ROUND_LENGTH
}

fn pool_env(seconds: u64) -> Env {
    let mut env = mock_env();
    env.block.time = Timestamp::from_seconds(seconds);
    env.contract.address = addr("pool");
    env
}

fn adapter_env(seconds: u64) -> Env {
    let mut env = mock_env();
    env.block.time = Timestamp::from_seconds(seconds);
    env.contract.address = addr("adapter");
    env
}

/// The single `WasmMsg::Execute` carried by a response.
fn wasm_execute(res: &Response) -> (String, Binary) {
    assert_eq!(res.messages.len(), 1);
    match &res.messages[0].msg {
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr, msg, ..
        }) => (contract_addr.clone(), msg.clone()),
        other => panic!("expected wasm execute, got {:?}", other),
    }
}

// ─── Adapter helpers ───

fn setup_adapter(deps: &mut TestDeps) {
    let msg = adapter_msg::InstantiateMsg {
        operators: vec![addr("operator").to_string()],
        requesters: vec![addr("pool").to_string()],
        quicknet_pubkey_hex: QUICKNET_PK_HEX.to_string(),
        chain_hash: "52db9ba70e0cc0f6eaf7803dd07447a1f5477735fd3f661792ba94600c84e971".to_string(),
        genesis_time: QUICKNET_GENESIS,
        period_seconds: 3,
    };
    pinata_randomness_adapter::contract::instantiate(
        deps.as_mut(),
        adapter_env(start_time()),
        message_info(&addr("admin"), &[]),
        msg,
    )
    .unwrap();
}

fn fulfill(deps: &mut TestDeps, request_id: u64, signature_hex: &str) -> Response {
    pinata_randomness_adapter::contract::execute(
        deps.as_mut(),
        adapter_env(start_time() + ROUND_LENGTH + 5),
        message_info(&addr("operator"), &[]),
        adapter_msg::ExecuteMsg::FulfillRequest {
            request_id,
            round: TEST_ROUND,
            signature_hex: signature_hex.to_string(),
        },
    )
    .unwrap()
}

// ─── Pool helpers ───

fn setup_pool(deps: &mut TestDeps, draws_per_round: Option<u32>) {
    let msg = pool_msg::InstantiateMsg {
        manager: Some(addr("manager").to_string()),
        vault: addr("vault").to_string(),
        randomness_adapter: addr("adapter").to_string(),
        reward_denom: DENOM.to_string(),
        draws_per_round,
    };
    pinata_prize_pool::contract::instantiate(
        deps.as_mut(),
        pool_env(start_time()),
        message_info(&addr("deployer"), &[]),
        msg,
    )
    .unwrap();
}

fn add_chances(deps: &mut TestDeps, participant: &Addr, amount: u128) {
    pinata_prize_pool::contract::execute(
        deps.as_mut(),
        pool_env(start_time()),
        message_info(&addr("vault"), &[]),
        pool_msg::ExecuteMsg::AddChances {
            participant: participant.to_string(),
            amount: Uint128::new(amount),
        },
    )
    .unwrap();
}

fn start_round(deps: &mut TestDeps) {
    pinata_prize_pool::contract::execute(
        deps.as_mut(),
        pool_env(start_time()),
        message_info(&addr("manager"), &[]),
        pool_msg::ExecuteMsg::StartNewLottery {
            open_time: start_time(),
            close_time: start_time() + ROUND_LENGTH,
        },
    )
    .unwrap();
}

/// Serve the pool's `NextRequestId` query with a fixed answer.
fn serve_next_request_id(pool_deps: &mut TestDeps, answer: Binary) {
    pool_deps.querier.update_wasm(move |query| match query {
        WasmQuery::Smart { .. } => SystemResult::Ok(ContractResult::Ok(answer.clone())),
        _ => SystemResult::Err(cosmwasm_std::SystemError::InvalidRequest {
            error: "Only smart queries supported".to_string(),
            request: Default::default(),
        }),
    });
}

/// Point the pool's querier at the adapter's current `NextRequestId`.
fn link_pool_to_adapter(pool_deps: &mut TestDeps, adapter_deps: &TestDeps) {
    let answer = pinata_randomness_adapter::contract::query(
        adapter_deps.as_ref(),
        adapter_env(start_time()),
        adapter_msg::QueryMsg::NextRequestId {},
    )
    .unwrap();
    serve_next_request_id(pool_deps, answer);
}

fn draw_number(pool_deps: &mut TestDeps) -> Response {
    pinata_prize_pool::contract::execute(
        pool_deps.as_mut(),
        pool_env(start_time() + ROUND_LENGTH),
        message_info(&addr("keeper"), &[]),
        pool_msg::ExecuteMsg::DrawNumber {},
    )
    .unwrap()
}

/// Route the pool's randomness request to the adapter.
fn relay_request(draw_res: &Response, adapter_deps: &mut TestDeps) -> Response {
    let (contract_addr, msg) = wasm_execute(draw_res);
    assert_eq!(contract_addr, addr("adapter").to_string());

    let parsed: adapter_msg::ExecuteMsg = from_json(&msg).unwrap();
    pinata_randomness_adapter::contract::execute(
        adapter_deps.as_mut(),
        adapter_env(start_time() + ROUND_LENGTH),
        message_info(&addr("pool"), &[]),
        parsed,
    )
    .unwrap()
}

/// Route the adapter's callback to the pool.
fn relay_callback(
    fulfill_res: &Response,
    pool_deps: &mut TestDeps,
) -> Result<Response, pinata_prize_pool::ContractError> {
    let (contract_addr, msg) = wasm_execute(fulfill_res);
    assert_eq!(contract_addr, addr("pool").to_string());

    let parsed: pool_msg::ExecuteMsg = from_json(&msg).unwrap();
    pinata_prize_pool::contract::execute(
        pool_deps.as_mut(),
        pool_env(start_time() + ROUND_LENGTH + 10),
        message_info(&addr("adapter"), &[]),
        parsed,
    )
}

fn set_pool_balance(pool_deps: &mut TestDeps, amount: u128) {
    pool_deps
        .querier
        .bank
        .update_balance(addr("pool"), vec![Coin::new(amount, DENOM)]);
}

fn distribute(pool_deps: &mut TestDeps) {
    pinata_prize_pool::contract::execute(
        pool_deps.as_mut(),
        pool_env(start_time() + ROUND_LENGTH + 20),
        message_info(&addr("keeper"), &[]),
        pool_msg::ExecuteMsg::DistributeRewards {},
    )
    .unwrap();
}

fn entry_info(pool_deps: &TestDeps, who: &Addr) -> pool_msg::EntryInfoResponse {
    let res = pinata_prize_pool::contract::query(
        pool_deps.as_ref(),
        pool_env(start_time()),
        pool_msg::QueryMsg::EntryInfo {
            address: who.to_string(),
        },
    )
    .unwrap();
    from_json(&res).unwrap()
}

fn round(pool_deps: &TestDeps, round_id: u64) -> pinata_prize_pool::state::Round {
    let res = pinata_prize_pool::contract::query(
        pool_deps.as_ref(),
        pool_env(start_time()),
        pool_msg::QueryMsg::Round { round_id },
    )
    .unwrap();
    from_json(&res).unwrap()
}

/// Request, fulfil and deliver one draw through both contracts.
fn run_draw(
    pool_deps: &mut TestDeps,
    adapter_deps: &mut TestDeps,
    signature_hex: &str,
) -> (u64, Response) {
    link_pool_to_adapter(pool_deps, adapter_deps);
    let draw_res = draw_number(pool_deps);
    let request_res = relay_request(&draw_res, adapter_deps);

    let request_id: u64 = request_res
        .attributes
        .iter()
        .find(|a| a.key == "request_id")
        .map(|a| a.value.parse().unwrap())
        .unwrap();

    let fulfill_res = fulfill(adapter_deps, request_id, signature_hex);
    let callback_res = relay_callback(&fulfill_res, pool_deps).unwrap();
    (request_id, callback_res)
}

// ─── Tests ───

#[test]
fn test_full_round_through_adapter() {
    let mut adapter_deps = mock_dependencies();
    let mut pool_deps = mock_dependencies();
    setup_adapter(&mut adapter_deps);
    setup_pool(&mut pool_deps, None);

    let alice = addr("alice");
    let bob = addr("bob");
    add_chances(&mut pool_deps, &alice, 100);
    add_chances(&mut pool_deps, &bob, 300);
    start_round(&mut pool_deps);

    let (request_id, callback_res) = run_draw(&mut pool_deps, &mut adapter_deps, TEST_SIG_HEX);
    assert_eq!(request_id, 0);
    assert!(callback_res
        .events
        .iter()
        .any(|e| e.ty == "pinata_round_resolved"));

    // Winner follows from the public beacon alone
    let randomness = hex::decode(TEST_RANDOMNESS_HEX).unwrap();
    let random_value = derive_random_value(&randomness, request_id);
    let position = winning_positions(random_value, 1, Uint128::new(400)).unwrap()[0];
    let expected_winner = if position < Uint128::new(100) {
        alice.clone()
    } else {
        bob.clone()
    };

    let resolved = round(&pool_deps, 0);
    assert_eq!(resolved.random_value, Some(random_value));
    assert_eq!(resolved.winners, vec![expected_winner.clone()]);
    assert_eq!(resolved.winning_tickets, vec![position]);

    // Adapter side is marked fulfilled
    let request: Option<pinata_randomness_adapter::state::RandomnessRequest> = from_json(
        pinata_randomness_adapter::contract::query(
            adapter_deps.as_ref(),
            adapter_env(start_time()),
            adapter_msg::QueryMsg::Request { request_id },
        )
        .unwrap(),
    )
    .unwrap();
    let request = request.unwrap();
    assert_eq!(request.target_round, TEST_ROUND);
    assert!(request.fulfilled);
    assert_eq!(request.requester, addr("pool"));

    // Yield reaches the pool, gets credited, and is claimed
    set_pool_balance(&mut pool_deps, 10_000);
    distribute(&mut pool_deps);
    assert_eq!(
        entry_info(&pool_deps, &expected_winner).claimable_reward,
        Uint128::new(10_000)
    );

    let claim_res = pinata_prize_pool::contract::execute(
        pool_deps.as_mut(),
        pool_env(start_time() + ROUND_LENGTH + 30),
        message_info(&expected_winner, &[]),
        pool_msg::ExecuteMsg::ClaimReward {
            amount: Uint128::new(10_000),
        },
    )
    .unwrap();
    assert_eq!(
        claim_res.messages[0].msg,
        CosmosMsg::Bank(BankMsg::Send {
            to_address: expected_winner.to_string(),
            amount: vec![Coin::new(10_000u128, DENOM)],
        })
    );

    let info = entry_info(&pool_deps, &expected_winner);
    assert_eq!(info.claimable_reward, Uint128::zero());
    assert_eq!(info.claimed_reward, Uint128::new(10_000));
}

#[test]
fn test_callbacks_cannot_be_forged_or_replayed() {
    let mut adapter_deps = mock_dependencies();
    let mut pool_deps = mock_dependencies();
    setup_adapter(&mut adapter_deps);
    setup_pool(&mut pool_deps, None);

    add_chances(&mut pool_deps, &addr("alice"), 50);
    start_round(&mut pool_deps);

    link_pool_to_adapter(&mut pool_deps, &adapter_deps);
    let draw_res = draw_number(&mut pool_deps);
    relay_request(&draw_res, &mut adapter_deps);

    // Someone other than the adapter tries to settle the draw
    let err = pinata_prize_pool::contract::execute(
        pool_deps.as_mut(),
        pool_env(start_time() + ROUND_LENGTH + 1),
        message_info(&addr("mallory"), &[]),
        pool_msg::ExecuteMsg::ReceiveRandomness {
            request_id: 0,
            random_value: Uint256::from(7u128),
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        pinata_prize_pool::ContractError::Unauthorized { .. }
    ));

    // The operator cannot answer with a round of its choosing
    let err = pinata_randomness_adapter::contract::execute(
        adapter_deps.as_mut(),
        adapter_env(start_time() + ROUND_LENGTH + 8),
        message_info(&addr("operator"), &[]),
        adapter_msg::ExecuteMsg::FulfillRequest {
            request_id: 0,
            round: TEST_ROUND + 1,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        pinata_randomness_adapter::ContractError::WrongRound {
            target_round: TEST_ROUND,
            ..
        }
    ));

    let fulfill_res = fulfill(&mut adapter_deps, 0, TEST_SIG_HEX);
    relay_callback(&fulfill_res, &mut pool_deps).unwrap();

    // Delivering the same callback again is rejected
    let err = relay_callback(&fulfill_res, &mut pool_deps).unwrap_err();
    assert!(matches!(
        err,
        pinata_prize_pool::ContractError::UnknownRequest { request_id: 0 }
    ));
}

#[test]
fn test_consecutive_rounds_conserve_rewards() {
    let mut adapter_deps = mock_dependencies();
    let mut pool_deps = mock_dependencies();
    setup_adapter(&mut adapter_deps);
    setup_pool(&mut pool_deps, None);

    let users = [addr("alice"), addr("bob"), addr("carol")];
    add_chances(&mut pool_deps, &users[0], 100);
    add_chances(&mut pool_deps, &users[1], 200);
    add_chances(&mut pool_deps, &users[2], 300);

    // Round 0
    start_round(&mut pool_deps);
    run_draw(&mut pool_deps, &mut adapter_deps, TEST_SIG_HEX);
    set_pool_balance(&mut pool_deps, 6_000);
    distribute(&mut pool_deps);

    // Round 1 reuses the stored beacon; request id 1 gives a fresh value
    start_round(&mut pool_deps);
    let (request_id, _) = run_draw(&mut pool_deps, &mut adapter_deps, "");
    assert_eq!(request_id, 1);
    set_pool_balance(&mut pool_deps, 10_000);
    distribute(&mut pool_deps);

    assert_ne!(round(&pool_deps, 0).random_value, round(&pool_deps, 1).random_value);

    let totals: pool_msg::TotalsResponse = from_json(
        pinata_prize_pool::contract::query(
            pool_deps.as_ref(),
            pool_env(start_time()),
            pool_msg::QueryMsg::Totals {},
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(totals.total_distributed, Uint128::new(10_000));
    assert_eq!(totals.outstanding, Uint128::new(10_000));
    assert_eq!(totals.rounds_completed, 2);

    let held: Uint128 = users
        .iter()
        .map(|u| {
            let info = entry_info(&pool_deps, u);
            info.claimable_reward + info.claimed_reward
        })
        .sum();
    assert_eq!(held, totals.total_distributed);
}

#[test]
fn test_multi_winner_round_through_adapter() {
    let mut adapter_deps = mock_dependencies();
    let mut pool_deps = mock_dependencies();
    setup_adapter(&mut adapter_deps);
    setup_pool(&mut pool_deps, Some(3));

    let users = [addr("alice"), addr("bob")];
    add_chances(&mut pool_deps, &users[0], 500);
    add_chances(&mut pool_deps, &users[1], 500);
    start_round(&mut pool_deps);

    let (request_id, _) = run_draw(&mut pool_deps, &mut adapter_deps, TEST_SIG_HEX);

    let randomness = hex::decode(TEST_RANDOMNESS_HEX).unwrap();
    let random_value = derive_random_value(&randomness, request_id);
    let positions = winning_positions(random_value, 3, Uint128::new(1_000)).unwrap();

    let resolved = round(&pool_deps, 0);
    assert_eq!(resolved.winning_tickets, positions);
    let expected_winners: Vec<Addr> = positions
        .iter()
        .map(|p| users[(p.u128() / 500) as usize].clone())
        .collect();
    assert_eq!(resolved.winners, expected_winners);

    set_pool_balance(&mut pool_deps, 1_001);
    distribute(&mut pool_deps);

    let credited: Uint128 = users
        .iter()
        .map(|u| entry_info(&pool_deps, u).claimable_reward)
        .sum();
    assert_eq!(credited, Uint128::new(1_001));
}

#[test]
fn test_draw_frequencies_through_entry_points() {
    let mut pool_deps = mock_dependencies();
    setup_pool(&mut pool_deps, None);

    let alice = addr("alice");
    let bob = addr("bob");
    add_chances(&mut pool_deps, &alice, 1);
    add_chances(&mut pool_deps, &bob, 3);

    let rounds = 1_000u64;
    let mut alice_wins = 0u64;
    for request_id in 0..rounds {
        start_round(&mut pool_deps);
        serve_next_request_id(
            &mut pool_deps,
            cosmwasm_std::to_json_binary(&request_id).unwrap(),
        );
        draw_number(&mut pool_deps);

        let seed: [u8; 32] = Sha256::digest(request_id.to_be_bytes()).into();
        pinata_prize_pool::contract::execute(
            pool_deps.as_mut(),
            pool_env(start_time() + ROUND_LENGTH + 10),
            message_info(&addr("adapter"), &[]),
            pool_msg::ExecuteMsg::ReceiveRandomness {
                request_id,
                random_value: derive_random_value(&seed, request_id),
            },
        )
        .unwrap();
        distribute(&mut pool_deps);

        if round(&pool_deps, request_id).winners == vec![alice.clone()] {
            alice_wins += 1;
        }
    }

    let observed = alice_wins as f64 / rounds as f64;
    assert!(
        (observed - 0.25).abs() < 0.07,
        "alice won {} of {} rounds",
        alice_wins,
        rounds
    );
}
