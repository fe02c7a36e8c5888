use cosmwasm_std::{StdResult, Uint128, Uint256};
use sha2::{Digest, Sha256};

/// Derive the 256-bit random value delivered for a randomness request.
///
/// `value = sha256( beacon_randomness || request_id_u64_be )`
///
/// Mixing in the request id gives every request its own value even when two
/// requests are fulfilled from the same drand round.
pub fn derive_random_value(beacon_randomness: &[u8], request_id: u64) -> Uint256 {
    let mut hasher = Sha256::new();
    hasher.update(beacon_randomness);
    hasher.update(request_id.to_be_bytes());
    Uint256::from_be_bytes(hasher.finalize().into())
}

/// Ticket position selected by the `index`-th draw of a round.
///
/// The first draw uses the delivered value directly:
/// `position_0 = random_value mod total_weight`.
/// Every further draw re-hashes it with its index:
/// `position_i = uint256(sha256( random_value_be || index_u32_be )) mod total_weight`.
///
/// Fails with a divide-by-zero error when `total_weight` is zero.
pub fn winning_position(
    random_value: Uint256,
    index: u32,
    total_weight: Uint128,
) -> StdResult<Uint128> {
    let seed = if index == 0 {
        random_value
    } else {
        let mut hasher = Sha256::new();
        hasher.update(random_value.to_be_bytes());
        hasher.update(index.to_be_bytes());
        Uint256::from_be_bytes(hasher.finalize().into())
    };

    let position = seed.checked_rem(Uint256::from(total_weight))?;
    Ok(Uint128::try_from(position)?)
}

/// Positions for every draw of a round, in draw order.
pub fn winning_positions(
    random_value: Uint256,
    draws: u32,
    total_weight: Uint128,
) -> StdResult<Vec<Uint128>> {
    (0..draws)
        .map(|index| winning_position(random_value, index, total_weight))
        .collect()
}
