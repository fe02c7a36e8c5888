//! Weighted index over participant chances.
//!
//! A Fenwick (binary indexed) tree kept in contract storage. Leaves are
//! numbered from 1 in the order participants first appear, so each
//! participant owns one contiguous range of ticket positions and the ranges
//! follow insertion order. Node `k` holds the sum of leaves
//! `(k - lowbit(k), k]`; the root sum lives in `TREE_META.total_weight`.
//!
//! Every operation touches O(log n) nodes, where n is the number of leaves
//! ever inserted. The tree never shrinks: a participant set to zero keeps
//! its leaf and simply owns an empty range.

use cosmwasm_std::{Addr, StdError, StdResult, Storage, Uint128};

use crate::error::ContractError;
use crate::state::{TreeMeta, LEAF_IDS, LEAF_OWNERS, LEAF_WEIGHTS, TREE_META, TREE_NODES};

/// Outcome of a `set_weight` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightUpdate {
    pub leaf_id: u64,
    pub inserted: bool,
    pub old_weight: Uint128,
    pub new_weight: Uint128,
}

#[inline]
fn lowbit(k: u64) -> u64 {
    k & k.wrapping_neg()
}

#[inline]
fn highest_power_of_two(n: u64) -> u64 {
    if n == 0 {
        0
    } else {
        1 << (63 - n.leading_zeros())
    }
}

fn node(storage: &dyn Storage, k: u64) -> StdResult<Uint128> {
    Ok(TREE_NODES.may_load(storage, k)?.unwrap_or_default())
}

fn weight_overflow(total: Uint128, delta: Uint128) -> ContractError {
    ContractError::InvalidWeight {
        reason: format!("total weight {} + {} overflows", total, delta),
    }
}

pub fn load_meta(storage: &dyn Storage) -> StdResult<TreeMeta> {
    Ok(TREE_META.may_load(storage)?.unwrap_or_default())
}

/// O(1) read of the root sum.
pub fn total_weight(storage: &dyn Storage) -> StdResult<Uint128> {
    Ok(load_meta(storage)?.total_weight)
}

pub fn leaf_id(storage: &dyn Storage, owner: &Addr) -> StdResult<Option<u64>> {
    LEAF_IDS.may_load(storage, owner)
}

/// Set `owner`'s leaf to `new_weight` (absolute, not a delta).
///
/// Known owners walk from their leaf towards the root adjusting every
/// covering node by `new_weight - old_weight`. Unknown owners get the next
/// leaf id; the new node is initialised from the nodes it covers, and has no
/// ancestors yet.
///
/// The overflow check runs against the root sum before anything is written.
/// Every node is bounded by the root, so no node write can overflow after it.
pub fn set_weight(
    storage: &mut dyn Storage,
    owner: &Addr,
    new_weight: Uint128,
) -> Result<WeightUpdate, ContractError> {
    let mut meta = load_meta(storage)?;

    let Some(id) = LEAF_IDS.may_load(storage, owner)? else {
        meta.total_weight = meta
            .total_weight
            .checked_add(new_weight)
            .map_err(|_| weight_overflow(meta.total_weight, new_weight))?;

        let id = meta.leaf_count + 1;
        let floor = id - lowbit(id);
        let mut value = new_weight;
        let mut k = id - 1;
        while k > floor {
            value += node(storage, k)?;
            k -= lowbit(k);
        }

        TREE_NODES.save(storage, id, &value)?;
        LEAF_WEIGHTS.save(storage, id, &new_weight)?;
        LEAF_OWNERS.save(storage, id, owner)?;
        LEAF_IDS.save(storage, owner, &id)?;
        meta.leaf_count = id;
        TREE_META.save(storage, &meta)?;

        return Ok(WeightUpdate {
            leaf_id: id,
            inserted: true,
            old_weight: Uint128::zero(),
            new_weight,
        });
    };

    let old_weight = LEAF_WEIGHTS.load(storage, id)?;

    if new_weight > old_weight {
        let delta = new_weight - old_weight;
        meta.total_weight = meta
            .total_weight
            .checked_add(delta)
            .map_err(|_| weight_overflow(meta.total_weight, delta))?;

        let mut k = id;
        while k <= meta.leaf_count {
            let value = node(storage, k)? + delta;
            TREE_NODES.save(storage, k, &value)?;
            k += lowbit(k);
        }
    } else if new_weight < old_weight {
        let delta = old_weight - new_weight;
        meta.total_weight = meta
            .total_weight
            .checked_sub(delta)
            .map_err(StdError::from)?;

        let mut k = id;
        while k <= meta.leaf_count {
            let value = node(storage, k)?
                .checked_sub(delta)
                .map_err(StdError::from)?;
            TREE_NODES.save(storage, k, &value)?;
            k += lowbit(k);
        }
    }

    LEAF_WEIGHTS.save(storage, id, &new_weight)?;
    TREE_META.save(storage, &meta)?;

    Ok(WeightUpdate {
        leaf_id: id,
        inserted: false,
        old_weight,
        new_weight,
    })
}

/// Sum of leaves `1..=id`.
pub fn prefix_sum(storage: &dyn Storage, id: u64) -> StdResult<Uint128> {
    let mut sum = Uint128::zero();
    let mut k = id;
    while k > 0 {
        sum += node(storage, k)?;
        k -= lowbit(k);
    }
    Ok(sum)
}

/// Leaf whose range contains `position`. Caller guarantees
/// `position < meta.total_weight`.
fn find_leaf(storage: &dyn Storage, meta: &TreeMeta, position: Uint128) -> StdResult<u64> {
    let mut base = 0u64;
    let mut remaining = position;
    let mut step = highest_power_of_two(meta.leaf_count);

    // Left subtree of the step is `base + step`; go right past it only when
    // the remaining position does not fall inside it.
    while step > 0 {
        let next = base + step;
        if next <= meta.leaf_count {
            let left = node(storage, next)?;
            if remaining >= left {
                base = next;
                remaining -= left;
            }
        }
        step >>= 1;
    }

    Ok(base + 1)
}

/// Resolve `position` in `[0, total_weight)` to the participant owning it.
pub fn draw(storage: &dyn Storage, position: Uint128) -> Result<Addr, ContractError> {
    let meta = load_meta(storage)?;
    if meta.total_weight.is_zero() {
        return Err(ContractError::EmptyIndex);
    }
    if position >= meta.total_weight {
        return Err(ContractError::PositionOutOfRange {
            position,
            total_weight: meta.total_weight,
        });
    }

    let id = find_leaf(storage, &meta, position)?;
    Ok(LEAF_OWNERS.load(storage, id)?)
}

/// Owner of a logical ticket id, or `None` past the end of the index.
pub fn owner_of(storage: &dyn Storage, ticket_id: Uint128) -> Result<Option<Addr>, ContractError> {
    if ticket_id >= total_weight(storage)? {
        return Ok(None);
    }
    draw(storage, ticket_id).map(Some)
}

/// Current contiguous ticket range `[start, end)` of `owner`.
pub fn ticket_range(storage: &dyn Storage, owner: &Addr) -> StdResult<Option<(Uint128, Uint128)>> {
    let Some(id) = LEAF_IDS.may_load(storage, owner)? else {
        return Ok(None);
    };
    let start = prefix_sum(storage, id - 1)?;
    let end = start + LEAF_WEIGHTS.load(storage, id)?;
    Ok(Some((start, end)))
}
