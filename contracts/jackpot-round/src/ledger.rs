//! Round ledger: per-participant contributions and the running pot.
//!
//! `total_pot` on the round always equals the sum of the `Contribution`
//! entries for that round id.

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, Vec};

use crate::storage;
use crate::types::Round;
use crate::Error;

/// Credit `amount` to `contributor` in `round`. The caller persists the
/// round afterwards; ledger entries are written here.
pub fn record_bet(
    env: &Env,
    round: &mut Round,
    contributor: &Address,
    amount: i128,
    now: u64,
) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }

    let previous = storage::get_contribution(env, round.round_id, contributor);
    if previous == 0 {
        let mut participants = storage::get_participants(env, round.round_id);
        participants.push_back(contributor.clone());
        storage::set_participants(env, round.round_id, &participants);
        round.participant_count = round
            .participant_count
            .checked_add(1)
            .ok_or(Error::Overflow)?;
    }

    let updated = previous.checked_add(amount).ok_or(Error::Overflow)?;
    storage::set_contribution(env, round.round_id, contributor, updated);

    round.total_pot = round.total_pot.checked_add(amount).ok_or(Error::Overflow)?;
    round.bet_history_hash = chain_bet_hash(env, &round.bet_history_hash, contributor, amount, now);

    Ok(())
}

/// Ordered `(participant, contribution)` pairs for a round.
pub fn entries(env: &Env, round_id: u64) -> Vec<(Address, i128)> {
    let mut out = Vec::new(env);
    for participant in storage::get_participants(env, round_id).iter() {
        let amount = storage::get_contribution(env, round_id, &participant);
        out.push_back((participant, amount));
    }
    out
}

/// Drop every ledger entry of a round. Returns the pairs that were removed,
/// in insertion order.
pub fn clear(env: &Env, round_id: u64) -> Vec<(Address, i128)> {
    let removed = entries(env, round_id);
    for (participant, _) in removed.iter() {
        storage::remove_contribution(env, round_id, &participant);
    }
    storage::remove_participants(env, round_id);
    removed
}

/// `sha256(prev || xdr(contributor) || amount_be || now_be)`
fn chain_bet_hash(
    env: &Env,
    prev: &BytesN<32>,
    contributor: &Address,
    amount: i128,
    now: u64,
) -> BytesN<32> {
    let mut preimage = Bytes::from_array(env, &prev.to_array());
    preimage.append(&contributor.clone().to_xdr(env));
    preimage.extend_from_array(&amount.to_be_bytes());
    preimage.extend_from_array(&now.to_be_bytes());
    env.crypto().sha256(&preimage).into()
}
