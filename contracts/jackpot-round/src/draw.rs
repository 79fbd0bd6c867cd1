//! Draw selector.
//!
//! The seed is `sha256(bet_history_hash || host_prng_u64 || round_id ||
//! ledger_sequence || timestamp)`. The bet history hash binds the seed to
//! every accepted bet; the host PRNG contributes per-invocation entropy the
//! caller cannot pick. The seed is published with the result so anyone can
//! replay the selection.
//!
//! The draw point is the first 16 seed bytes (big-endian) reduced modulo the
//! pot. Participants are walked in insertion order; the first whose running
//! sum exceeds the draw point wins, so a contribution `c` out of pot `T`
//! owns exactly `c` of the `T` possible points.

use soroban_sdk::{Address, Bytes, BytesN, Env, Vec};

use crate::types::Round;
use crate::Error;

pub fn derive_seed(env: &Env, round: &Round) -> BytesN<32> {
    let host_entropy: u64 = env.prng().gen();
    let mut preimage = Bytes::from_array(env, &round.bet_history_hash.to_array());
    preimage.extend_from_array(&host_entropy.to_be_bytes());
    preimage.extend_from_array(&round.round_id.to_be_bytes());
    preimage.extend_from_array(&env.ledger().sequence().to_be_bytes());
    preimage.extend_from_array(&env.ledger().timestamp().to_be_bytes());
    env.crypto().sha256(&preimage).into()
}

/// Map a seed onto `[0, total_pot)`.
pub fn draw_point(seed: &BytesN<32>, total_pot: i128) -> Result<i128, Error> {
    if total_pot <= 0 {
        return Err(Error::InsufficientParticipants);
    }
    let bytes = seed.to_array();
    let mut head = [0u8; 16];
    head.copy_from_slice(&bytes[..16]);
    let raw = u128::from_be_bytes(head);
    // total_pot > 0, so the remainder fits back into i128.
    Ok((raw % total_pot as u128) as i128)
}

/// Index of the weight whose cumulative range contains `point`.
pub fn pick_index<I>(weights: I, point: i128) -> Option<u32>
where
    I: IntoIterator<Item = i128>,
{
    let mut cumulative: i128 = 0;
    for (index, weight) in weights.into_iter().enumerate() {
        cumulative = cumulative.checked_add(weight)?;
        if point < cumulative {
            return Some(index as u32);
        }
    }
    None
}

/// Select the winner among ordered `(participant, contribution)` entries.
pub fn select_winner(entries: &Vec<(Address, i128)>, point: i128) -> Result<Address, Error> {
    let index = pick_index(entries.iter().map(|(_, amount)| amount), point)
        .ok_or(Error::InvalidState)?;
    entries
        .get(index)
        .map(|(winner, _)| winner)
        .ok_or(Error::InvalidState)
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{testutils::Address as _, Env};

    fn seed_for(env: &Env, trial: u64) -> BytesN<32> {
        env.crypto()
            .sha256(&Bytes::from_array(env, &trial.to_be_bytes()))
            .into()
    }

    #[test]
    fn test_every_point_maps_to_its_owner() {
        let weights = [1i128, 2, 7];
        let mut hits = [0u32; 3];
        for point in 0..10i128 {
            let idx = pick_index(weights, point).unwrap();
            hits[idx as usize] += 1;
        }
        assert_eq!(hits, [1, 2, 7]);
        assert_eq!(pick_index(weights, 10), None);
    }

    #[test]
    fn test_boundaries_between_participants() {
        let weights = [100_000i128, 200_000, 700_000];
        assert_eq!(pick_index(weights, 0), Some(0));
        assert_eq!(pick_index(weights, 99_999), Some(0));
        assert_eq!(pick_index(weights, 100_000), Some(1));
        assert_eq!(pick_index(weights, 299_999), Some(1));
        assert_eq!(pick_index(weights, 300_000), Some(2));
        assert_eq!(pick_index(weights, 999_999), Some(2));
    }

    #[test]
    fn test_draw_point_in_range() {
        let env = Env::default();
        for trial in 0..200u64 {
            let p = draw_point(&seed_for(&env, trial), 1_000_000).unwrap();
            assert!((0..1_000_000).contains(&p));
        }
        assert_eq!(
            draw_point(&seed_for(&env, 0), 0),
            Err(Error::InsufficientParticipants)
        );
    }

    #[test]
    fn test_weighted_frequency_converges() {
        let env = Env::default();
        let weights = [100_000i128, 200_000, 700_000];
        let total: i128 = weights.iter().sum();
        let trials = 4_000u64;

        let mut hits = [0u64; 3];
        for trial in 0..trials {
            let point = draw_point(&seed_for(&env, trial), total).unwrap();
            let idx = pick_index(weights, point).unwrap();
            hits[idx as usize] += 1;
        }

        // Expected 400 / 800 / 2800; allow a generous band.
        assert!((300..=500).contains(&hits[0]), "{:?}", hits);
        assert!((680..=920).contains(&hits[1]), "{:?}", hits);
        assert!((2_650..=2_950).contains(&hits[2]), "{:?}", hits);
    }

    #[test]
    fn test_select_winner_over_entries() {
        let env = Env::default();
        let a = Address::generate(&env);
        let b = Address::generate(&env);
        let mut entries = Vec::new(&env);
        entries.push_back((a.clone(), 3i128));
        entries.push_back((b.clone(), 5i128));

        assert_eq!(select_winner(&entries, 2).unwrap(), a);
        assert_eq!(select_winner(&entries, 3).unwrap(), b);
        assert_eq!(select_winner(&entries, 8), Err(Error::InvalidState));
    }
}
