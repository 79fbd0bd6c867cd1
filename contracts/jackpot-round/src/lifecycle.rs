//! Round state machine.
//!
//! ```text
//! Waiting -> Betting -> Drawing -> Completed
//!               \
//!                `-> Refunded
//! ```
//!
//! Every transition goes through [`transition`], which emits
//! `RoundStateChanged`. `Drawing` only exists inside a single `draw_winner`
//! invocation.

use soroban_sdk::{Address, BytesN, Env};

use crate::events::{RoundCompleted, RoundCreated, RoundStateChanged};
use crate::payout::Payer;
use crate::roles::get_roles;
use crate::types::{Round, RoundConfig, RoundState, Settlement};
use crate::{draw, ledger, storage, timing, Error};

pub fn transition(env: &Env, round: &mut Round, new_state: RoundState) {
    let old_state = round.state;
    round.state = new_state;
    RoundStateChanged {
        round_id: round.round_id,
        old_state,
        new_state,
    }
    .publish(env);
}

/// State reported for the current slot: the stored round's state, or
/// `Waiting` when no round was ever opened.
pub fn current_state(env: &Env) -> RoundState {
    storage::get_round(env)
        .map(|round| round.state)
        .unwrap_or(RoundState::Waiting)
}

/// Open a fresh round at `now`. The previous round, if any, must be terminal.
pub fn open_round(env: &Env, config: &RoundConfig, now: u64) -> Result<Round, Error> {
    if let Some(previous) = storage::get_round(env) {
        if !previous.state.is_terminal() {
            return Err(Error::InvalidState);
        }
        ledger::clear(env, previous.round_id);
    }

    let round_id = storage::next_round_id(env)?;
    let end_time = now
        .checked_add(config.betting_duration)
        .ok_or(Error::Overflow)?;
    let (min_draw_time, max_draw_time) = timing::draw_window(end_time, config)?;

    let mut round = Round {
        round_id,
        start_time: now,
        end_time,
        min_draw_time,
        max_draw_time,
        total_pot: 0,
        participant_count: 0,
        state: RoundState::Waiting,
        bet_history_hash: BytesN::from_array(env, &[0u8; 32]),
    };

    RoundCreated {
        round_id,
        start_time: now,
        end_time,
        min_draw_time,
        max_draw_time,
    }
    .publish(env);
    transition(env, &mut round, RoundState::Betting);
    storage::set_round(env, &round);

    Ok(round)
}

/// Pick the winner of an eligible round, split the pot and pay out.
///
/// The settlement and `Completed` state are stored before any transfer.
pub fn settle(env: &Env, mut round: Round, config: &RoundConfig) -> Result<Settlement, Error> {
    let roles = get_roles(env)?;
    let sparsity: Address = roles.sparsity.ok_or(Error::InvalidState)?;
    let token = storage::get_token(env)?;

    transition(env, &mut round, RoundState::Drawing);
    storage::set_round(env, &round);

    let random_seed = draw::derive_seed(env, &round);
    let point = draw::draw_point(&random_seed, round.total_pot)?;
    let entries = ledger::entries(env, round.round_id);
    let winner = draw::select_winner(&entries, point)?;

    let split = shared::split_pot(
        round.total_pot,
        config.publisher_commission_bps,
        config.sparsity_commission_bps,
    )?;

    let settlement = Settlement {
        winner: winner.clone(),
        winner_prize: split.winner_prize,
        publisher_commission: split.publisher_commission,
        sparsity_commission: split.sparsity_commission,
        random_seed: random_seed.clone(),
    };
    storage::set_settlement(env, round.round_id, &settlement);
    transition(env, &mut round, RoundState::Completed);
    storage::set_round(env, &round);

    let payer = Payer::new(env, &token);
    payer.pay_or_defer(round.round_id, &settlement.winner, split.winner_prize)?;
    payer.pay_or_defer(round.round_id, &roles.publisher, split.publisher_commission)?;
    payer.pay_or_defer(round.round_id, &sparsity, split.sparsity_commission)?;

    RoundCompleted {
        round_id: round.round_id,
        winner,
        total_pot: round.total_pot,
        winner_prize: split.winner_prize,
        publisher_commission: split.publisher_commission,
        sparsity_commission: split.sparsity_commission,
        random_seed,
    }
    .publish(env);

    Ok(settlement)
}
