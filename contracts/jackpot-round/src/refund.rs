//! Refund handler shared by the operator abort and the public expired-round
//! refund.

use soroban_sdk::{Env, String};

use crate::events::RoundRefunded;
use crate::lifecycle::transition;
use crate::payout::Payer;
use crate::types::{Round, RoundState};
use crate::{ledger, storage, Error};

/// Return every contribution of `round` and mark it `Refunded`.
///
/// The ledger is cleared and the terminal state persisted before the first
/// transfer. A failing recipient is left with a claimable balance; the
/// remaining participants are still paid.
pub fn refund_all(env: &Env, mut round: Round, reason: String) -> Result<Round, Error> {
    let token = storage::get_token(env)?;

    let entries = ledger::clear(env, round.round_id);
    let mut total_refunded: i128 = 0;
    for (_, amount) in entries.iter() {
        total_refunded = total_refunded.checked_add(amount).ok_or(Error::Overflow)?;
    }

    round.total_pot = 0;
    transition(env, &mut round, RoundState::Refunded);
    storage::set_round(env, &round);

    let payer = Payer::new(env, &token);
    for (participant, amount) in entries.iter() {
        payer.pay_or_defer(round.round_id, &participant, amount)?;
    }

    RoundRefunded {
        round_id: round.round_id,
        total_refunded,
        participant_count: round.participant_count,
        reason,
    }
    .publish(env);

    Ok(round)
}
