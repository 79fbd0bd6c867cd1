//! Timing guard: window arithmetic and the draw / expired-refund predicates.
//!
//! All bounds are exact:
//! - betting is open while `now < end_time`
//! - drawing is allowed for `min_draw_time <= now <= max_draw_time`
//! - the public refund opens once `now > max_draw_time`

use soroban_sdk::{log, Env};

use crate::types::{Round, RoundConfig, RoundState};
use crate::Error;

/// Draw window `(min_draw_time, max_draw_time)` for a given end time.
pub fn draw_window(end_time: u64, config: &RoundConfig) -> Result<(u64, u64), Error> {
    let min_draw_time = end_time
        .checked_add(config.min_draw_delay_after_end)
        .ok_or(Error::Overflow)?;
    let max_draw_time = end_time
        .checked_add(config.max_draw_delay_after_end)
        .ok_or(Error::Overflow)?;
    Ok((min_draw_time, max_draw_time))
}

/// Move `round.end_time` to `new_end_time` and recompute the draw window.
/// Returns the previous end time.
pub fn apply_end_time(
    round: &mut Round,
    new_end_time: u64,
    config: &RoundConfig,
) -> Result<u64, Error> {
    let (min_draw_time, max_draw_time) = draw_window(new_end_time, config)?;
    let old = round.end_time;
    round.end_time = new_end_time;
    round.min_draw_time = min_draw_time;
    round.max_draw_time = max_draw_time;
    Ok(old)
}

/// Earliest end time an extension may set.
pub fn min_extended_end(round: &Round, config: &RoundConfig) -> Result<u64, Error> {
    round
        .end_time
        .checked_add(config.min_end_time_extension)
        .ok_or(Error::Overflow)
}

/// Whether a bet placed at `now` falls inside the anti-sniping window.
pub fn in_extension_window(round: &Round, now: u64, config: &RoundConfig) -> bool {
    config.min_end_time_extension > 0
        && now < round.end_time
        && round.end_time - now <= config.min_end_time_extension
}

pub fn betting_open(round: &Round, now: u64) -> bool {
    round.state == RoundState::Betting && now < round.end_time
}

pub fn can_draw(round: &Round, now: u64, config: &RoundConfig) -> bool {
    check_draw(round, now, config).is_ok()
}

/// Full draw-eligibility check with the specific failure kind.
pub fn check_draw(round: &Round, now: u64, config: &RoundConfig) -> Result<(), Error> {
    if round.state != RoundState::Betting {
        return Err(Error::InvalidState);
    }
    if now < round.min_draw_time || now > round.max_draw_time {
        return Err(Error::WindowNotOpen);
    }
    if round.total_pot <= 0 || round.participant_count < config.min_participants {
        return Err(Error::InsufficientParticipants);
    }
    Ok(())
}

pub fn can_refund_expired(round: &Round, now: u64) -> bool {
    round.state == RoundState::Betting && now > round.max_draw_time
}

/// `check_draw` plus a diagnostic log line naming the failed bound.
pub fn require_draw(env: &Env, round: &Round, config: &RoundConfig) -> Result<(), Error> {
    let now = env.ledger().timestamp();
    let result = check_draw(round, now, config);
    match result {
        Err(Error::WindowNotOpen) => log!(
            env,
            "window not open: now={}, min_draw_time={}, max_draw_time={}",
            now,
            round.min_draw_time,
            round.max_draw_time
        ),
        Err(Error::InsufficientParticipants) => log!(
            env,
            "insufficient participants: count={}, required={}",
            round.participant_count,
            config.min_participants
        ),
        _ => {}
    }
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{BytesN, Env};

    fn config() -> RoundConfig {
        RoundConfig {
            publisher_commission_bps: 200,
            sparsity_commission_bps: 300,
            min_bet_amount: 100,
            betting_duration: 1_800,
            min_draw_delay_after_end: 60,
            max_draw_delay_after_end: 600,
            min_end_time_extension: 120,
            min_participants: 2,
        }
    }

    fn round(env: &Env) -> Round {
        Round {
            round_id: 1,
            start_time: 1_000,
            end_time: 2_800,
            min_draw_time: 2_860,
            max_draw_time: 3_400,
            total_pot: 500,
            participant_count: 2,
            state: RoundState::Betting,
            bet_history_hash: BytesN::from_array(env, &[0u8; 32]),
        }
    }

    #[test]
    fn test_draw_window_bounds_are_inclusive() {
        let env = Env::default();
        let r = round(&env);
        let cfg = config();

        assert_eq!(check_draw(&r, 2_859, &cfg), Err(Error::WindowNotOpen));
        assert_eq!(check_draw(&r, 2_860, &cfg), Ok(()));
        assert_eq!(check_draw(&r, 3_400, &cfg), Ok(()));
        assert_eq!(check_draw(&r, 3_401, &cfg), Err(Error::WindowNotOpen));
    }

    #[test]
    fn test_expired_refund_opens_strictly_after_max_draw_time() {
        let env = Env::default();
        let r = round(&env);

        assert!(!can_refund_expired(&r, 3_400));
        assert!(can_refund_expired(&r, 3_401));
    }

    #[test]
    fn test_no_gap_between_draw_and_expired_refund() {
        let env = Env::default();
        let r = round(&env);
        let cfg = config();

        for now in 2_860..=3_500u64 {
            assert!(can_draw(&r, now, &cfg) != can_refund_expired(&r, now));
        }
    }

    #[test]
    fn test_betting_closes_at_end_time() {
        let env = Env::default();
        let r = round(&env);

        assert!(betting_open(&r, 2_799));
        assert!(!betting_open(&r, 2_800));
    }

    #[test]
    fn test_draw_needs_participants_and_pot() {
        let env = Env::default();
        let cfg = config();
        let mut r = round(&env);

        r.participant_count = 1;
        assert_eq!(check_draw(&r, 3_000, &cfg), Err(Error::InsufficientParticipants));

        r.participant_count = 2;
        r.total_pot = 0;
        assert_eq!(check_draw(&r, 3_000, &cfg), Err(Error::InsufficientParticipants));
    }

    #[test]
    fn test_draw_rejects_non_betting_state() {
        let env = Env::default();
        let cfg = config();
        let mut r = round(&env);

        for state in [RoundState::Drawing, RoundState::Completed, RoundState::Refunded] {
            r.state = state;
            assert_eq!(check_draw(&r, 3_000, &cfg), Err(Error::InvalidState));
            assert!(!can_refund_expired(&r, 10_000));
        }
    }

    #[test]
    fn test_extension_window_and_recompute() {
        let env = Env::default();
        let cfg = config();
        let mut r = round(&env);

        assert!(!in_extension_window(&r, 2_679, &cfg));
        assert!(in_extension_window(&r, 2_680, &cfg));
        assert!(in_extension_window(&r, 2_799, &cfg));
        assert!(!in_extension_window(&r, 2_800, &cfg));

        let target = min_extended_end(&r, &cfg).unwrap();
        assert_eq!(target, 2_920);
        let old = apply_end_time(&mut r, target, &cfg).unwrap();
        assert_eq!(old, 2_800);
        assert_eq!(r.min_draw_time, 2_980);
        assert_eq!(r.max_draw_time, 3_520);
    }
}
