//! Jackpot Round Contract
//!
//! Runs a recurring weighted jackpot. Players deposit SEP-41 tokens during a
//! betting window; after the window closes the operator draws one winner
//! with probability proportional to their contribution, and the pot is split
//! between the winner and two fixed-rate commission recipients. If nobody
//! draws before the draw window lapses, anyone may trigger a full refund.
//!
//! ## Roles
//! - `publisher`: set at `init`, immutable. Sets `sparsity` once.
//! - `sparsity`: manages the operator and the round configuration.
//! - `operator`: opens rounds, extends betting, draws, aborts with refund.
//!
//! ## Entry point discipline
//! Role gate, then timing guard, then the ledger / draw / refund step, then
//! the state commit, then transfers, then events. Any `Err` rolls back the
//! whole invocation. Transfers out of the contract happen only after the
//! terminal state is stored, and a failed payout becomes a claimable balance
//! instead of aborting the fan-out.
//!
//! ## Storage Strategy
//! - `instance()`: roles, token, configuration, the current round and the
//!   round id counter.
//! - `persistent()`: per-round contributions and participant lists, and
//!   claimable balances. TTL is bumped on every write.
#![no_std]
#![allow(unexpected_cfgs)]

mod draw;
mod events;
mod ledger;
mod lifecycle;
mod payout;
mod refund;
mod roles;
mod storage;
mod timing;
mod types;

use soroban_sdk::{contract, contracterror, contractimpl, log, Address, Env, String, Vec};

use events::{
    BetPlaced, Claimed, ConfigUpdated, EndTimeExtended, Initialized, MinBetAmountUpdated,
    OperatorUpdated, SparsitySet,
};
use payout::Payer;
use roles::{authorize, Operation};
use storage::require_initialized;

pub use storage::PERSISTENT_BUMP_LEDGERS;
pub use types::{Round, RoundConfig, RoundState, Roles, Settlement};

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized       = 1,
    NotInitialized           = 2,
    /// Caller holds none of the roles the operation requires.
    Unauthorized             = 3,
    /// Operation not valid in the current lifecycle state.
    InvalidState             = 4,
    /// A timing bound (betting, draw or refund window) was not met.
    WindowNotOpen            = 5,
    BelowMinimumBet          = 6,
    InsufficientParticipants = 7,
    /// One-time role assignment attempted twice.
    AlreadySet               = 8,
    TransferFailed           = 9,
    InvalidConfig            = 10,
    InvalidAmount            = 11,
    EmptyReason              = 12,
    RoundNotFound            = 13,
    NothingToClaim           = 14,
    Overflow                 = 15,
}

impl From<shared::MathError> for Error {
    fn from(err: shared::MathError) -> Self {
        match err {
            shared::MathError::InvalidAmount => Error::InvalidAmount,
            shared::MathError::InvalidRate => Error::InvalidConfig,
            shared::MathError::Overflow => Error::Overflow,
        }
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct JackpotRound;

#[contractimpl]
impl JackpotRound {
    // -----------------------------------------------------------------------
    // init
    // -----------------------------------------------------------------------

    /// Initialize the contract. May only be called once.
    ///
    /// `token` must be a deployed SEP-41 contract; every bet, payout and
    /// refund moves that token.
    pub fn init(env: Env, publisher: Address, token: Address, config: RoundConfig) -> Result<(), Error> {
        if env.storage().instance().has(&types::DataKey::Publisher) {
            return Err(Error::AlreadyInitialized);
        }

        publisher.require_auth();
        config.validate()?;

        env.storage().instance().set(&types::DataKey::Publisher, &publisher);
        env.storage().instance().set(&types::DataKey::Token, &token);
        storage::set_config(&env, &config);
        env.storage()
            .instance()
            .extend_ttl(PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);

        Initialized { publisher, token }.publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // role management
    // -----------------------------------------------------------------------

    /// Fix the sparsity address. Publisher only, succeeds exactly once.
    pub fn set_sparsity(env: Env, caller: Address, sparsity: Address) -> Result<(), Error> {
        require_initialized(&env)?;
        authorize(&env, &caller, Operation::SetSparsity)?;

        roles::set_sparsity(&env, &sparsity)?;

        SparsitySet { sparsity }.publish(&env);
        Ok(())
    }

    /// Replace the operator. Sparsity only, any number of times.
    pub fn update_operator(env: Env, caller: Address, operator: Address) -> Result<(), Error> {
        require_initialized(&env)?;
        authorize(&env, &caller, Operation::UpdateOperator)?;

        let old_operator = roles::replace_operator(&env, &operator);

        OperatorUpdated {
            old_operator,
            new_operator: operator,
        }
        .publish(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // configuration
    // -----------------------------------------------------------------------

    /// Replace the whole round configuration. Sparsity only, and only while
    /// no round is open so an active round keeps the terms it started with.
    pub fn update_config(env: Env, caller: Address, config: RoundConfig) -> Result<(), Error> {
        require_initialized(&env)?;
        authorize(&env, &caller, Operation::UpdateConfig)?;

        if let Some(round) = storage::get_round(&env) {
            if !round.state.is_terminal() {
                return Err(Error::InvalidState);
            }
        }
        config.validate()?;

        storage::set_config(&env, &config);
        ConfigUpdated { config }.publish(&env);
        Ok(())
    }

    /// Change the minimum bet. Sparsity or operator.
    pub fn update_min_bet_amount(env: Env, caller: Address, amount: i128) -> Result<(), Error> {
        require_initialized(&env)?;
        authorize(&env, &caller, Operation::UpdateMinBetAmount)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let mut config = storage::get_config(&env)?;
        let old_amount = config.min_bet_amount;
        config.min_bet_amount = amount;
        storage::set_config(&env, &config);

        MinBetAmountUpdated {
            old_amount,
            new_amount: amount,
        }
        .publish(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // start_new_round
    // -----------------------------------------------------------------------

    /// Open a new round in `Betting`. Operator only; fails with
    /// `InvalidState` while another round is still open.
    pub fn start_new_round(env: Env, caller: Address) -> Result<u64, Error> {
        require_initialized(&env)?;
        authorize(&env, &caller, Operation::StartNewRound)?;

        let config = storage::get_config(&env)?;
        let round = lifecycle::open_round(&env, &config, env.ledger().timestamp())?;
        Ok(round.round_id)
    }

    // -----------------------------------------------------------------------
    // place_bet
    // -----------------------------------------------------------------------

    /// Add `amount` to `contributor`'s stake in the open round.
    ///
    /// A bet landing within `min_end_time_extension` of the end time pushes
    /// the end time out by that extension.
    pub fn place_bet(env: Env, contributor: Address, amount: i128) -> Result<(), Error> {
        require_initialized(&env)?;
        authorize(&env, &contributor, Operation::PlaceBet)?;

        let now = env.ledger().timestamp();
        let mut round = match storage::get_round(&env) {
            Some(round) if timing::betting_open(&round, now) => round,
            Some(round) => {
                log!(&env, "window not open: now={}, end_time={}", now, round.end_time);
                return Err(Error::WindowNotOpen);
            }
            None => return Err(Error::WindowNotOpen),
        };

        let config = storage::get_config(&env)?;
        if amount < config.min_bet_amount {
            log!(&env, "below minimum bet: amount={}, min={}", amount, config.min_bet_amount);
            return Err(Error::BelowMinimumBet);
        }

        ledger::record_bet(&env, &mut round, &contributor, amount, now)?;

        let extension = if timing::in_extension_window(&round, now, &config) {
            let new_end_time = timing::min_extended_end(&round, &config)?;
            let old_end_time = timing::apply_end_time(&mut round, new_end_time, &config)?;
            Some((old_end_time, new_end_time))
        } else {
            None
        };
        storage::set_round(&env, &round);

        let token = storage::get_token(&env)?;
        Payer::new(&env, &token).collect(&contributor, amount);

        BetPlaced {
            round_id: round.round_id,
            contributor,
            amount,
            new_total: round.total_pot,
            timestamp: now,
        }
        .publish(&env);

        if let Some((old_end_time, new_end_time)) = extension {
            EndTimeExtended {
                round_id: round.round_id,
                old_end_time,
                new_end_time,
            }
            .publish(&env);
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // extend_betting_time
    // -----------------------------------------------------------------------

    /// Move the end of the betting window to `new_end_time`. Operator only,
    /// and only while betting is still open: a round whose betting window
    /// has closed keeps its draw and refund deadlines.
    /// `new_end_time` must be at least `end_time + min_end_time_extension`.
    pub fn extend_betting_time(env: Env, caller: Address, new_end_time: u64) -> Result<(), Error> {
        require_initialized(&env)?;
        authorize(&env, &caller, Operation::ExtendBettingTime)?;

        let mut round = active_betting_round(&env)?;
        let config = storage::get_config(&env)?;

        let now = env.ledger().timestamp();
        if !timing::betting_open(&round, now) {
            log!(&env, "window not open: now={}, end_time={}", now, round.end_time);
            return Err(Error::WindowNotOpen);
        }

        let earliest = timing::min_extended_end(&round, &config)?;
        if new_end_time < earliest {
            log!(&env, "window not open: new_end_time={}, earliest={}", new_end_time, earliest);
            return Err(Error::WindowNotOpen);
        }

        let old_end_time = timing::apply_end_time(&mut round, new_end_time, &config)?;
        storage::set_round(&env, &round);

        EndTimeExtended {
            round_id: round.round_id,
            old_end_time,
            new_end_time,
        }
        .publish(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // draw_winner
    // -----------------------------------------------------------------------

    /// Draw the winner of the open round and distribute the pot. Operator
    /// only, inside the draw window, with enough participants.
    pub fn draw_winner(env: Env, caller: Address) -> Result<Address, Error> {
        require_initialized(&env)?;
        authorize(&env, &caller, Operation::DrawWinner)?;

        let round = storage::get_round(&env).ok_or(Error::InvalidState)?;
        let config = storage::get_config(&env)?;
        timing::require_draw(&env, &round, &config)?;

        let settlement = lifecycle::settle(&env, round, &config)?;
        Ok(settlement.winner)
    }

    // -----------------------------------------------------------------------
    // refunds
    // -----------------------------------------------------------------------

    /// Abort the open round and refund every participant. Operator only.
    pub fn refund_round(env: Env, caller: Address, reason: String) -> Result<(), Error> {
        require_initialized(&env)?;
        authorize(&env, &caller, Operation::RefundRound)?;

        if reason.is_empty() {
            return Err(Error::EmptyReason);
        }

        let round = active_betting_round(&env)?;
        refund::refund_all(&env, round, reason)?;
        Ok(())
    }

    /// Refund a round whose draw window lapsed without a draw.
    /// Anyone can call this, no auth needed.
    pub fn refund_expired_round(env: Env) -> Result<(), Error> {
        require_initialized(&env)?;

        let round = active_betting_round(&env)?;
        let now = env.ledger().timestamp();
        if !timing::can_refund_expired(&round, now) {
            log!(&env, "window not open: now={}, max_draw_time={}", now, round.max_draw_time);
            return Err(Error::WindowNotOpen);
        }

        let reason = String::from_str(&env, "draw window expired");
        refund::refund_all(&env, round, reason)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // claim
    // -----------------------------------------------------------------------

    /// Withdraw a balance left behind by a failed payout or refund.
    pub fn claim(env: Env, claimant: Address) -> Result<i128, Error> {
        require_initialized(&env)?;
        authorize(&env, &claimant, Operation::Claim)?;

        let owed = storage::get_claimable(&env, &claimant);
        if owed <= 0 {
            return Err(Error::NothingToClaim);
        }

        storage::set_claimable(&env, &claimant, 0);
        let token = storage::get_token(&env)?;
        Payer::new(&env, &token).pay(&claimant, owed)?;

        Claimed {
            recipient: claimant,
            amount: owed,
        }
        .publish(&env);
        Ok(owed)
    }

    // -----------------------------------------------------------------------
    // queries
    // -----------------------------------------------------------------------

    /// Snapshot of the current (or most recently finished) round.
    pub fn get_round(env: Env) -> Result<Round, Error> {
        require_initialized(&env)?;
        storage::get_round(&env).ok_or(Error::RoundNotFound)
    }

    /// Draw outcome of a completed round, including the published seed.
    pub fn get_settlement(env: Env, round_id: u64) -> Result<Settlement, Error> {
        require_initialized(&env)?;
        storage::get_settlement(&env, round_id).ok_or(Error::RoundNotFound)
    }

    pub fn get_state(env: Env) -> RoundState {
        lifecycle::current_state(&env)
    }

    pub fn get_config(env: Env) -> Result<RoundConfig, Error> {
        require_initialized(&env)?;
        storage::get_config(&env)
    }

    pub fn get_roles(env: Env) -> Result<Roles, Error> {
        roles::get_roles(&env)
    }

    /// Cumulative contribution of `who` in the current round.
    pub fn get_contribution(env: Env, who: Address) -> i128 {
        match storage::get_round(&env) {
            Some(round) => storage::get_contribution(&env, round.round_id, &who),
            None => 0,
        }
    }

    /// Participants of the current round in the order they first bet.
    pub fn get_participants(env: Env) -> Vec<Address> {
        match storage::get_round(&env) {
            Some(round) => storage::get_participants(&env, round.round_id),
            None => Vec::new(&env),
        }
    }

    pub fn can_draw(env: Env) -> bool {
        match (storage::get_round(&env), storage::get_config(&env)) {
            (Some(round), Ok(config)) => {
                timing::can_draw(&round, env.ledger().timestamp(), &config)
            }
            _ => false,
        }
    }

    pub fn can_refund_expired(env: Env) -> bool {
        storage::get_round(&env)
            .map(|round| timing::can_refund_expired(&round, env.ledger().timestamp()))
            .unwrap_or(false)
    }

    pub fn get_claimable(env: Env, who: Address) -> i128 {
        storage::get_claimable(&env, &who)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// The stored round, provided it is still in `Betting`.
fn active_betting_round(env: &Env) -> Result<Round, Error> {
    let round = storage::get_round(env).ok_or(Error::InvalidState)?;
    if round.state != RoundState::Betting {
        return Err(Error::InvalidState);
    }
    Ok(round)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
