use soroban_sdk::{contracttype, Address, BytesN};

/// Lifecycle of a round. `Waiting` is only ever reported, never stored:
/// it means "no round is open right now".
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RoundState {
    Waiting = 0,
    Betting = 1,
    Drawing = 2,
    Completed = 3,
    Refunded = 4,
}

impl RoundState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RoundState::Completed | RoundState::Refunded)
    }
}

/// Process-wide round parameters. Times are in ledger seconds, rates in
/// basis points.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundConfig {
    pub publisher_commission_bps: u32,
    pub sparsity_commission_bps: u32,
    pub min_bet_amount: i128,
    pub betting_duration: u64,
    pub min_draw_delay_after_end: u64,
    pub max_draw_delay_after_end: u64,
    pub min_end_time_extension: u64,
    pub min_participants: u32,
}

/// Outcome of a completed round. Written once per round id, together with
/// the transition to `Completed`, and kept for auditing.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub winner: Address,
    pub winner_prize: i128,
    pub publisher_commission: i128,
    pub sparsity_commission: i128,
    pub random_seed: BytesN<32>,
}

/// The single active (or most recently finished) round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Round {
    pub round_id: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub min_draw_time: u64,
    pub max_draw_time: u64,
    pub total_pot: i128,
    pub participant_count: u32,
    pub state: RoundState,
    /// Running hash over every accepted bet; salts the draw seed.
    pub bet_history_hash: BytesN<32>,
}

/// Current holders of the three privileged roles.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Roles {
    pub publisher: Address,
    pub sparsity: Option<Address>,
    pub operator: Option<Address>,
}

/// Storage keys.
///
/// Instance keys (Publisher .. NextRoundId, Round): contract config and the
/// current round, one ledger entry.
/// Persistent keys: per-round ledger entries, settlements and pull-payment
/// balances.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() ---
    Publisher,
    Sparsity,
    Operator,
    Token,
    Config,
    Round,
    NextRoundId,
    // --- persistent() ---
    /// Cumulative contribution of one address in one round.
    Contribution(u64, Address),
    /// Insertion-ordered participant list of one round.
    Participants(u64),
    /// Amount owed to an address whose inline payout failed.
    Claimable(Address),
    /// Draw outcome of a completed round.
    Settlement(u64),
}

impl RoundConfig {
    /// Reject parameter sets that would break window ordering or the
    /// commission split.
    pub fn validate(&self) -> Result<(), crate::Error> {
        shared::validate_rates(self.publisher_commission_bps, self.sparsity_commission_bps)?;
        if self.min_bet_amount <= 0
            || self.betting_duration == 0
            || self.min_draw_delay_after_end > self.max_draw_delay_after_end
            || self.min_participants == 0
        {
            return Err(crate::Error::InvalidConfig);
        }
        Ok(())
    }
}
