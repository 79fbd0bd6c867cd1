//! Notifications consumed by off-chain indexers. Every round-scoped event
//! carries `round_id` as its first topic so history, activity feeds and
//! participant lists can be rebuilt without contract reads.

use soroban_sdk::{contractevent, Address, BytesN, String};

use crate::types::{RoundConfig, RoundState};

#[contractevent]
pub struct Initialized {
    #[topic]
    pub publisher: Address,
    pub token: Address,
}

#[contractevent]
pub struct SparsitySet {
    #[topic]
    pub sparsity: Address,
}

#[contractevent]
pub struct OperatorUpdated {
    pub old_operator: Option<Address>,
    pub new_operator: Address,
}

#[contractevent]
pub struct ConfigUpdated {
    pub config: RoundConfig,
}

#[contractevent]
pub struct MinBetAmountUpdated {
    pub old_amount: i128,
    pub new_amount: i128,
}

#[contractevent]
pub struct RoundCreated {
    #[topic]
    pub round_id: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub min_draw_time: u64,
    pub max_draw_time: u64,
}

#[contractevent]
pub struct RoundStateChanged {
    #[topic]
    pub round_id: u64,
    pub old_state: RoundState,
    pub new_state: RoundState,
}

#[contractevent]
pub struct BetPlaced {
    #[topic]
    pub round_id: u64,
    #[topic]
    pub contributor: Address,
    pub amount: i128,
    pub new_total: i128,
    pub timestamp: u64,
}

#[contractevent]
pub struct EndTimeExtended {
    #[topic]
    pub round_id: u64,
    pub old_end_time: u64,
    pub new_end_time: u64,
}

#[contractevent]
pub struct RoundCompleted {
    #[topic]
    pub round_id: u64,
    pub winner: Address,
    pub total_pot: i128,
    pub winner_prize: i128,
    pub publisher_commission: i128,
    pub sparsity_commission: i128,
    pub random_seed: BytesN<32>,
}

#[contractevent]
pub struct RoundRefunded {
    #[topic]
    pub round_id: u64,
    pub total_refunded: i128,
    pub participant_count: u32,
    pub reason: String,
}

/// A payout that could not be delivered inline and is now claimable.
#[contractevent]
pub struct PayoutDeferred {
    #[topic]
    pub round_id: u64,
    #[topic]
    pub recipient: Address,
    pub amount: i128,
}

#[contractevent]
pub struct Claimed {
    #[topic]
    pub recipient: Address,
    pub amount: i128,
}
