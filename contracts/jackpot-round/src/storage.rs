use soroban_sdk::{Address, Env, IntoVal, Val, Vec};

use crate::types::{DataKey, Round, RoundConfig, Settlement};
use crate::Error;

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
/// Bumped on every write so ledger entries never expire mid-round.
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

pub fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Publisher) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

pub fn get_token(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotInitialized)
}

pub fn get_config(env: &Env) -> Result<RoundConfig, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn set_config(env: &Env, config: &RoundConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_round(env: &Env) -> Option<Round> {
    env.storage().instance().get(&DataKey::Round)
}

pub fn set_round(env: &Env, round: &Round) {
    env.storage().instance().set(&DataKey::Round, round);
    env.storage()
        .instance()
        .extend_ttl(PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

/// Hand out the next round id, starting at 1.
pub fn next_round_id(env: &Env) -> Result<u64, Error> {
    let id: u64 = env
        .storage()
        .instance()
        .get(&DataKey::NextRoundId)
        .unwrap_or(1);
    let following = id.checked_add(1).ok_or(Error::Overflow)?;
    env.storage().instance().set(&DataKey::NextRoundId, &following);
    Ok(id)
}

pub fn get_contribution(env: &Env, round_id: u64, who: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Contribution(round_id, who.clone()))
        .unwrap_or(0)
}

pub fn set_contribution(env: &Env, round_id: u64, who: &Address, amount: i128) {
    set_persistent(env, DataKey::Contribution(round_id, who.clone()), &amount);
}

pub fn remove_contribution(env: &Env, round_id: u64, who: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Contribution(round_id, who.clone()));
}

pub fn get_participants(env: &Env, round_id: u64) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Participants(round_id))
        .unwrap_or(Vec::new(env))
}

pub fn set_participants(env: &Env, round_id: u64, participants: &Vec<Address>) {
    set_persistent(env, DataKey::Participants(round_id), participants);
}

pub fn remove_participants(env: &Env, round_id: u64) {
    env.storage()
        .persistent()
        .remove(&DataKey::Participants(round_id));
}

pub fn get_claimable(env: &Env, who: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Claimable(who.clone()))
        .unwrap_or(0)
}

pub fn set_claimable(env: &Env, who: &Address, amount: i128) {
    let key = DataKey::Claimable(who.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        set_persistent(env, key, &amount);
    }
}

pub fn get_settlement(env: &Env, round_id: u64) -> Option<Settlement> {
    env.storage()
        .persistent()
        .get(&DataKey::Settlement(round_id))
}

pub fn set_settlement(env: &Env, round_id: u64, settlement: &Settlement) {
    set_persistent(env, DataKey::Settlement(round_id), settlement);
}

fn set_persistent<T>(env: &Env, key: DataKey, value: &T)
where
    T: IntoVal<Env, Val>,
{
    env.storage().persistent().set(&key, value);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}
