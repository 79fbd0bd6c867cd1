//! Value transfer out of the contract.
//!
//! Inline payouts never abort the surrounding operation: a recipient whose
//! transfer fails is credited a claimable balance instead, withdrawn later
//! through `claim`. Callers must commit round state before paying anyone.

use soroban_sdk::{log, token::TokenClient, Address, Env};

use crate::events::PayoutDeferred;
use crate::storage;
use crate::Error;

pub struct Payer<'a> {
    env: &'a Env,
    token: TokenClient<'a>,
}

impl<'a> Payer<'a> {
    pub fn new(env: &'a Env, token: &Address) -> Self {
        Self {
            env,
            token: TokenClient::new(env, token),
        }
    }

    /// Attempt one transfer. On failure the amount becomes claimable by
    /// `recipient` and `PayoutDeferred` is emitted; only an overflow of the
    /// claimable balance is an error.
    pub fn pay_or_defer(&self, round_id: u64, recipient: &Address, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Ok(());
        }

        let result = self
            .token
            .try_transfer(&self.env.current_contract_address(), recipient, &amount);
        if matches!(result, Ok(Ok(()))) {
            return Ok(());
        }

        log!(
            self.env,
            "transfer failed: recipient={}, amount={}",
            recipient.clone(),
            amount
        );
        credit_claimable(self.env, recipient, amount)?;
        PayoutDeferred {
            round_id,
            recipient: recipient.clone(),
            amount,
        }
        .publish(self.env);
        Ok(())
    }

    /// Transfer that must succeed; a failure aborts the invocation.
    pub fn pay(&self, recipient: &Address, amount: i128) -> Result<(), Error> {
        let result = self
            .token
            .try_transfer(&self.env.current_contract_address(), recipient, &amount);
        if matches!(result, Ok(Ok(()))) {
            Ok(())
        } else {
            Err(Error::TransferFailed)
        }
    }

    /// Pull `amount` from `from` into the contract. Aborts on failure.
    pub fn collect(&self, from: &Address, amount: i128) {
        self.token
            .transfer(from, &self.env.current_contract_address(), &amount);
    }
}

fn credit_claimable(env: &Env, recipient: &Address, amount: i128) -> Result<(), Error> {
    let owed = storage::get_claimable(env, recipient)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    storage::set_claimable(env, recipient, owed);
    Ok(())
}
