//! Role gate.
//!
//! Each mutating entry point names an [`Operation`]; [`allowed_roles`] is the
//! capability table mapping it to the roles that may invoke it. A caller is
//! admitted when it has signed the invocation and holds at least one of
//! those roles.

use soroban_sdk::{log, Address, Env};

use crate::types::{DataKey, Roles};
use crate::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Publisher,
    Sparsity,
    Operator,
    Anyone,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    SetSparsity,
    UpdateOperator,
    UpdateConfig,
    UpdateMinBetAmount,
    StartNewRound,
    ExtendBettingTime,
    DrawWinner,
    RefundRound,
    PlaceBet,
    Claim,
}

pub fn allowed_roles(op: Operation) -> &'static [Role] {
    match op {
        Operation::SetSparsity => &[Role::Publisher],
        Operation::UpdateOperator | Operation::UpdateConfig => &[Role::Sparsity],
        Operation::UpdateMinBetAmount => &[Role::Sparsity, Role::Operator],
        Operation::StartNewRound
        | Operation::ExtendBettingTime
        | Operation::DrawWinner
        | Operation::RefundRound => &[Role::Operator],
        Operation::PlaceBet | Operation::Claim => &[Role::Anyone],
    }
}

/// Verify that `caller` signed the invocation and may perform `op`.
pub fn authorize(env: &Env, caller: &Address, op: Operation) -> Result<(), Error> {
    caller.require_auth();

    let roles = get_roles(env)?;
    if allowed_roles(op)
        .iter()
        .any(|role| holds_role(&roles, caller, *role))
    {
        return Ok(());
    }

    log!(env, "unauthorized: caller={}", caller.clone());
    Err(Error::Unauthorized)
}

fn holds_role(roles: &Roles, caller: &Address, role: Role) -> bool {
    match role {
        Role::Anyone => true,
        Role::Publisher => &roles.publisher == caller,
        Role::Sparsity => roles.sparsity.as_ref() == Some(caller),
        Role::Operator => roles.operator.as_ref() == Some(caller),
    }
}

pub fn get_roles(env: &Env) -> Result<Roles, Error> {
    let publisher: Address = env
        .storage()
        .instance()
        .get(&DataKey::Publisher)
        .ok_or(Error::NotInitialized)?;
    Ok(Roles {
        publisher,
        sparsity: env.storage().instance().get(&DataKey::Sparsity),
        operator: env.storage().instance().get(&DataKey::Operator),
    })
}

/// Fix the sparsity address. Succeeds exactly once.
pub fn set_sparsity(env: &Env, sparsity: &Address) -> Result<(), Error> {
    if env.storage().instance().has(&DataKey::Sparsity) {
        return Err(Error::AlreadySet);
    }
    env.storage().instance().set(&DataKey::Sparsity, sparsity);
    Ok(())
}

/// Replace the operator, returning the previous holder.
pub fn replace_operator(env: &Env, operator: &Address) -> Option<Address> {
    let old: Option<Address> = env.storage().instance().get(&DataKey::Operator);
    env.storage().instance().set(&DataKey::Operator, operator);
    old
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_capability_table() {
        assert_eq!(allowed_roles(Operation::SetSparsity), &[Role::Publisher]);
        assert_eq!(allowed_roles(Operation::UpdateOperator), &[Role::Sparsity]);
        assert_eq!(
            allowed_roles(Operation::UpdateMinBetAmount),
            &[Role::Sparsity, Role::Operator]
        );
        assert_eq!(allowed_roles(Operation::DrawWinner), &[Role::Operator]);
        assert_eq!(allowed_roles(Operation::PlaceBet), &[Role::Anyone]);
    }

    #[test]
    fn test_publisher_is_not_implicitly_operator() {
        for op in [
            Operation::StartNewRound,
            Operation::ExtendBettingTime,
            Operation::DrawWinner,
            Operation::RefundRound,
        ] {
            assert!(!allowed_roles(op).contains(&Role::Publisher));
            assert!(!allowed_roles(op).contains(&Role::Sparsity));
        }
    }
}
