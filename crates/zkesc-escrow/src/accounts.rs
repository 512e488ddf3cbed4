//! # Token Accounts
//!
//! Balances of the parties the escrow moves funds to and from. The vault
//! balance is not here: it lives inside [`Escrow`](crate::Escrow) so that
//! nothing but escrow operations can change it.

use dashmap::DashMap;
use zkesc_core::AccountId;

use crate::error::EscrowError;

/// Per-account token balances.
pub trait TokenAccounts: Send + Sync {
    /// Current balance; zero for unknown accounts.
    fn balance(&self, account: &AccountId) -> u64;

    /// Add `amount`, saturating at `u64::MAX`. Returns the new balance.
    fn credit(&self, account: &AccountId, amount: u64) -> u64;

    /// Subtract `amount` atomically. Returns the new balance.
    ///
    /// # Errors
    ///
    /// [`EscrowError::InsufficientFunds`] if the balance is lower; the
    /// balance is unchanged.
    fn debit(&self, account: &AccountId, amount: u64) -> Result<u64, EscrowError>;
}

/// `DashMap`-backed [`TokenAccounts`].
#[derive(Debug, Default)]
pub struct InMemoryTokenAccounts {
    balances: DashMap<AccountId, u64>,
}

impl InMemoryTokenAccounts {
    /// No accounts.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenAccounts for InMemoryTokenAccounts {
    fn balance(&self, account: &AccountId) -> u64 {
        self.balances.get(account).map(|b| *b).unwrap_or(0)
    }

    fn credit(&self, account: &AccountId, amount: u64) -> u64 {
        let mut balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
        *balance
    }

    fn debit(&self, account: &AccountId, amount: u64) -> Result<u64, EscrowError> {
        let insufficient = |available| EscrowError::InsufficientFunds {
            account: account.to_string(),
            requested: amount,
            available,
        };
        let mut balance = self.balances.get_mut(account).ok_or_else(|| insufficient(0))?;
        if *balance < amount {
            return Err(insufficient(*balance));
        }
        *balance -= amount;
        Ok(*balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    #[test]
    fn credit_and_debit() {
        let accounts = InMemoryTokenAccounts::new();
        let a = account("alice");
        assert_eq!(accounts.balance(&a), 0);
        assert_eq!(accounts.credit(&a, 100), 100);
        assert_eq!(accounts.debit(&a, 40).unwrap(), 60);
        assert_eq!(accounts.balance(&a), 60);
    }

    #[test]
    fn debit_beyond_balance_fails_unchanged() {
        let accounts = InMemoryTokenAccounts::new();
        let a = account("alice");
        accounts.credit(&a, 10);
        assert!(matches!(
            accounts.debit(&a, 11),
            Err(EscrowError::InsufficientFunds {
                requested: 11,
                available: 10,
                ..
            })
        ));
        assert_eq!(accounts.balance(&a), 10);
        assert!(matches!(
            accounts.debit(&account("nobody"), 1),
            Err(EscrowError::InsufficientFunds { available: 0, .. })
        ));
    }

    #[test]
    fn credit_saturates() {
        let accounts = InMemoryTokenAccounts::new();
        let a = account("whale");
        accounts.credit(&a, u64::MAX);
        assert_eq!(accounts.credit(&a, 1), u64::MAX);
    }
}
