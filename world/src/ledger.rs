//! Currency and lives bookkeeping.

use geometry_defense_core::EconomyError;

/// Sole owner of the session's currency and lives.
///
/// Both values are unsigned and only change through the transactions below,
/// which keeps them non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ledger {
    currency: u32,
    lives: u32,
}

impl Ledger {
    pub(crate) const fn new(currency: u32, lives: u32) -> Self {
        Self { currency, lives }
    }

    pub(crate) const fn currency(&self) -> u32 {
        self.currency
    }

    pub(crate) const fn lives(&self) -> u32 {
        self.lives
    }

    pub(crate) const fn can_afford(&self, cost: u32) -> bool {
        self.currency >= cost
    }

    /// Deducts `cost`, leaving the balance untouched when it is insufficient.
    pub(crate) fn spend(&mut self, cost: u32) -> Result<(), EconomyError> {
        if !self.can_afford(cost) {
            return Err(EconomyError::InsufficientFunds {
                cost,
                available: self.currency,
            });
        }
        self.currency -= cost;
        Ok(())
    }

    pub(crate) fn credit(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(amount);
    }

    /// Removes one life, floored at zero, and returns the lives left.
    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}
