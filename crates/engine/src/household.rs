//! The two people sharing the ledger.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Payer name used for expenses paid from a joint account.
pub const SHARED_PAYER: &str = "Shared";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    pub user1: String,
    pub user2: String,
}

impl Default for Household {
    fn default() -> Self {
        Self {
            user1: "User 1".to_string(),
            user2: "User 2".to_string(),
        }
    }
}

impl Household {
    pub fn new(user1: impl Into<String>, user2: impl Into<String>) -> ResultEngine<Self> {
        let user1 = user1.into().trim().to_string();
        let user2 = user2.into().trim().to_string();
        if user1.is_empty() || user2.is_empty() {
            return Err(EngineError::Validation(
                "household user names must not be empty".to_string(),
            ));
        }
        if user1 == user2 {
            return Err(EngineError::Validation(
                "household user names must differ".to_string(),
            ));
        }
        if user1 == SHARED_PAYER || user2 == SHARED_PAYER {
            return Err(EngineError::Validation(format!(
                "\"{SHARED_PAYER}\" is reserved and cannot be a user name"
            )));
        }
        Ok(Self { user1, user2 })
    }

    pub fn is_member(&self, name: &str) -> bool {
        name == self.user1 || name == self.user2
    }

    /// Check `name` is one of the two users, labelling the error with `field`.
    pub(crate) fn require_member(&self, name: &str, field: &str) -> ResultEngine<()> {
        if self.is_member(name) {
            return Ok(());
        }
        Err(EngineError::Validation(format!(
            "{field} must be \"{}\" or \"{}\", got \"{name}\"",
            self.user1, self.user2
        )))
    }

    /// Expense payers may also be the joint account.
    pub(crate) fn require_payer(&self, name: &str) -> ResultEngine<()> {
        if name == SHARED_PAYER {
            return Ok(());
        }
        self.require_member(name, "paid_by")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_or_reserved_names() {
        assert!(Household::new("Ana", "Ana").is_err());
        assert!(Household::new("Ana", " ").is_err());
        assert!(Household::new("Shared", "Ana").is_err());
    }

    #[test]
    fn shared_is_a_valid_payer_but_not_a_receiver() {
        let household = Household::new("Ana", "Ben").unwrap();
        assert!(household.require_payer("Shared").is_ok());
        assert!(household.require_member("Shared", "paid_to").is_err());
        assert!(household.require_member("Ben", "paid_to").is_ok());
    }
}
