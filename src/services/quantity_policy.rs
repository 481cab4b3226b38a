use std::collections::HashSet;

use crate::config::ImportConfig;
use crate::database::models::WhiskeyData;

/// Per-account rule that stores a zero quantity as a single bottle.
///
/// Applied on JSON create and update as well as CSV import, so the
/// accounts listed in `IMPORT_QUANTITY_FLOOR_USERS` never hold empty rows.
#[derive(Debug, Clone, Default)]
pub struct QuantityPolicy {
    floor_users: HashSet<String>,
}

impl QuantityPolicy {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            floor_users: users.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.quantity_floor_users.iter().cloned())
    }

    pub fn applies_to(&self, username: &str) -> bool {
        self.floor_users.contains(username)
    }

    pub fn apply(&self, username: &str, data: &mut WhiskeyData) {
        if data.quantity == Some(0) && self.applies_to(username) {
            tracing::debug!("Raising zero quantity to 1 for {}", username);
            data.quantity = Some(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_quantity(quantity: Option<i32>) -> WhiskeyData {
        WhiskeyData {
            quantity,
            ..Default::default()
        }
    }

    #[test]
    fn raises_zero_only_for_listed_accounts() {
        let policy = QuantityPolicy::from_config(&ImportConfig::default());

        let mut data = with_quantity(Some(0));
        policy.apply("guntharp", &mut data);
        assert_eq!(data.quantity, Some(1));

        let mut data = with_quantity(Some(0));
        policy.apply("someone-else", &mut data);
        assert_eq!(data.quantity, Some(0));
    }

    #[test]
    fn leaves_other_quantities_alone() {
        let policy = QuantityPolicy::new(["guntharp"]);

        let mut data = with_quantity(Some(3));
        policy.apply("guntharp", &mut data);
        assert_eq!(data.quantity, Some(3));

        let mut data = with_quantity(None);
        policy.apply("guntharp", &mut data);
        assert_eq!(data.quantity, None);
    }

    #[test]
    fn empty_policy_never_applies() {
        let policy = QuantityPolicy::default();
        assert!(!policy.applies_to("guntharp"));
    }
}
