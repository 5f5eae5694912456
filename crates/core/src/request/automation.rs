//! Ledger automation decisions for completed requests.
//!
//! The rules here are pure: the database layer gathers the facts (flag
//! state, existing-sale lookup, candidate operators) and this module decides
//! what the automation should do with them.

use centralmei_shared::types::UserId;

/// What the automation engine should do for a completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleDecision {
    /// No sale exists yet; create one attributed to the given operator.
    Create(UserId),
    /// The request is already flagged as invoiced; nothing to do.
    SkipFlagged,
    /// A sale row already references the request (the flag write lost a
    /// race); repair the flag and stop.
    SkipExisting,
    /// No eligible operator to own the sale; leave the request completed
    /// and un-invoiced for manual reconciliation.
    SkipNoOperator,
}

/// Resolves who owns an automatically created sale.
///
/// Precedence: the request's own user, then the first super-privileged
/// user, then the first staff user.
#[must_use]
pub fn resolve_operator(
    request_user: Option<UserId>,
    first_superuser: Option<UserId>,
    first_staff: Option<UserId>,
) -> Option<UserId> {
    request_user.or(first_superuser).or(first_staff)
}

/// Decides whether a completion event should materialize a sale.
///
/// `sale_created` is the request's idempotency flag; `sale_exists` is the
/// result of the unique back-reference lookup that guards against the flag
/// not having been persisted yet when a concurrent save fired.
#[must_use]
pub fn decide_sale_creation(
    sale_created: bool,
    sale_exists: bool,
    operator: Option<UserId>,
) -> SaleDecision {
    if sale_created {
        return SaleDecision::SkipFlagged;
    }
    if sale_exists {
        return SaleDecision::SkipExisting;
    }
    match operator {
        Some(user) => SaleDecision::Create(user),
        None => SaleDecision::SkipNoOperator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_precedence() {
        let request_user = Some(UserId::new());
        let superuser = Some(UserId::new());
        let staff = Some(UserId::new());

        assert_eq!(
            resolve_operator(request_user, superuser, staff),
            request_user
        );
        assert_eq!(resolve_operator(None, superuser, staff), superuser);
        assert_eq!(resolve_operator(None, None, staff), staff);
        assert_eq!(resolve_operator(None, None, None), None);
    }

    #[test]
    fn test_flag_short_circuits() {
        let operator = Some(UserId::new());
        assert_eq!(
            decide_sale_creation(true, false, operator),
            SaleDecision::SkipFlagged
        );
        // Flag wins even when the lookup also matched
        assert_eq!(
            decide_sale_creation(true, true, operator),
            SaleDecision::SkipFlagged
        );
    }

    #[test]
    fn test_existing_sale_repairs_flag() {
        assert_eq!(
            decide_sale_creation(false, true, Some(UserId::new())),
            SaleDecision::SkipExisting
        );
    }

    #[test]
    fn test_missing_operator_skips() {
        assert_eq!(
            decide_sale_creation(false, false, None),
            SaleDecision::SkipNoOperator
        );
    }

    #[test]
    fn test_clean_state_creates() {
        let user = UserId::new();
        assert_eq!(
            decide_sale_creation(false, false, Some(user)),
            SaleDecision::Create(user)
        );
    }
}
