//! Which rows an [`EntityService`](super::EntityService) lists.

use haulmark_core::result::AppResult;
use haulmark_core::types::{FilterField, UserId};

use crate::context::RequestContext;

/// Selection applied to every list fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListScope {
    /// Every row the store's policy exposes to the caller.
    #[default]
    Visible,
    /// Rows whose owner column equals the caller.
    Owned,
    /// Rows matching fixed filters.
    Filtered(Vec<FilterField>),
}

impl ListScope {
    /// Filters for one fetch by `ctx`.
    ///
    /// [`ListScope::Owned`] needs an authenticated caller.
    pub fn filters(
        &self,
        ctx: &RequestContext,
        owner_field: &str,
    ) -> AppResult<Vec<FilterField>> {
        match self {
            Self::Visible => Ok(Vec::new()),
            Self::Owned => {
                let user: UserId = ctx.require_user()?;
                Ok(vec![FilterField::eq(owner_field, user.into_uuid())])
            }
            Self::Filtered(filters) => Ok(filters.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulmark_entity::user::UserRole;

    #[test]
    fn test_owned_scope_needs_caller() {
        let err = ListScope::Owned
            .filters(&RequestContext::anonymous(), "owner_id")
            .unwrap_err();
        assert!(err.is_unauthenticated());

        let user = UserId::new();
        let filters = ListScope::Owned
            .filters(&RequestContext::authenticated(user, UserRole::FleetOwner), "owner_id")
            .unwrap();
        assert_eq!(filters, vec![FilterField::eq("owner_id", user.into_uuid())]);
    }

    #[test]
    fn test_visible_scope_has_no_filters() {
        let filters = ListScope::default()
            .filters(&RequestContext::anonymous(), "owner_id")
            .unwrap();
        assert!(filters.is_empty());
    }
}
