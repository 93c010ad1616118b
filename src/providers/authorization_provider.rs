use std::sync::Arc;

use crate::errors::InternalError;
use crate::errors::internal::AccessError;
use crate::providers::token_provider::TokenProvider;
use crate::stores::UserStore;
use crate::types::internal::{Caller, RequestContext, UserRole};

/// Roles allowed to administer users, login logs and directory settings
pub const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Roles that may read every proposal regardless of owner
pub const PROPOSAL_VIEW_ALL: &[UserRole] = &[UserRole::Admin, UserRole::Ceo, UserRole::Cfo];

/// Roles that may delete a draft they do not own
pub const PROPOSAL_DELETE_OVERRIDE: &[UserRole] = &[UserRole::Admin];

/// Request gate: token verification, role membership and ownership
pub struct AuthorizationProvider {
    token_provider: Arc<TokenProvider>,
    user_store: Arc<UserStore>,
}

impl AuthorizationProvider {
    pub fn new(token_provider: Arc<TokenProvider>, user_store: Arc<UserStore>) -> Self {
        Self { token_provider, user_store }
    }

    /// Validate the bearer credential and attach the caller to the context
    pub fn authenticate(&self, ctx: RequestContext, bearer: Option<&str>) -> Result<RequestContext, InternalError> {
        let token = bearer
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AccessError::unauthenticated("missing bearer token"))?;

        let claims = self.token_provider.validate(token).map_err(|e| {
            tracing::warn!(request_id = %ctx.request_id, class = ?e.class, "rejected session token");
            InternalError::Token(e)
        })?;

        Ok(ctx.with_caller(Caller::from(claims)))
    }

    /// Fails closed: a context without a caller never passes
    pub fn require_role<'a>(
        ctx: &'a RequestContext,
        allowed: &[UserRole],
        action: &str,
    ) -> Result<&'a Caller, InternalError> {
        let Some(caller) = ctx.caller() else {
            return Err(AccessError::forbidden_role(None, action).into());
        };

        if !allowed.contains(&caller.role) {
            tracing::warn!(user_id = %caller.user_id, role = %caller.role, action, "role not permitted");
            return Err(AccessError::forbidden_role(Some(caller.role), action).into());
        }

        Ok(caller)
    }

    /// Any authenticated caller
    pub fn require_caller<'a>(ctx: &'a RequestContext, action: &str) -> Result<&'a Caller, InternalError> {
        ctx.caller()
            .ok_or_else(|| AccessError::forbidden_role(None, action).into())
    }

    /// Caller must own the resource unless their role is in `overrides`
    pub fn require_owner(
        caller: &Caller,
        owner_id: &str,
        overrides: &[UserRole],
        resource: &str,
    ) -> Result<(), InternalError> {
        if caller.user_id == owner_id || overrides.contains(&caller.role) {
            return Ok(());
        }

        tracing::warn!(user_id = %caller.user_id, resource, "ownership check failed");
        Err(AccessError::forbidden_ownership(&caller.user_id, resource).into())
    }

    /// Reject callers whose account was deactivated or removed after the token was issued
    pub async fn require_active(&self, caller: &Caller) -> Result<(), InternalError> {
        match self.user_store.find_by_id(&caller.user_id).await? {
            Some(record) if record.is_active => Ok(()),
            _ => Err(AccessError::InactiveCaller { caller_id: caller.user_id.clone() }.into()),
        }
    }

    /// Role membership plus a live, active account
    pub async fn require_active_role<'a>(
        &self,
        ctx: &'a RequestContext,
        allowed: &[UserRole],
        action: &str,
    ) -> Result<&'a Caller, InternalError> {
        let caller = Self::require_role(ctx, allowed, action)?;
        self.require_active(caller).await?;
        Ok(caller)
    }

    /// Any authenticated caller whose account is still active
    pub async fn require_active_caller<'a>(
        &self,
        ctx: &'a RequestContext,
        action: &str,
    ) -> Result<&'a Caller, InternalError> {
        let caller = Self::require_caller(ctx, action)?;
        self.require_active(caller).await?;
        Ok(caller)
    }
}
