//! Role gate shared by all protected handlers.
//!
//! The role check runs before any ownership check in the services. Missing
//! sessions, unknown ids, and deactivated accounts all collapse into the
//! same unauthorized error so callers cannot probe account state.

use crate::domain::{AccountsService, Error, Role, User};

use super::session::SessionContext;

/// Resolve the session to an active user holding the required role.
///
/// Wrong-role callers receive a forbidden error carrying no information
/// about the resource they were after.
pub async fn require_role(
    session: &SessionContext,
    accounts: &AccountsService,
    role: Role,
) -> Result<User, Error> {
    let user_id = session.require_user_id()?;
    let user = accounts
        .resolve_active(user_id)
        .await?
        .ok_or_else(|| Error::unauthorized("login required"))?;

    if user.role != role {
        return Err(Error::forbidden("access unauthorized"));
    }
    Ok(user)
}
