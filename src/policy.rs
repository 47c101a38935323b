//! Caller authorization for account-scoped actions.
//!
//! Pure decisions over validated claims; no state, no store access.

use uuid::Uuid;

use crate::account::Role;
use crate::error::Error;

/// Allow when the caller is an administrator or acts on their own account.
///
/// # Errors
///
/// `Error::AccessDenied` otherwise.
pub fn can_act(caller_id: Uuid, caller_role: Role, target_id: Uuid) -> Result<(), Error> {
    if caller_role == Role::Administrator || caller_id == target_id {
        Ok(())
    } else {
        Err(Error::AccessDenied)
    }
}

/// Allow administrators only.
///
/// # Errors
///
/// `Error::AccessDenied` for every other role.
pub fn can_administer(caller_role: Role) -> Result<(), Error> {
    if caller_role == Role::Administrator {
        Ok(())
    } else {
        Err(Error::AccessDenied)
    }
}
