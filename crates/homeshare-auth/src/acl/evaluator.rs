//! Hierarchical access check over decoded claims.
//!
//! A claim on `"/"` grants every folder. Any other claim grants exactly the
//! folder it names; descendant path strings do not match.

use homeshare_core::error::AppError;
use homeshare_entity::AccessLevel;
use homeshare_entity::folder::ROOT_FOLDER;

use crate::jwt::Claims;

/// Whether `claims` permit `required` access to `folder_id`.
///
/// Never fails: claims with an empty scope or subject are denied.
pub fn has_access(claims: &Claims, folder_id: &str, required: AccessLevel) -> bool {
    if claims.sub.is_empty() || claims.folder_id.is_empty() || folder_id.is_empty() {
        return false;
    }

    let folder_matches = claims.folder_id == ROOT_FOLDER || claims.folder_id == folder_id;
    folder_matches && claims.access.satisfies(required)
}

/// Like [`has_access`], but returns an authorization error on denial.
pub fn require_access(
    claims: &Claims,
    folder_id: &str,
    required: AccessLevel,
) -> Result<(), AppError> {
    if has_access(claims, folder_id, required) {
        Ok(())
    } else {
        Err(AppError::authorization(format!(
            "Insufficient permissions: '{required}' on folder '{folder_id}' required"
        )))
    }
}
