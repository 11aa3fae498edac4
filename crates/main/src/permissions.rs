use db::{
    config::{is_enabled, ATTENDEES_ZONE_ACTIVATED, SCHEDULE_OPENED},
    user::User,
};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};

use crate::error::{AppError, AppResult};

#[derive(Debug)]
/// Something a requester may or may not be allowed to do.
pub enum Permission {
    /// Edit the site-wide configuration.
    ModifyGlobalConfig,
    /// Review and bulk-process the call for proposals.
    ManageProposals,
    /// See the published schedule and download its exports.
    ViewSchedule,
    /// Use the attendee area: sign in, restore a password, edit a profile.
    UseAttendeesZone,
}

/// Returns whether a requester has the requisite permission.
#[tracing::instrument(skip(conn))]
pub fn has_permission(
    user: Option<&User>,
    permission: &Permission,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> QueryResult<bool> {
    let is_superuser = user.map(|user| user.is_superuser).unwrap_or(false);

    match permission {
        Permission::ModifyGlobalConfig | Permission::ManageProposals => {
            Ok(is_superuser)
        }
        Permission::ViewSchedule => {
            Ok(is_superuser || is_enabled(SCHEDULE_OPENED, conn)?)
        }
        Permission::UseAttendeesZone => is_enabled(ATTENDEES_ZONE_ACTIVATED, conn),
    }
}

/// Fails with `NotFound` unless the attendee area is switched on. The area
/// pretends not to exist while it is off.
pub fn check_attendee_view(
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> AppResult<()> {
    if has_permission(None, &Permission::UseAttendeesZone, conn)? {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

/// Fails with `NotFound` unless the schedule is open, or the requester is a
/// superuser previewing it.
pub fn check_schedule_view(
    user: Option<&User>,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> AppResult<()> {
    if has_permission(user, &Permission::ViewSchedule, conn)? {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

/// Fails with `Forbidden` unless `user` holds `permission`.
pub fn require(
    user: &User,
    permission: Permission,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> AppResult<()> {
    if has_permission(Some(user), &permission, conn)? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
