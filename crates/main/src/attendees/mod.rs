//! The attendee area. Every page here answers 404 unless the
//! `attendees_zone_activated` option is on.

pub mod profile;
pub mod restore;
pub mod sign_in;
