//! Serializers of a loaded schedule into calendar exchange formats. They
//! only read the [`ScheduleExport`](super::ScheduleExport), so the database
//! is never touched while rendering.

mod icalendar;
mod pentabarf;
mod xcal;

pub use icalendar::export_to_icalendar;
pub use pentabarf::export_to_pentabarf;
pub use xcal::export_to_xcal;

use chrono::Duration;

/// Room used in exports for slots outside any track.
pub const PLENARY_ROOM: &str = "General";

pub(crate) const XML_DECLARATION: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// `HH:MM`, as Pentabarf writes durations.
pub(crate) fn hours_minutes(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use db::{
        presentation::Presentation,
        schedule::{Day, Schedule, Slot, Track},
        speaker::Speaker,
    };

    use crate::schedule::{ScheduleDay, ScheduleExport, ScheduledSlot};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn track(id: i64, name: &str, room: &str, position: i64) -> Track {
        Track {
            id,
            day_id: 1,
            name: name.to_string(),
            room: room.to_string(),
            position,
        }
    }

    fn speaker() -> Speaker {
        Speaker {
            id: 7,
            user_id: Some(1),
            name: "Ada Lovelace".to_string(),
            biography: String::new(),
            biography_markup_type: "markdown".to_string(),
            photo: None,
            annotation: String::new(),
            invite_email: None,
            invite_token: String::new(),
            created_at: NaiveDateTime::default(),
        }
    }

    /// One day with two tracks, a plenary keynote and a talk.
    pub fn schedule() -> ScheduleExport {
        let tracks = vec![
            track(1, "Python", "Room A", 1),
            track(2, "Data", "Room B", 2),
        ];
        let keynote = ScheduledSlot {
            slot: Slot {
                id: 10,
                day_id: 1,
                track_id: None,
                kind: "keynote".to_string(),
                start_time: time(9, 0),
                end_time: time(10, 0),
                slug: Some("opening-keynote".to_string()),
                title: "Opening keynote".to_string(),
                description: String::new(),
                presentation_id: None,
            },
            track: None,
            presentation: None,
            speakers: Vec::new(),
            language: String::new(),
        };
        let talk = ScheduledSlot {
            slot: Slot {
                id: 11,
                day_id: 1,
                track_id: Some(2),
                kind: "talk".to_string(),
                start_time: time(10, 0),
                end_time: time(10, 45),
                slug: None,
                title: String::new(),
                description: String::new(),
                presentation_id: Some(3),
            },
            track: Some(tracks[1].clone()),
            presentation: Some(Presentation {
                id: 3,
                proposal_id: Some(5),
                speaker_id: 7,
                title: "Pandas, numbers & <tricks>".to_string(),
                description: "Data frames; lots of them, really.".to_string(),
                summary: "Short".to_string(),
            }),
            speakers: vec![speaker()],
            language: "en".to_string(),
        };

        ScheduleExport {
            schedule: Schedule {
                id: 1,
                name: "PyConES 2016".to_string(),
                published: true,
                hidden: false,
            },
            days: vec![ScheduleDay {
                day: Day {
                    id: 1,
                    schedule_id: 1,
                    date: NaiveDate::from_ymd_opt(2016, 10, 8).unwrap(),
                },
                tracks,
                slots: vec![keynote, talk],
            }],
        }
    }
}
