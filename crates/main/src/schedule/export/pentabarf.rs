use maud::{html, Markup};

use super::{hours_minutes, PLENARY_ROOM, XML_DECLARATION};
use crate::{
    schedule::{ScheduleDay, ScheduleExport, ScheduledSlot},
    settings::SiteConfig,
};

const TIMESLOT_DURATION: &str = "00:15";

/// Rooms of a day with their events: the plenary room first, then one per
/// track in track order. Rooms without events are left out.
fn rooms(day: &ScheduleDay) -> Vec<(&str, Vec<&ScheduledSlot>)> {
    let plenary = day
        .slots
        .iter()
        .filter(|s| s.slot.track_id.is_none())
        .collect::<Vec<_>>();

    let mut rooms = Vec::new();
    if !plenary.is_empty() {
        rooms.push((PLENARY_ROOM, plenary));
    }
    for track in &day.tracks {
        let events = day
            .slots
            .iter()
            .filter(|s| s.slot.track_id == Some(track.id))
            .collect::<Vec<_>>();
        if !events.is_empty() {
            rooms.push((track.name.as_str(), events));
        }
    }
    rooms
}

fn event(room: &str, slot: &ScheduledSlot, site: &SiteConfig) -> Markup {
    html! {
        event id=(slot.slot.id) {
            start { (slot.slot.start_time.format("%H:%M").to_string()) }
            duration { (hours_minutes(slot.slot.duration())) }
            room { (room) }
            slug { (slot.slug_or_id()) }
            title { (slot.title()) }
            subtitle {}
            track { (slot.track_name().unwrap_or(PLENARY_ROOM)) }
            type { (slot.slot.kind) }
            language { (slot.language) }
            abstract { (slot.summary()) }
            description { (slot.description()) }
            persons {
                @for speaker in &slot.speakers {
                    person id=(speaker.api_id()) { (speaker.name) }
                }
            }
            links {
                link href=(site.url(&slot.slot.absolute_url())) { "Details" }
            }
        }
    }
}

/// Serializes the schedule in the Pentabarf XML format read by most
/// conference schedule apps.
pub fn export_to_pentabarf(export: &ScheduleExport, site: &SiteConfig) -> String {
    let start = export
        .first_date()
        .map(|d| d.to_string())
        .unwrap_or_default();
    let end = export
        .last_date()
        .map(|d| d.to_string())
        .unwrap_or_default();

    let markup = html! {
        schedule {
            conference {
                title { (export.schedule.name) }
                subtitle { (site.site_name) }
                start { (start) }
                end { (end) }
                days { (export.days.len()) }
                timeslot_duration { (TIMESLOT_DURATION) }
            }
            @for (index, day) in export.days.iter().enumerate() {
                day index=(index + 1) date=(day.date().to_string()) {
                    @for (room_name, events) in rooms(day) {
                        room name=(room_name) {
                            @for slot in events {
                                (event(room_name, slot, site))
                            }
                        }
                    }
                }
            }
        }
    };

    format!("{XML_DECLARATION}{}", markup.into_string())
}

#[cfg(test)]
mod tests {
    use super::export_to_pentabarf;
    use crate::{schedule::export::fixtures, settings::SiteConfig};

    #[test]
    fn conference_days_rooms_and_events() {
        let xml = export_to_pentabarf(&fixtures::schedule(), &SiteConfig::default());

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<schedule><conference>"));
        assert!(xml.contains("<title>PyConES 2016</title>"));
        assert!(xml.contains("<start>2016-10-08</start><end>2016-10-08</end><days>1</days>"));
        assert!(xml.contains("<day index=\"1\" date=\"2016-10-08\">"));

        let general = xml.find("<room name=\"General\">").unwrap();
        let data = xml.find("<room name=\"Data\">").unwrap();
        assert!(general < data);
        assert!(!xml.contains("<room name=\"Python\">"));

        assert!(xml.contains("<event id=\"10\"><start>09:00</start><duration>01:00</duration><room>General</room><slug>opening-keynote</slug>"));
        assert!(xml.contains("<event id=\"11\"><start>10:00</start><duration>00:45</duration><room>Data</room><slug>11</slug>"));
        assert!(xml.contains("<title>Pandas, numbers &amp; &lt;tricks&gt;</title>"));
        assert!(xml.contains("<type>talk</type><language>en</language><abstract>Short</abstract>"));
        assert!(xml.contains("<persons><person id=\"S00007\">Ada Lovelace</person></persons>"));
    }
}
