//! RFC 5545 calendar text.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::PLENARY_ROOM;
use crate::{schedule::ScheduleExport, settings::SiteConfig};

const MAX_LINE_OCTETS: usize = 75;

/// Escapes a TEXT property value.
pub(crate) fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    escaped.push_str("\\n");
                }
            }
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Splits a content line into lines of at most 75 octets, continuation lines
/// starting with a space. Multi-byte characters are never split.
pub(crate) fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + line.len() / 64 * 3);
    let mut octets = 0;
    for c in line.chars() {
        let width = c.len_utf8();
        if octets + width > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            octets = 1;
        }
        folded.push(c);
        octets += width;
    }
    folded
}

struct Calendar {
    text: String,
}

impl Calendar {
    fn new() -> Self {
        Calendar {
            text: String::new(),
        }
    }

    fn line(&mut self, name: &str, value: &str) {
        self.text.push_str(&fold_line(&format!("{name}:{value}")));
        self.text.push_str("\r\n");
    }

    fn text(&mut self, name: &str, value: &str) {
        self.line(name, &escape_text(value));
    }
}

fn stamp(at: NaiveDateTime) -> String {
    at.format("%Y%m%dT%H%M%S").to_string()
}

fn local(date: NaiveDate, time: NaiveTime) -> String {
    stamp(date.and_time(time))
}

/// Serializes the schedule as an iCalendar file with one event per slot.
/// Times are floating: they are local to the venue. `generated_at` (UTC)
/// becomes each event's `DTSTAMP`.
pub fn export_to_icalendar(
    export: &ScheduleExport,
    site: &SiteConfig,
    generated_at: NaiveDateTime,
) -> String {
    let mut cal = Calendar::new();
    cal.line("BEGIN", "VCALENDAR");
    cal.line("VERSION", "2.0");
    cal.line("PRODID", &format!("-//{}//Schedule//EN", site.site_name));
    cal.line("CALSCALE", "GREGORIAN");
    cal.line("METHOD", "PUBLISH");
    cal.text("X-WR-CALNAME", &site.site_name);
    cal.text("X-WR-CALDESC", &export.schedule.name);

    for (day, slot) in export.slots() {
        cal.line("BEGIN", "VEVENT");
        cal.line("UID", &format!("{}@{}", slot.slot.id, site.host()));
        cal.line("DTSTAMP", &format!("{}Z", stamp(generated_at)));
        cal.line("DTSTART", &local(day.date(), slot.slot.start_time));
        cal.line("DTEND", &local(day.date(), slot.slot.end_time));
        cal.text("SUMMARY", slot.title());
        if !slot.description().is_empty() {
            cal.text("DESCRIPTION", slot.description());
        }
        cal.text("LOCATION", slot.room().unwrap_or(PLENARY_ROOM));
        cal.text("CATEGORIES", &slot.slot.kind);
        cal.line("URL", &site.url(&slot.slot.absolute_url()));
        cal.line("CLASS", "PUBLIC");
        cal.line("STATUS", "CONFIRMED");
        cal.line("END", "VEVENT");
    }

    cal.line("END", "VCALENDAR");
    cal.text
}
