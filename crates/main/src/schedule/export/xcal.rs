use chrono::NaiveDate;
use maud::html;

use super::{PLENARY_ROOM, XML_DECLARATION};
use crate::{
    schedule::{ScheduleExport, ScheduledSlot},
    settings::SiteConfig,
};

const XCAL_NAMESPACE: &str = "urn:ietf:params:xml:ns:xcal";

fn stamp(date: NaiveDate, slot_time: chrono::NaiveTime) -> String {
    date.and_time(slot_time).format("%Y%m%dT%H%M%S").to_string()
}

/// `PT1H30M`, the RFC 5545 duration of a slot.
fn iso_duration(slot: &ScheduledSlot) -> String {
    let minutes = slot.slot.duration().num_minutes().max(0);
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("PT{m}M"),
        (h, 0) => format!("PT{h}H"),
        (h, m) => format!("PT{h}H{m}M"),
    }
}

/// Serializes the schedule as xCal, the XML rendition of iCalendar.
pub fn export_to_xcal(export: &ScheduleExport, site: &SiteConfig) -> String {
    let markup = html! {
        iCalendar xmlns=(XCAL_NAMESPACE) {
            vcalendar {
                version { "2.0" }
                prodid { "-//" (site.site_name) "//Schedule//EN" }
                x-wr-caldesc { (export.schedule.name) }
                x-wr-calname { (site.site_name) }
                @for (day, slot) in export.slots() {
                    vevent {
                        method { "PUBLISH" }
                        uid { (slot.slot.id) "@" (site.host()) }
                        dtstart { (stamp(day.date(), slot.slot.start_time)) }
                        dtend { (stamp(day.date(), slot.slot.end_time)) }
                        duration { (iso_duration(slot)) }
                        summary { (slot.title()) }
                        description { (slot.description()) }
                        class { "PUBLIC" }
                        status { "CONFIRMED" }
                        category { (slot.slot.kind) }
                        url { (site.url(&slot.slot.absolute_url())) }
                        location { (slot.room().unwrap_or(PLENARY_ROOM)) }
                        @for speaker in &slot.speakers {
                            attendee { (speaker.name) }
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
    use super::export_to_xcal;
    use crate::{schedule::export::fixtures, settings::SiteConfig};

    #[test]
    fn one_vevent_per_slot() {
        let site = SiteConfig {
            site_name: "PyConES".to_string(),
            base_url: "https://2016.es.pycon.org".to_string(),
        };
        let xml = export_to_xcal(&fixtures::schedule(), &site);

        assert!(xml.contains(
            "<iCalendar xmlns=\"urn:ietf:params:xml:ns:xcal\"><vcalendar><version>2.0</version>"
        ));
        assert!(xml.contains("<x-wr-caldesc>PyConES 2016</x-wr-caldesc>"));
        assert_eq!(xml.matches("<vevent>").count(), 2);

        assert!(xml.contains("<uid>11@2016.es.pycon.org</uid>"));
        assert!(xml.contains("<dtstart>20161008T100000</dtstart><dtend>20161008T104500</dtend><duration>PT45M</duration>"));
        assert!(xml.contains("<duration>PT1H</duration>"));
        assert!(xml.contains("<url>https://2016.es.pycon.org/schedule/slots/opening-keynote</url>"));
        assert!(xml.contains("<location>Room B</location>"));
        assert!(xml.contains("<location>General</location>"));
        assert!(xml.contains("<attendee>Ada Lovelace</attendee>"));
    }
}
