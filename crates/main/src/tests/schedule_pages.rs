use chrono::NaiveTime;
use db::{
    config::SCHEDULE_OPENED,
    schema::{
        days, presentation_additional_speakers, presentations, slots, speakers,
    },
    speaker::Speaker,
};
use diesel::prelude::*;
use rocket::http::Status;

use super::test_app;

const SCHEDULE_PAGES: [&str; 4] = [
    "/schedule",
    "/schedule/pentabarf.xml",
    "/schedule/xcal.xml",
    "/schedule/schedule.ics",
];

#[test]
fn closed_schedule_is_not_found() {
    let mut app = test_app();
    app.create_schedule(true, false);

    for path in SCHEDULE_PAGES {
        let response = app.client.get(path).dispatch();
        assert_eq!(response.status(), Status::NotFound, "GET {path}");
    }
    let response = app.client.get("/schedule/slots/opening-keynote").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn unpublished_or_hidden_schedule_is_not_found() {
    for (published, hidden) in [(false, false), (true, true), (false, true)] {
        let mut app = test_app();
        app.set_option(SCHEDULE_OPENED, "1");
        app.create_schedule(published, hidden);

        for path in SCHEDULE_PAGES {
            let response = app.client.get(path).dispatch();
            assert_eq!(
                response.status(),
                Status::NotFound,
                "GET {path} with published={published}, hidden={hidden}"
            );
        }
    }
}

#[test]
fn open_schedule_and_exports() {
    let mut app = test_app();
    app.set_option(SCHEDULE_OPENED, "true");
    app.create_schedule(true, false);

    let response = app.client.get("/schedule").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("Opening keynote"));
    assert!(body.contains("Analytical engines"));
    assert!(body.contains("colspan=\"1\""));

    let response = app.client.get("/schedule/pentabarf.xml").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Content-Type"),
        Some("application/xml")
    );
    let body = response.into_string().unwrap();
    assert!(body.contains("<room name=\"General\">"));
    assert!(body.contains("<room name=\"Python\">"));

    let response = app.client.get("/schedule/xcal.xml").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Content-Type"),
        Some("application/xml")
    );
    assert_eq!(
        response.into_string().unwrap().matches("<vevent>").count(),
        2
    );

    let response = app.client.get("/schedule/schedule.ics").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert!(response
        .headers()
        .get_one("Content-Type")
        .unwrap()
        .starts_with("text/calendar"));
    let body = response.into_string().unwrap();
    assert!(body.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(body.contains("UID:"));
}

#[test]
fn superusers_preview_a_closed_schedule() {
    let mut app = test_app();
    app.create_schedule(true, false);
    app.login_superuser();

    for path in SCHEDULE_PAGES {
        let response = app.client.get(path).dispatch();
        assert_eq!(response.status(), Status::Ok, "GET {path}");
    }
}

#[test]
fn slot_ids_redirect_to_slugs() {
    let mut app = test_app();
    app.set_option(SCHEDULE_OPENED, "1");
    let (keynote, talk) = app.create_schedule(true, false);

    let response = app
        .client
        .get(format!("/schedule/slots/{keynote}"))
        .dispatch();
    assert_eq!(response.status(), Status::PermanentRedirect);
    assert_eq!(
        response.headers().get_one("Location"),
        Some("/schedule/slots/opening-keynote")
    );

    let response = app.client.get("/schedule/slots/opening-keynote").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert!(response.into_string().unwrap().contains("Opening keynote"));

    // slots without a slug are served under their id
    let response = app.client.get(format!("/schedule/slots/{talk}")).dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("Analytical engines"));
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("Likes tea."));

    let response = app.client.get("/schedule/slots/9999").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    let response = app.client.get("/schedule/slots/no-such-slot").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

fn insert_slot(conn: &mut SqliteConnection, slug: &str) -> QueryResult<i64> {
    let day_id: i64 = days::table.select(days::id).first(conn)?;
    diesel::insert_into(slots::table)
        .values((
            slots::day_id.eq(day_id),
            slots::kind.eq("lightning"),
            slots::start_time.eq(NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            slots::end_time.eq(NaiveTime::from_hms_opt(19, 0, 0).unwrap()),
            slots::slug.eq(Some(slug)),
            slots::title.eq("Lightning talks"),
            slots::description.eq(""),
        ))
        .returning(slots::id)
        .get_result(conn)
}

#[test]
fn slugs_are_percent_encoded_in_redirects() {
    let mut app = test_app();
    app.set_option(SCHEDULE_OPENED, "1");
    app.create_schedule(true, false);
    let id = insert_slot(&mut app.conn, "lightning talks?").unwrap();

    let response = app.client.get(format!("/schedule/slots/{id}")).dispatch();
    assert_eq!(response.status(), Status::PermanentRedirect);
    let location = response.headers().get_one("Location").unwrap().to_string();
    assert_eq!(location, "/schedule/slots/lightning%20talks%3F");

    let response = app.client.get(location).dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert!(response.into_string().unwrap().contains("Lightning talks"));
}

#[test]
fn all_digit_slugs_are_rejected() {
    let mut app = test_app();
    app.create_schedule(true, false);

    assert!(insert_slot(&mut app.conn, "2016").is_err());
    assert!(insert_slot(&mut app.conn, "").is_err());
    assert!(insert_slot(&mut app.conn, "2016-closing").is_ok());
}

#[test]
fn slot_page_lists_the_speakers_other_talks() {
    let mut app = test_app();
    app.set_option(SCHEDULE_OPENED, "1");
    let (_, talk) = app.create_schedule(true, false);

    let ada: i64 = presentations::table
        .select(presentations::speaker_id)
        .first(&mut app.conn)
        .unwrap();
    let charles = app.create_speaker("Charles Babbage", None, None);
    let workshop: i64 = diesel::insert_into(presentations::table)
        .values((
            presentations::speaker_id.eq(charles),
            presentations::title.eq("Difference engines"),
            presentations::description.eq(""),
        ))
        .returning(presentations::id)
        .get_result(&mut app.conn)
        .unwrap();
    diesel::insert_into(presentation_additional_speakers::table)
        .values((
            presentation_additional_speakers::presentation_id.eq(workshop),
            presentation_additional_speakers::speaker_id.eq(ada),
        ))
        .execute(&mut app.conn)
        .unwrap();

    let response = app.client.get(format!("/schedule/slots/{talk}")).dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("Also presenting"));
    assert!(body.contains("Difference engines"));
}

#[test]
fn speaker_email_comes_from_the_account_when_linked() {
    let mut app = test_app();
    let user_id = app.create_user("ada@example.com", false);
    let linked = app.create_speaker("Ada", Some(user_id), Some("old@example.com"));
    let invited = app.create_speaker("Charles", None, Some("charles@example.com"));

    let load = |conn: &mut SqliteConnection, id: i64| -> Speaker {
        speakers::table
            .filter(speakers::id.eq(id))
            .select(Speaker::as_select())
            .first(conn)
            .unwrap()
    };

    let linked = load(&mut app.conn, linked);
    assert_eq!(
        linked.email(&mut app.conn).unwrap().as_deref(),
        Some("ada@example.com")
    );
    let invited = load(&mut app.conn, invited);
    assert_eq!(
        invited.email(&mut app.conn).unwrap().as_deref(),
        Some("charles@example.com")
    );
    assert_eq!(invited.to_string(), "?");
}
