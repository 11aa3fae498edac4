//! End-to-end tests: a full Rocket instance over a fresh SQLite file, driven
//! through `rocket::local`, with fixtures written straight to the database.

use chrono::{NaiveDate, NaiveTime};
use db::schema::{
    attendees, config, days, presentations, proposal_kinds, proposal_sections,
    proposals, reviews, schedules, slots, speakers, tracks, users,
};
use diesel::{prelude::*, SqliteConnection};
use rocket::{http::ContentType, local::blocking::Client};
use tempfile::TempDir;
use uuid::Uuid;

use crate::{auth::login::PasswordLoginForm, make_rocket, util::hash_password};

mod pages;
mod proposals_admin;
mod schedule_pages;

pub const PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub client: Client,
    pub conn: SqliteConnection,
    // dropped last, removing the database file
    _dir: TempDir,
}

pub fn test_app() -> TestApp {
    test_app_named(None)
}

/// As [`test_app`], optionally overriding the configured site name.
pub fn test_app_named(site_name: Option<&str>) -> TestApp {
    let dir = tempfile::tempdir().expect("could not create a temporary dir");
    let db_path = dir.path().join("test.db");
    let db_path = db_path.to_str().expect("temporary path is not utf-8");

    let rocket = make_rocket(db_path);
    let rocket = match site_name {
        Some(name) => {
            let figment = rocket.figment().clone().merge(("site_name", name));
            rocket.configure(figment)
        }
        None => rocket,
    };
    // igniting runs the migrations
    let client = Client::tracked(rocket).unwrap();

    let mut conn = SqliteConnection::establish(db_path)
        .expect("database connection failed");
    diesel::sql_query("PRAGMA foreign_keys=ON")
        .execute(&mut conn)
        .unwrap();
    diesel::sql_query("PRAGMA busy_timeout=1000")
        .execute(&mut conn)
        .unwrap();

    TestApp {
        client,
        conn,
        _dir: dir,
    }
}

impl TestApp {
    pub fn set_option(&mut self, key: &str, value: &str) {
        diesel::insert_into(config::table)
            .values((
                config::public_id.eq(Uuid::new_v4().to_string()),
                config::key.eq(key),
                config::value.eq(value),
            ))
            .on_conflict(config::key)
            .do_update()
            .set(config::value.eq(value))
            .execute(&mut self.conn)
            .unwrap();
    }

    pub fn create_user(&mut self, email: &str, is_superuser: bool) -> i64 {
        diesel::insert_into(users::table)
            .values((
                users::public_id.eq(Uuid::new_v4().to_string()),
                users::email.eq(email),
                users::password_hash.eq(Some(hash_password(PASSWORD).unwrap())),
                users::is_superuser.eq(is_superuser),
            ))
            .returning(users::id)
            .get_result(&mut self.conn)
            .unwrap()
    }

    pub fn create_attendee(&mut self, email: &str, tracker: &str) -> i64 {
        let user_id = self.create_user(email, false);
        diesel::insert_into(attendees::table)
            .values((
                attendees::user_id.eq(user_id),
                attendees::tracker.eq(tracker),
                attendees::name.eq("Grace Hopper"),
            ))
            .returning(attendees::id)
            .get_result(&mut self.conn)
            .unwrap()
    }

    /// Logs the client in as a new superuser.
    pub fn login_superuser(&mut self) -> i64 {
        let id = self.create_user("admin@example.com", true);
        let response = self
            .client
            .post("/login")
            .header(ContentType::Form)
            .body(
                serde_urlencoded::to_string(&PasswordLoginForm {
                    email: "admin@example.com".to_string(),
                    password: PASSWORD.to_string(),
                })
                .unwrap(),
            )
            .dispatch();
        assert_eq!(response.status().code, 303);
        id
    }

    pub fn create_speaker(
        &mut self,
        name: &str,
        user_id: Option<i64>,
        invite_email: Option<&str>,
    ) -> i64 {
        diesel::insert_into(speakers::table)
            .values((
                speakers::name.eq(name),
                speakers::user_id.eq(user_id),
                speakers::invite_email.eq(invite_email),
                speakers::biography.eq("Writes compilers.\n\nLikes tea."),
            ))
            .returning(speakers::id)
            .get_result(&mut self.conn)
            .unwrap()
    }

    pub fn create_proposal(
        &mut self,
        speaker_id: i64,
        title: &str,
        accepted: bool,
    ) -> i64 {
        let kind_id = self.kind_id("talk");
        let section_id = match proposal_sections::table
            .select(proposal_sections::id)
            .first::<i64>(&mut self.conn)
            .optional()
            .unwrap()
        {
            Some(id) => id,
            None => diesel::insert_into(proposal_sections::table)
                .values(proposal_sections::name.eq("Main"))
                .returning(proposal_sections::id)
                .get_result(&mut self.conn)
                .unwrap(),
        };

        diesel::insert_into(proposals::table)
            .values((
                proposals::speaker_id.eq(speaker_id),
                proposals::kind_id.eq(kind_id),
                proposals::section_id.eq(section_id),
                proposals::title.eq(title),
                proposals::accepted.eq(accepted),
            ))
            .returning(proposals::id)
            .get_result(&mut self.conn)
            .unwrap()
    }

    pub fn kind_id(&mut self, name: &str) -> i64 {
        if let Some(id) = proposal_kinds::table
            .filter(proposal_kinds::name.eq(name))
            .select(proposal_kinds::id)
            .first::<i64>(&mut self.conn)
            .optional()
            .unwrap()
        {
            return id;
        }
        diesel::insert_into(proposal_kinds::table)
            .values(proposal_kinds::name.eq(name))
            .returning(proposal_kinds::id)
            .get_result(&mut self.conn)
            .unwrap()
    }

    pub fn create_review(
        &mut self,
        proposal_id: i64,
        reviewer_id: i64,
        score: i64,
        finished: bool,
    ) {
        diesel::insert_into(reviews::table)
            .values((
                reviews::proposal_id.eq(proposal_id),
                reviews::reviewer_id.eq(reviewer_id),
                reviews::relevance.eq(Some(score)),
                reviews::interest.eq(Some(score)),
                reviews::newness.eq(Some(score)),
                reviews::finished.eq(finished),
            ))
            .execute(&mut self.conn)
            .unwrap();
    }

    /// A schedule with one day, one track and two slots: a keynote with a
    /// slug and a talk without. Returns `(keynote id, talk id)`.
    pub fn create_schedule(&mut self, published: bool, hidden: bool) -> (i64, i64) {
        let schedule_id: i64 = diesel::insert_into(schedules::table)
            .values((
                schedules::name.eq("Main schedule"),
                schedules::published.eq(published),
                schedules::hidden.eq(hidden),
            ))
            .returning(schedules::id)
            .get_result(&mut self.conn)
            .unwrap();
        let day_id: i64 = diesel::insert_into(days::table)
            .values((
                days::schedule_id.eq(schedule_id),
                days::date.eq(NaiveDate::from_ymd_opt(2016, 10, 8).unwrap()),
            ))
            .returning(days::id)
            .get_result(&mut self.conn)
            .unwrap();
        let track_id: i64 = diesel::insert_into(tracks::table)
            .values((
                tracks::day_id.eq(day_id),
                tracks::name.eq("Python"),
                tracks::room.eq("Auditorium"),
                tracks::position.eq(1),
            ))
            .returning(tracks::id)
            .get_result(&mut self.conn)
            .unwrap();

        let speaker_id = self.create_speaker("Ada Lovelace", None, None);
        let presentation_id: i64 = diesel::insert_into(presentations::table)
            .values((
                presentations::speaker_id.eq(speaker_id),
                presentations::title.eq("Analytical engines"),
                presentations::description.eq("Cards, loops and numbers."),
            ))
            .returning(presentations::id)
            .get_result(&mut self.conn)
            .unwrap();

        let keynote: i64 = diesel::insert_into(slots::table)
            .values((
                slots::day_id.eq(day_id),
                slots::kind.eq("keynote"),
                slots::start_time.eq(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
                slots::end_time.eq(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
                slots::slug.eq(Some("opening-keynote")),
                slots::title.eq("Opening keynote"),
                slots::description.eq(""),
            ))
            .returning(slots::id)
            .get_result(&mut self.conn)
            .unwrap();
        let talk: i64 = diesel::insert_into(slots::table)
            .values((
                slots::day_id.eq(day_id),
                slots::track_id.eq(Some(track_id)),
                slots::kind.eq("talk"),
                slots::start_time.eq(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
                slots::end_time.eq(NaiveTime::from_hms_opt(10, 45, 0).unwrap()),
                slots::title.eq(""),
                slots::description.eq(""),
                slots::presentation_id.eq(Some(presentation_id)),
            ))
            .returning(slots::id)
            .get_result(&mut self.conn)
            .unwrap();

        (keynote, talk)
    }
}
