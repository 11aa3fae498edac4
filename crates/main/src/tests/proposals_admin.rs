use db::{
    proposal::Proposal,
    schema::{emails, proposal_kinds, proposal_tags, proposals, tags},
};
use diesel::prelude::*;
use rocket::{
    http::{ContentType, Status},
    local::blocking::{Client, LocalResponse},
};

use super::test_app;
use crate::proposals::actions::CSV_HEADER;

fn bulk<'c>(client: &'c Client, action: &str, selected: &[i64]) -> LocalResponse<'c> {
    let mut body = format!("action={action}");
    for id in selected {
        body.push_str(&format!("&selected={id}"));
    }
    client
        .post("/admin/proposals/actions")
        .header(ContentType::Form)
        .body(body)
        .dispatch()
}

fn proposal(conn: &mut SqliteConnection, id: i64) -> Proposal {
    proposals::table
        .filter(proposals::id.eq(id))
        .select(Proposal::as_select())
        .first(conn)
        .unwrap()
}

fn email_count(conn: &mut SqliteConnection) -> i64 {
    emails::table.count().get_result(conn).unwrap()
}

#[test]
fn only_superusers_manage_proposals() {
    let mut app = test_app();

    {
        let response = app.client.get("/admin/proposals").dispatch();
        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(response.headers().get_one("Location"), Some("/login"));
    }

    app.create_user("staff@example.com", false);
    app.client
        .post("/login")
        .header(ContentType::Form)
        .body(format!(
            "email=staff%40example.com&password={}",
            super::PASSWORD.replace(' ', "+")
        ))
        .dispatch();

    for path in ["/admin", "/admin/proposals", "/admin/proposals/kinds", "/admin/config"] {
        let response = app.client.get(path).dispatch();
        assert_eq!(response.status(), Status::Forbidden, "GET {path}");
    }
    let response = bulk(&app.client, "csv", &[1]);
    assert_eq!(response.status(), Status::Forbidden);
}

#[test]
fn list_filters_and_scores() {
    let mut app = test_app();
    let admin = app.login_superuser();
    let reviewer = app.create_user("reviewer@example.com", false);
    let user_id = app.create_user("ada@example.com", false);
    let speaker = app.create_speaker("Ada", Some(user_id), None);
    let accepted = app.create_proposal(speaker, "Engines", true);
    let rejected = app.create_proposal(speaker, "Looms", false);
    app.create_review(accepted, admin, 4, true);
    app.create_review(accepted, reviewer, 2, true);
    app.create_review(rejected, reviewer, 1, false);

    let response = app.client.get("/admin/proposals").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.contains("Engines"));
    assert!(body.contains("Looms"));
    assert!(body.contains("ada@example.com"));
    assert!(body.contains("3.00"));

    let response = app.client.get("/admin/proposals?accepted=true").dispatch();
    let body = response.into_string().unwrap();
    assert!(body.contains("Engines"));
    assert!(!body.contains("Looms"));

    let response = app.client.get("/admin/proposals?kind=workshop").dispatch();
    let body = response.into_string().unwrap();
    assert!(!body.contains("Engines"));
}

#[test]
fn csv_export() {
    let mut app = test_app();
    app.login_superuser();
    let speaker = app.create_speaker("Charles", None, Some("charles@example.com"));
    let first = app.create_proposal(speaker, "Difference engine, part 1", false);
    let second = app.create_proposal(speaker, "Plain", false);
    let _unselected = app.create_proposal(speaker, "Not exported", false);

    let response = bulk(&app.client, "csv", &[first, second]);
    assert_eq!(response.status(), Status::Ok);
    assert!(response
        .headers()
        .get_one("Content-Type")
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        response.headers().get_one("Content-Disposition"),
        Some("attachment; filename=\"proposals.csv\"")
    );

    let body = response.into_string().unwrap();
    let lines = body.split_terminator("\r\n").collect::<Vec<_>>();
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(
        lines[0],
        "id,title,speaker,speaker_email,kind,audience_level,language,avg,renormalization_O0,renormalization_O1,assigned_reviews,completed_reviews,tag_list"
    );
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with(&format!(
        "{first},\"Difference engine, part 1\",?,charles@example.com,talk,"
    )));
    assert!(lines[2].ends_with(",-,-,-,0,0,"));
    assert!(!body.contains("Not exported"));
}

#[test]
fn acceptance_only_reaches_accepted_unnotified_proposals() {
    let mut app = test_app();
    app.login_superuser();
    let speaker = app.create_speaker("Charles", None, Some("charles@example.com"));
    let accepted = app.create_proposal(speaker, "Accepted", true);
    let rejected = app.create_proposal(speaker, "Rejected", false);
    let already_told = app.create_proposal(speaker, "Already told", true);
    diesel::update(proposals::table)
        .filter(proposals::id.eq(already_told))
        .set(proposals::accepted_notified.eq(true))
        .execute(&mut app.conn)
        .unwrap();

    let response = bulk(&app.client, "acceptance", &[accepted, rejected, already_told]);
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(email_count(&mut app.conn), 1);
    assert!(proposal(&mut app.conn, accepted).accepted_notified);
    assert!(!proposal(&mut app.conn, rejected).accepted_notified);

    // sending again reaches nobody
    bulk(&app.client, "acceptance", &[accepted, rejected, already_told]);
    assert_eq!(email_count(&mut app.conn), 1);
}

#[test]
fn confirmation_marks_notified() {
    let mut app = test_app();
    app.login_superuser();
    let speaker = app.create_speaker("Charles", None, Some("charles@example.com"));
    let first = app.create_proposal(speaker, "First", false);
    let second = app.create_proposal(speaker, "Second", false);

    let response = bulk(&app.client, "confirmation", &[first]);
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(email_count(&mut app.conn), 1);
    assert!(proposal(&mut app.conn, first).notified);
    assert!(!proposal(&mut app.conn, second).notified);

    let response = app.client.get("/admin/proposals?notified=true").dispatch();
    let body = response.into_string().unwrap();
    assert!(body.contains("1 emails sent."));
    assert!(body.contains("First"));
    assert!(!body.contains("Second"));
}

#[test]
fn bad_bulk_requests_are_bounced() {
    let mut app = test_app();
    app.login_superuser();
    let speaker = app.create_speaker("Charles", None, Some("charles@example.com"));
    let id = app.create_proposal(speaker, "First", false);

    let response = bulk(&app.client, "delete", &[id]);
    assert_eq!(response.status(), Status::SeeOther);
    let response = app.client.get("/admin/proposals").dispatch();
    assert!(response.into_string().unwrap().contains("Unknown action."));

    let response = bulk(&app.client, "confirmation", &[]);
    assert_eq!(response.status(), Status::SeeOther);
    let response = app.client.get("/admin/proposals").dispatch();
    assert!(response
        .into_string()
        .unwrap()
        .contains("Select at least one proposal."));
    assert_eq!(email_count(&mut app.conn), 0);
}

#[test]
fn kinds_and_sections() {
    let mut app = test_app();
    app.login_superuser();

    let response = app
        .client
        .post("/admin/proposals/kinds")
        .header(ContentType::Form)
        .body("name=Workshop")
        .dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    let response = app
        .client
        .post("/admin/proposals/kinds")
        .header(ContentType::Form)
        .body("name=Workshop")
        .dispatch();
    assert_eq!(response.status(), Status::SeeOther);

    let kinds = proposal_kinds::table
        .select(proposal_kinds::name)
        .load::<String>(&mut app.conn)
        .unwrap();
    assert_eq!(kinds, vec!["Workshop".to_string()]);

    let response = app.client.get("/admin/proposals/kinds").dispatch();
    let body = response.into_string().unwrap();
    assert!(body.contains("already exists"));
    assert!(body.contains("Workshop"));

    let response = app
        .client
        .post("/admin/proposals/sections")
        .header(ContentType::Form)
        .body("name=Science&closed=true")
        .dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    let response = app.client.get("/admin/proposals/sections").dispatch();
    assert!(response.into_string().unwrap().contains("Science"));
}

#[test]
fn tags_are_listed_alphabetically() {
    let mut app = test_app();
    app.login_superuser();
    let speaker = app.create_speaker("Charles", None, Some("charles@example.com"));
    let tagged = app.create_proposal(speaker, "Tagged", false);

    for name in ["web", "python"] {
        let tag_id: i64 = diesel::insert_into(tags::table)
            .values(tags::name.eq(name))
            .returning(tags::id)
            .get_result(&mut app.conn)
            .unwrap();
        diesel::insert_into(proposal_tags::table)
            .values((
                proposal_tags::proposal_id.eq(tagged),
                proposal_tags::tag_id.eq(tag_id),
            ))
            .execute(&mut app.conn)
            .unwrap();
    }

    let response = app.client.get("/admin/proposals").dispatch();
    assert!(response.into_string().unwrap().contains("python, web"));

    let response = bulk(&app.client, "csv", &[tagged]);
    let body = response.into_string().unwrap();
    assert!(body.contains(",\"python, web\"\r\n"));
}
