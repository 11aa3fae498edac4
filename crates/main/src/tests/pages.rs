use rocket::http::Status;

use super::{test_app, test_app_named};

#[test]
fn pages_are_titled_with_the_site_name() {
    let app = test_app_named(Some("PyConES 2016"));

    let response = app.client.get("/").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert!(response
        .into_string()
        .unwrap()
        .contains("<title>PyConES 2016</title>"));

    // error pages too
    let response = app.client.get("/schedule").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert!(response
        .into_string()
        .unwrap()
        .contains("<title>PyConES 2016</title>"));

    let response = app.client.get("/login").dispatch();
    assert!(response
        .into_string()
        .unwrap()
        .contains("<title>PyConES 2016</title>"));
}

#[test]
fn default_site_name() {
    let app = test_app();
    let response = app.client.get("/").dispatch();
    assert!(response
        .into_string()
        .unwrap()
        .contains("<title>Conference</title>"));
}
