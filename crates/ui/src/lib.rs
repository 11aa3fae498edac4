use db::user::User;
use maud::{html, Markup, DOCTYPE};
use rocket::request::FlashMessage;

/// Renders a flash message left by the previous request, if any. Messages
/// with kind `success` are green, everything else is shown as an error.
pub fn flash_message(flash: Option<FlashMessage<'_>>) -> Markup {
    html! {
        @if let Some(flash) = flash {
            @let class = match flash.kind() {
                "success" => "alert alert-success",
                "info" => "alert alert-info",
                _ => "alert alert-danger",
            };
            div class=(class) role="alert" {
                (flash.message())
            }
        }
    }
}

/// Renders an HTML page with the provided body markup, titled with the
/// configured site name.
pub fn page_of_body(body: Markup, user: Option<User>, site_name: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                title { (site_name) }
                link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet" integrity="sha384-QWTKZyjpPEjISv5WaRU9OFeRpok6YctnYmDr5pNlyT2bRjXh0JMhjY6hW+ALEwIH" crossorigin="anonymous" {}
                meta name="viewport" content="width=device-width, initial-scale=1" {}
            }
            body {
                nav class="navbar navbar-expand" style="background-color: #1F4E79" data-bs-theme="dark" {
                    div class="container-fluid" {
                        ul class="nav nav-justify-start" data-bs-theme="dark" {
                            li class="nav-item" {
                                a class="nav-link text-white" href="/" { "Home" }
                            }
                            li class="nav-item" {
                                a class="nav-link text-white" href="/schedule" { "Schedule" }
                            }
                        }
                        ul class="nav nav-justify-end" data-bs-theme="dark" {
                            @if let Some(user) = &user {
                                @if user.is_superuser {
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/admin" { "Admin" }
                                    }
                                }
                                li class="nav-item" {
                                    a class="nav-link text-white" href="/attendees/profile" { "Profile" }
                                }
                                li class="nav-item" {
                                    a class="nav-link text-white" href="/logout" { "Logout" }
                                }
                            } @else {
                                li class="nav-item" {
                                    a class="nav-link text-white" href="/attendees/sign-in" { "Sign in" }
                                }
                            }
                        }
                    }
                }
                div class="container" {
                    div class="mt-4" {
                        (body)
                    }
                }
            }
        }
    }
}

fn error_page(
    code: u16,
    heading: &str,
    lead: &str,
    error: Option<String>,
    user: Option<User>,
    site_name: &str,
) -> Markup {
    page_of_body(
        html! {
            div class="text-center" {
                h1 class="display-1 text-danger" { (code) }
                h2 class="mb-4" { (heading) }
                p class="lead" { (lead) }
                @if let Some(err) = error {
                    div class="alert alert-danger" role="alert" {
                        (err)
                    }
                }
                a class="btn btn-danger" href="/" { "Return Home" }
            }
        },
        user,
        site_name,
    )
}

pub fn error_403<T: ToString>(
    error: Option<T>,
    user: Option<User>,
    site_name: &str,
) -> Markup {
    error_page(
        403,
        "Forbidden",
        "You don't have permission to access this resource.",
        error.map(|e| e.to_string()),
        user,
        site_name,
    )
}

pub fn error_404<T: ToString>(
    error: Option<T>,
    user: Option<User>,
    site_name: &str,
) -> Markup {
    error_page(
        404,
        "Not found",
        "The page you asked for does not exist.",
        error.map(|e| e.to_string()),
        user,
        site_name,
    )
}

pub fn error_500(user: Option<User>, site_name: &str) -> Markup {
    error_page(
        500,
        "Internal server error",
        "Something went wrong on our side. Please try again later.",
        None,
        user,
        site_name,
    )
}

pub fn page_title<T: ToString>(title: T) -> Markup {
    html! {
        div class="col-md m-3 h2 d-flex align-items-center" {
            h1 { (title.to_string()) }
        }
    }
}
