//! Assigns every request an id and a `tracing` span, and reports how it
//! ended.

use rocket::{
    Data, Request, Response,
    fairing::{Fairing, Info, Kind},
    http::Status,
    request::{self, FromRequest},
};
use sentry::configure_scope;
use tracing::Span;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// A request's id: the client's `X-Request-Id` if it sent one, otherwise a
/// fresh UUID.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn request_id_of(request: &Request<'_>) -> RequestId {
    // `local_cache` runs the closure at most once per request, so every
    // caller sees the same id.
    request
        .local_cache(|| {
            RequestId(
                request
                    .headers()
                    .get_one(REQUEST_ID_HEADER)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
            )
        })
        .clone()
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequestId {
    type Error = ();

    async fn from_request(
        request: &'r Request<'_>,
    ) -> request::Outcome<Self, Self::Error> {
        request::Outcome::Success(request_id_of(request))
    }
}

/// The span opened for the current request. Handlers move blocking database
/// work into it with `Instrument` or `Span::enter`.
pub struct TracingSpan<T = Span>(pub T);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for TracingSpan {
    type Error = ();

    async fn from_request(
        request: &'r Request<'_>,
    ) -> request::Outcome<Self, ()> {
        match request.local_cache(|| TracingSpan::<Option<Span>>(None)) {
            TracingSpan(Some(span)) => {
                request::Outcome::Success(TracingSpan(span.to_owned()))
            }
            TracingSpan(None) => {
                request::Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

pub struct RequestTracer;

#[rocket::async_trait]
impl Fairing for RequestTracer {
    fn info(&self) -> Info {
        Info {
            name: "Request tracer",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let request_id = request_id_of(req);
        let user_agent = req.headers().get_one("User-Agent").unwrap_or("");

        let span = tracing::info_span!(
            "request",
            otel.name = %format!("{} {}", req.method(), req.uri().path()),
            http.method = %req.method(),
            http.uri = %req.uri().path(),
            http.user_agent = %user_agent,
            http.status_code = tracing::field::Empty,
            http.request_id = %request_id,
        );
        span.in_scope(|| {
            tracing::info!("received request");
            configure_scope(|scope| {
                scope.set_tag("request_id", &request_id);
            });
        });
        req.local_cache(|| TracingSpan::<Option<Span>>(Some(span)));
    }

    async fn on_response<'r>(
        &self,
        req: &'r Request<'_>,
        res: &mut Response<'r>,
    ) {
        let request_id = request_id_of(req);
        let status = res.status();

        if let Some(span) =
            req.local_cache(|| TracingSpan::<Option<Span>>(None)).0.clone()
        {
            let _entered = span.entered();
            Span::current().record("http.status_code", status.code);
            match status.code {
                500..=599 => tracing::error!("returning {status}"),
                400..=499 => tracing::warn!("returning {status}"),
                _ => tracing::info!("returning {status}"),
            }
        }

        res.set_raw_header(REQUEST_ID_HEADER, request_id.0);
    }
}
