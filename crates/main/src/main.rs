use conference::make_rocket;
use sentry_tracing::EventFilter;
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 0.1,
            ..Default::default()
        },
    )))
}

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    let sentry_guard = init_sentry();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,conference=debug"));
    let sentry_layer = sentry_guard.as_ref().map(|_| {
        sentry_tracing::layer().event_filter(|metadata| {
            match *metadata.level() {
                tracing::Level::ERROR => EventFilter::Event,
                tracing::Level::WARN | tracing::Level::INFO => {
                    EventFilter::Breadcrumb
                }
                _ => EventFilter::Ignore,
            }
        })
    });

    if let Err(e) = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .with(sentry_layer)
        .try_init()
    {
        eprintln!("could not install the tracing subscriber: {e}");
    }

    if sentry_guard.is_some() {
        tracing::info!("reporting errors to sentry");
    }

    make_rocket("sqlite.db").launch().await?;
    Ok(())
}
