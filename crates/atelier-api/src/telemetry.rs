//! Tracing subscriber setup.
//!
//! Console output is compact for local work; production switches to JSON
//! lines so the log collector gets structured fields.

use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

pub fn init_telemetry(environment: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "atelier=debug,tower_http=debug".into());

    let is_production = environment == "production" || environment == "prod";
    if is_production {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        let console_fmt = tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(console_fmt)
            .init();
    }
}
