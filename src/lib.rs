pub mod config;
pub mod dns;
pub mod engine;
pub mod model;
pub mod repository;

pub use config::Config;
pub use engine::FlowInspector;
pub use model::context::{Direction, FlowContext, FlowDecision, FlowType, PathDecision};
pub use model::ip::FlowIp;

#[cfg(test)]
pub(crate) fn init_logs() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, registry, EnvFilter};

    let _ = registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("{}=debug", env!("CARGO_PKG_NAME")).into()
        }))
        .with(fmt::layer().with_ansi(cfg!(debug_assertions)))
        .try_init();
}
