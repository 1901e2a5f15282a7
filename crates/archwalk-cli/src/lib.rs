//! archwalk CLI - command line tools standing in for the mobile caller.
//!
//! Binaries:
//! - derive_route: order a walk from a JSON file
//! - replay_session: feed a recorded sensor log through position fusion
//! - route_stress: time the route engine on random waypoint sets

pub mod config;
pub mod sim;

pub use config::Config;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber on stderr so stdout stays machine-readable.
///
/// `RUST_LOG` is honoured; `directive` is added on top of it.
pub fn init_tracing(directive: &str) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?))
        .try_init()?;
    Ok(())
}
