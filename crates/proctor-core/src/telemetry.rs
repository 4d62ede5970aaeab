//! Log setup shared by `proctor` and `proctord`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Checked before `RUST_LOG`.
pub const LOG_ENV: &str = "PROCTOR_LOG";

/// Directives used when neither `PROCTOR_LOG` nor `RUST_LOG` is set. The
/// store and HTTP client stay at `warn` unless `level` is `trace`.
fn default_directives(level: Level) -> String {
    if level == Level::TRACE {
        return level.as_str().to_lowercase();
    }
    format!("{},surrealdb=warn,reqwest=warn", level.as_str().to_lowercase())
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber; a second call is a no-op.
pub fn init_tracing(json: bool, level: Level) {
    let plain = (!json).then(|| fmt::layer().with_target(false));
    let structured = json.then(|| fmt::layer().with_target(false).json());
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(plain)
        .with(structured)
        .try_init()
        .ok();
}
