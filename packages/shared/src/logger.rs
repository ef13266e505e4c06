//! Logging setup utilities for the Atelier binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the calling package and the binary itself, e.g.
/// `atelier_server=debug,atelier_server=debug` for the server binary.
/// `RUST_LOG` takes precedence when set.
///
/// # Arguments
///
/// * `package_name` - The package name of the binary (`env!("CARGO_PKG_NAME")`)
/// * `binary_name` - The name of the binary (`env!("CARGO_BIN_NAME")`)
/// * `default_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use atelier_shared::logger::setup_logger;
///
/// setup_logger("atelier-server", "atelier-server", "debug");
/// ```
pub fn setup_logger(package_name: &str, binary_name: &str, default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(package_name, binary_name, default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(package_name: &str, binary_name: &str, level: &str) -> String {
    format!(
        "{}={},{}={},atelier_shared={},tower_http={}",
        package_name.replace('-', "_"),
        level,
        binary_name.replace('-', "_"),
        level,
        level,
        level
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_normalizes_crate_names() {
        // テスト項目: ハイフンを含むクレート名がアンダースコアに変換される
        // given (前提条件):
        let package = "atelier-server";

        // when (操作):
        let filter = default_filter(package, "atelier-server", "info");

        // then (期待する結果):
        assert!(filter.starts_with("atelier_server=info,atelier_server=info"));
        assert!(filter.contains("tower_http=info"));
    }
}
