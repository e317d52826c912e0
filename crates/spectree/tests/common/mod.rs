//! Shared setup for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TEST_SETUP: Once = Once::new();

/// Install a test-writer subscriber once per process. `RUST_LOG` controls the
/// level; it defaults to `debug` for this crate.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("spectree=debug"));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer().with_target(true))
            .with(env_filter)
            .try_init();
    });
}

/// Path of a Ginkgo fixture under `tests/fixtures/ginkgo`.
pub fn ginkgo_fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("ginkgo")
        .join(name)
}
