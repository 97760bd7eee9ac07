//! Debug tracing for the driver and every compiler crate.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Selects the indented span-tree output instead of flat lines.
pub const LOG_TREE_ENV: &str = "KAL_LOG_TREE";

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=kal_codegen=debug`
/// or `RUST_LOG=debug`; add `KAL_LOG_TREE=1` for nested span output.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let tree = std::env::var_os(LOG_TREE_ENV).is_some();

        let tree_layer = tree.then(|| {
            tracing_tree::HierarchicalLayer::new(2)
                .with_writer(std::io::stderr)
                .with_targets(true)
                .with_bracketed_fields(true)
        });
        let flat_layer = (!tree).then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(tree_layer)
            .with(flat_layer)
            .init();
    });
}
