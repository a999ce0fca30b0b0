use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install the global logger on stderr.
///
/// `verbose` lowers the default level from info to debug; `RUST_LOG`
/// overrides either.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    // Fails only when a logger is already installed.
    let _ = Builder::from_env(env).format_timestamp(None).try_init();
}
