pub mod args;
pub mod recon;

/// Sets up the logger: `info` by default, `debug` when verbose.
/// `RUST_LOG` takes precedence when set.
pub fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
