use tracing_subscriber::EnvFilter;

/// Workspace crate targets that receive log output.
const CRATE_TARGETS: &[&str] = &[
    "nino",
    "nino_calendar",
    "nino_eof",
    "nino_grid",
    "nino_io",
    "nino_pipeline",
    "nino_stats",
];

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing on stderr from the `-v` count.
///
/// 0 is warn, 1 info, 2 debug and 3 or more trace. A set `RUST_LOG`
/// overrides the flag.
pub fn init(verbosity: u8) {
    let level = level(verbosity);
    let default_filter = CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
