//! CLI subcommand implementations for the navscope binary.

pub mod discover_cmd;
pub mod doctor;
pub mod fetch_cmd;
pub mod run_cmd;

/// Whether `--quiet` was passed (set as an env var so all modules can check).
pub fn is_quiet() -> bool {
    std::env::var("NAVSCOPE_QUIET").is_ok()
}
