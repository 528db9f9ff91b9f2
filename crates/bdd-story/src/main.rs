//! Command line front end for story reports.
//!
//! Replays recorded runner transcripts, or walks feature files as a dry run,
//! and writes JSON and `JUnit` story reports.

mod cli;
mod config;
mod logging;
mod output;

fn main() -> eyre::Result<()> {
    cli::run()
}
