//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `movetrack_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use movetrack_core::{OptionLists, SessionService};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Why: keep a tiny CLI probe to validate core crate wiring independently
    // from any UI runtime setup.
    println!("movetrack_core ping={}", movetrack_core::ping());
    println!("movetrack_core version={}", movetrack_core::core_version());

    match store_probe() {
        Ok(rows) => {
            println!("movetrack_core store_probe snapshot_rows={rows}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("movetrack_core store_probe error={err}");
            ExitCode::FAILURE
        }
    }
}

/// Opens an in-memory store and reads the snapshot through the session
/// facade, proving migrations and readiness probes end to end.
fn store_probe() -> Result<usize, Box<dyn Error>> {
    let session = SessionService::open_in_memory(OptionLists::default())?;
    let snapshot = session.get_snapshot()?;
    Ok(snapshot.len())
}
