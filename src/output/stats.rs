//! Human-readable sweep statistics

use crate::monitor::SweepStats;
use std::io::{self, Write};

/// Writes the sweep summary block
pub fn write_sweep_stats<W: Write>(out: &mut W, stats: &SweepStats) -> io::Result<()> {
    writeln!(out, "=== Sweep Statistics ===\n")?;

    writeln!(out, "Sources:")?;
    writeln!(out, "  Checked: {}", stats.checked)?;
    writeln!(out, "  Unchanged: {}", stats.unchanged)?;
    writeln!(out, "  Changed: {}", stats.changed)?;
    writeln!(out, "  Errors: {}", stats.errors)?;
    writeln!(out)?;

    if stats.changed > 0 {
        writeln!(out, "Reviews:")?;
        writeln!(out, "  Diff complete: {}", stats.diff_complete)?;
        writeln!(out, "  Diff failed: {}", stats.diff_failed)?;
        writeln!(out)?;
    }

    let reachable = stats.checked - stats.errors.min(stats.checked);
    let reachable_rate = if stats.checked > 0 {
        (reachable as f64 / stats.checked as f64) * 100.0
    } else {
        0.0
    };
    writeln!(
        out,
        "Reachable: {:.1}% ({} / {} sources checked)",
        reachable_rate, reachable, stats.checked
    )
}

/// Prints the sweep summary to stdout
pub fn print_sweep_stats(stats: &SweepStats) -> io::Result<()> {
    write_sweep_stats(&mut io::stdout().lock(), stats)
}
