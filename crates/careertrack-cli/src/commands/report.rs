use anyhow::Result;
use careertrack_application::SyncManager;
use careertrack_core::application::ApplicationStats;

use super::utils::{print_json, print_records};

pub fn follow_ups(manager: &SyncManager, json: bool) -> Result<()> {
    print_records(&manager.follow_ups(), json)
}

pub fn stats(manager: &SyncManager, json: bool) -> Result<()> {
    let stats = manager.stats();
    if json {
        return print_json(&stats);
    }
    println!("{}", render_stats(&stats));

    let counts = manager.status_counts();
    for (status, count) in &counts.by_status {
        println!("  {:<12} {}", status.label(), count);
    }
    Ok(())
}

fn render_stats(stats: &ApplicationStats) -> String {
    format!(
        "Total: {}  In progress: {}  Offers: {}  Rejected: {}  Needs follow-up: {}",
        stats.total, stats.in_progress, stats.offers, stats.rejected, stats.needs_follow_up
    )
}
