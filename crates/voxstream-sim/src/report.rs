use std::path::Path;

use crate::runner::SoakResult;

/// Save a soak result as pretty-printed JSON.
pub fn save_result(path: &Path, result: &SoakResult) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(result).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Format a result as two markdown tables: world counters and tick timings.
pub fn format_markdown(result: &SoakResult) -> String {
    let s = &result.stats;
    let t = &result.ticks_profile;
    let mut out = String::new();

    out.push_str("| Ticks | Loaded | Modified | Dispatched | Completed | Discarded | Resubmitted | Evicted | Persisted | Edits | Rejected |\n");
    out.push_str("|-------|--------|----------|------------|-----------|-----------|-------------|---------|-----------|-------|----------|\n");
    out.push_str(&format!(
        "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
        result.ticks,
        result.loaded_chunks,
        result.modified_chunks,
        s.dispatched,
        s.completed,
        s.discarded,
        s.resubmitted,
        s.evicted,
        s.persisted,
        s.edits,
        s.rejected_edits,
    ));

    out.push('\n');
    out.push_str("| Tick mean (ms) | P50 (ms) | P99 (ms) | Max (ms) | Over frame | Peak in flight |\n");
    out.push_str("|----------------|----------|----------|----------|------------|----------------|\n");
    out.push_str(&format!(
        "| {:.3} | {:.3} | {:.3} | {:.3} | {} | {} |\n",
        t.mean_ms, t.p50_ms, t.p99_ms, t.max_ms, t.over_frame, result.peak_in_flight,
    ));

    if !result.settled {
        out.push_str("\nWARNING: builds were still pending at shutdown.\n");
    }
    if s.persist_failures > 0 || s.presentation_failures > 0 {
        out.push_str(&format!(
            "\nFailures: {} persist, {} presentation\n",
            s.persist_failures, s.presentation_failures
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TickProfile;
    use voxstream_world::WorldStats;

    fn sample() -> SoakResult {
        SoakResult {
            ticks: 10,
            final_position: [100.0, 0.0, 0.0],
            loaded_chunks: 9,
            modified_chunks: 1,
            edits_accepted: 2,
            edits_rejected: 0,
            settled: true,
            persisted_on_shutdown: 1,
            peak_in_flight: 8,
            stats: WorldStats {
                dispatched: 12,
                completed: 11,
                discarded: 1,
                ..WorldStats::default()
            },
            ticks_profile: TickProfile {
                mean_ms: 0.5,
                p50_ms: 0.4,
                p99_ms: 1.2,
                max_ms: 20.0,
                over_frame: 1,
            },
        }
    }

    #[test]
    fn test_format_markdown() {
        let md = format_markdown(&sample());
        assert!(md.contains("| 10 | 9 | 1 | 12 | 11 | 1 |"));
        assert!(md.contains("| 0.500 | 0.400 | 1.200 | 20.000 | 1 | 8 |"));
        assert!(!md.contains("WARNING"));
        assert!(!md.contains("Failures"));
    }

    #[test]
    fn test_format_markdown_flags_unsettled() {
        let mut result = sample();
        result.settled = false;
        result.stats.persist_failures = 2;
        let md = format_markdown(&result);
        assert!(md.contains("WARNING"));
        assert!(md.contains("Failures: 2 persist, 0 presentation"));
    }

    #[test]
    fn test_save_result_writes_json() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("out").join("soak.json");
        save_result(&path, &sample()).expect("save");

        let text = std::fs::read_to_string(&path).expect("read");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["ticks"], 10);
        assert_eq!(value["stats"]["dispatched"], 12);
    }
}
