//! Console rendering of a finished run
//!
//! The chat message keeps Slack mrkdwn; the console copy drops the code
//! fences around AI output so it reads cleanly in a CI log.

use crate::pipeline::{RunOutcome, RunSummary};

const FENCE: &str = "```";

/// Text printed to stdout once a run is over
pub fn render_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Completed(summary) => render_summary(summary),
        RunOutcome::ListingUnavailable { error, .. } => format!(
            "--- Final Summary ---\nCould not fetch the compose listing: {}\n\
             Inspection aborted.\n",
            error
        ),
    }
}

fn render_summary(summary: &RunSummary) -> String {
    let mut out = format!("--- Final Summary ({}) ---\n", summary.date);

    let failures: Vec<String> = summary
        .failures()
        .map(|report| report.to_string().replace(FENCE, ""))
        .collect();

    if failures.is_empty() {
        out.push_str("All composes finished or are in progress.\n");
        out.push_str("Inspection finished successfully.\n");
    } else {
        for failure in &failures {
            out.push_str(failure);
            out.push_str("\n\n");
        }
        out.push_str("Inspection finished with failures.\n");
    }
    out
}
