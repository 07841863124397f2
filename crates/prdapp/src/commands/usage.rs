use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::monitor::{AlertSeverity, StorageMonitor, UsageReport};
use crate::store::{DocumentStore, StorageBackend};

/// The warning a controller shows for a report, if any.
pub fn alert_message(report: &UsageReport) -> Option<CmdMessage> {
    let alert = report.alert?;
    let text = format!("Storage is {:.1}% full", alert.percentage);
    Some(match alert.severity {
        AlertSeverity::Warning => CmdMessage::warning(format!(
            "{}. Consider exporting and deleting old documents.",
            text
        )),
        AlertSeverity::Danger => CmdMessage::error(format!(
            "{}. New saves may fail; export a backup now.",
            text
        )),
    })
}

pub fn run<B: StorageBackend>(
    store: &DocumentStore<B>,
    monitor: &StorageMonitor,
) -> Result<CmdResult> {
    let report = monitor.report(store.backend());
    let mut result = CmdResult::default();
    if let Some(message) = alert_message(&report) {
        result.add_message(message);
    }
    result.usage = Some(report);
    Ok(result)
}
