//! # Storage Budget Monitor
//!
//! Tracks how much of the medium's assumed capacity the application uses.
//!
//! Usage is the sum of the `prd-` values, measured the way browser storage
//! counts them (UTF-16 code units × 2), against a fixed limit (10 MiB unless
//! configured otherwise).
//!
//! | Percentage | [`UsageLevel`] |
//! |------------|----------------|
//! | `< 50`     | `Nominal`      |
//! | `50..80`   | `Caution`      |
//! | `>= 80`    | `Critical`     |
//!
//! Independently of the level, a [`StorageAlert`] is raised once usage passes
//! the warn threshold (80 % by default); it is a `Danger` alert above 95 %.
//!
//! The monitor samples on a fixed period through [`IntervalTimer`]; callers
//! also call [`StorageMonitor::report`] directly after every save.
//!
//! ## Overflow
//!
//! When a save fails with `STORAGE_FULL`, [`overflow_backup`] produces the
//! `prd-documents-backup.json` artifact holding the documents it is given:
//! the stored ones plus those whose save was refused
//! ([`crate::store::DocumentStore::unsaved_documents`]). Only after the
//! caller has written it and the user has confirmed does the caller clear
//! documents and the current pointer
//! ([`crate::store::DocumentStore::clear_documents`]). Preferences survive.

use crate::error::{PrdError, Result};
use crate::export::Artifact;
use crate::model::Documents;
use crate::store::{utf16_bytes, StorageBackend, KEY_PREFIX};
use serde::Serialize;
use std::time::{Duration, Instant};

pub const OVERFLOW_BACKUP_FILENAME: &str = "prd-documents-backup.json";
pub const DEFAULT_WARN_THRESHOLD: f64 = 80.0;
pub const DANGER_THRESHOLD: f64 = 95.0;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StorageStats {
    pub used: u64,
    pub limit: u64,
    pub percentage: f64,
    pub available: u64,
}

impl StorageStats {
    pub fn from_usage(used: u64, limit: u64) -> Self {
        let percentage = if limit == 0 {
            100.0
        } else {
            used as f64 / limit as f64 * 100.0
        };
        Self {
            used,
            limit,
            percentage,
            available: limit.saturating_sub(used),
        }
    }

    /// Sums every `prd-` value on the medium. Unreadable entries count as zero.
    pub fn measure<B: StorageBackend + ?Sized>(backend: &B, limit: u64) -> Self {
        let used = match backend.keys() {
            Ok(keys) => keys
                .iter()
                .filter(|key| key.starts_with(KEY_PREFIX))
                .filter_map(|key| backend.get(key).ok().flatten())
                .map(|value| utf16_bytes(&value))
                .sum(),
            Err(e) => {
                tracing::warn!("Failed to measure storage: {}", e);
                0
            }
        };
        Self::from_usage(used, limit)
    }

    pub fn level(&self) -> UsageLevel {
        UsageLevel::from_percentage(self.percentage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageLevel {
    Nominal,
    Caution,
    Critical,
}

impl UsageLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 50.0 {
            UsageLevel::Nominal
        } else if percentage < 80.0 {
            UsageLevel::Caution
        } else {
            UsageLevel::Critical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StorageAlert {
    pub severity: AlertSeverity,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageReport {
    pub stats: StorageStats,
    pub level: UsageLevel,
    pub alert: Option<StorageAlert>,
}

/// A restartable fixed-period timer driven by the caller's clock.
///
/// There is only ever one pending deadline: restarting replaces it.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    last: Option<Instant>,
}

impl IntervalTimer {
    /// A timer that is due immediately.
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// A timer whose first deadline is one period after `now`.
    pub fn started(period: Duration, now: Instant) -> Self {
        Self {
            period,
            last: Some(now),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn due(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.period,
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Replaces the period and restarts from `now`.
    pub fn reset(&mut self, period: Duration, now: Instant) {
        self.period = period;
        self.restart(now);
    }

    /// Returns true, and restarts, when the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.due(now) {
            self.restart(now);
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageMonitor {
    limit: u64,
    warn_threshold: f64,
    timer: IntervalTimer,
}

impl Default for StorageMonitor {
    fn default() -> Self {
        Self::new(
            crate::store::DEFAULT_CAPACITY,
            DEFAULT_WARN_THRESHOLD,
            DEFAULT_POLL_INTERVAL,
        )
    }
}

impl StorageMonitor {
    pub fn new(limit: u64, warn_threshold: f64, poll_interval: Duration) -> Self {
        Self {
            limit,
            warn_threshold,
            timer: IntervalTimer::new(poll_interval),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn measure<B: StorageBackend + ?Sized>(&self, backend: &B) -> StorageStats {
        StorageStats::measure(backend, self.limit)
    }

    pub fn evaluate(&self, stats: StorageStats) -> UsageReport {
        let alert = (stats.percentage > self.warn_threshold).then(|| StorageAlert {
            severity: if stats.percentage > DANGER_THRESHOLD {
                AlertSeverity::Danger
            } else {
                AlertSeverity::Warning
            },
            percentage: stats.percentage,
        });
        UsageReport {
            stats,
            level: stats.level(),
            alert,
        }
    }

    pub fn report<B: StorageBackend + ?Sized>(&self, backend: &B) -> UsageReport {
        self.evaluate(self.measure(backend))
    }

    /// A fresh report when the poll period has elapsed, otherwise None.
    pub fn poll<B: StorageBackend + ?Sized>(
        &mut self,
        now: Instant,
        backend: &B,
    ) -> Option<UsageReport> {
        self.timer.fire(now).then(|| self.report(backend))
    }

    pub fn restart(&mut self, now: Instant) {
        self.timer.restart(now);
    }
}

/// The download offered before clearing storage on overflow.
pub fn overflow_backup(docs: &Documents) -> Result<Artifact> {
    let json = serde_json::to_string_pretty(docs).map_err(PrdError::Serialization)?;
    Ok(Artifact {
        filename: OVERFLOW_BACKUP_FILENAME.to_string(),
        mime_type: "application/json".to_string(),
        bytes: json.into_bytes(),
    })
}
