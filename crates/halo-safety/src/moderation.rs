//! Moderation requests - reporting and blocking
//!
//! HALO builds and validates the requests; delivering them to the
//! moderation backend is the host's job, through a [`ModerationSink`].

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use halo_core::{ContentId, HaloError, HaloResult, MessageId, SafetyConfig, Viewer, ViewerId};

use crate::sanitize_input;

/// What is being reported
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ReportTarget {
    Stream(ContentId),
    User(ViewerId),
    Message(MessageId),
}

/// A viewer's report against a stream, user or message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReport {
    pub reporter: ViewerId,
    pub target: ReportTarget,
    pub reason: String,
    pub submitted_at: DateTime<Utc>,
}

/// A viewer's request to block another user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRequest {
    pub viewer: ViewerId,
    pub blocked: ViewerId,
    pub submitted_at: DateTime<Utc>,
}

/// Delivery of moderation requests to whatever backend the host uses
pub trait ModerationSink {
    fn submit_report(&self, report: &ContentReport) -> HaloResult<()>;
    fn submit_block(&self, block: &BlockRequest) -> HaloResult<()>;
}

/// Sink that only logs
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ModerationSink for TracingSink {
    fn submit_report(&self, report: &ContentReport) -> HaloResult<()> {
        info!(
            reporter = %report.reporter,
            target = ?report.target,
            reason = %report.reason,
            at = %report.submitted_at,
            "content reported"
        );
        Ok(())
    }

    fn submit_block(&self, block: &BlockRequest) -> HaloResult<()> {
        info!(
            viewer = %block.viewer,
            blocked = %block.blocked,
            at = %block.submitted_at,
            "user blocked"
        );
        Ok(())
    }
}

/// Sink that keeps requests in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<ContentReport>>,
    blocks: Mutex<Vec<BlockRequest>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn reports(&self) -> Vec<ContentReport> {
        self.reports.lock().clone()
    }

    pub fn blocks(&self) -> Vec<BlockRequest> {
        self.blocks.lock().clone()
    }
}

impl ModerationSink for MemorySink {
    fn submit_report(&self, report: &ContentReport) -> HaloResult<()> {
        self.reports.lock().push(report.clone());
        Ok(())
    }

    fn submit_block(&self, block: &BlockRequest) -> HaloResult<()> {
        self.blocks.lock().push(block.clone());
        Ok(())
    }
}

impl<S: ModerationSink + ?Sized> ModerationSink for &S {
    fn submit_report(&self, report: &ContentReport) -> HaloResult<()> {
        (**self).submit_report(report)
    }

    fn submit_block(&self, block: &BlockRequest) -> HaloResult<()> {
        (**self).submit_block(block)
    }
}

/// Validates moderation requests and hands them to a sink
#[derive(Debug)]
pub struct Moderation<S> {
    config: SafetyConfig,
    sink: S,
}

impl<S: ModerationSink> Moderation<S> {
    pub fn new(config: SafetyConfig, sink: S) -> Self {
        Moderation { config, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Report a stream, user or message on behalf of `reporter`
    pub fn report(
        &self,
        reporter: Option<&Viewer>,
        target: ReportTarget,
        reason: &str,
        at: DateTime<Utc>,
    ) -> HaloResult<ContentReport> {
        if !self.config.enable_reporting {
            return Err(HaloError::FeatureDisabled("reporting"));
        }
        let reporter = reporter.ok_or(HaloError::NotAuthenticated)?;

        let reason = sanitize_input(reason, self.config.max_message_length);
        if reason.is_empty() {
            return Err(HaloError::invalid_input("report reason is empty"));
        }

        let report = ContentReport {
            reporter: reporter.id,
            target,
            reason,
            submitted_at: at,
        };
        self.sink.submit_report(&report)?;
        Ok(report)
    }

    /// Block `blocked` on behalf of `viewer`
    pub fn block(
        &self,
        viewer: Option<&Viewer>,
        blocked: ViewerId,
        at: DateTime<Utc>,
    ) -> HaloResult<BlockRequest> {
        if !self.config.enable_blocking {
            return Err(HaloError::FeatureDisabled("blocking"));
        }
        let viewer = viewer.ok_or(HaloError::NotAuthenticated)?;
        if viewer.id == blocked {
            return Err(HaloError::SelfBlock);
        }

        let request = BlockRequest {
            viewer: viewer.id,
            blocked,
            submitted_at: at,
        };
        self.sink.submit_block(&request)?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn viewer(id: u64) -> Viewer {
        Viewer::new(ViewerId::new(id))
    }

    #[test]
    fn test_report_reaches_sink() {
        let moderation = Moderation::new(SafetyConfig::default(), MemorySink::new());
        let report = moderation
            .report(
                Some(&viewer(1)),
                ReportTarget::Stream(ContentId::new(10)),
                "  harassment in chat  ",
                at(),
            )
            .unwrap();

        assert_eq!(report.reason, "harassment in chat");
        assert_eq!(moderation.sink().reports(), vec![report]);
    }

    #[test]
    fn test_report_requires_viewer_and_reason() {
        let moderation = Moderation::new(SafetyConfig::default(), MemorySink::new());
        let target = ReportTarget::User(ViewerId::new(2));

        assert_eq!(
            moderation.report(None, target, "spam", at()),
            Err(HaloError::NotAuthenticated)
        );
        assert!(matches!(
            moderation.report(Some(&viewer(1)), target, "   ", at()),
            Err(HaloError::InvalidInput(_))
        ));
        assert!(moderation.sink().reports().is_empty());
    }

    #[test]
    fn test_disabled_features() {
        let config = SafetyConfig {
            enable_reporting: false,
            enable_blocking: false,
            ..SafetyConfig::default()
        };
        let moderation = Moderation::new(config, TracingSink);
        let target = ReportTarget::Message(MessageId::new(5));

        assert_eq!(
            moderation.report(Some(&viewer(1)), target, "spam", at()),
            Err(HaloError::FeatureDisabled("reporting"))
        );
        assert_eq!(
            moderation.block(Some(&viewer(1)), ViewerId::new(2), at()),
            Err(HaloError::FeatureDisabled("blocking"))
        );
    }

    #[test]
    fn test_block() {
        let sink = MemorySink::new();
        let moderation = Moderation::new(SafetyConfig::default(), &sink);

        let request = moderation.block(Some(&viewer(1)), ViewerId::new(2), at()).unwrap();
        assert_eq!(request.blocked, ViewerId::new(2));
        assert_eq!(
            moderation.block(Some(&viewer(1)), ViewerId::new(1), at()),
            Err(HaloError::SelfBlock)
        );
        assert_eq!(sink.blocks().len(), 1);
    }

    #[test]
    fn test_report_target_serialization() {
        let json = serde_json::to_value(ReportTarget::Stream(ContentId::new(3))).unwrap();
        assert_eq!(json, serde_json::json!({"type": "stream", "id": 3}));
    }
}
