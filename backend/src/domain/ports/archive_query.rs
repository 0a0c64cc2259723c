//! Driving port for archive reads.

use async_trait::async_trait;

use crate::domain::{ArchivalRecord, ArchiveId, Error, UserId};

/// Request for every archived report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListArchivedReportsRequest {
    /// Acting registrar or admin.
    pub actor: UserId,
}

/// Request for one archived report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetArchivedReportRequest {
    /// Acting registrar or admin.
    pub actor: UserId,
    /// Record to read.
    pub archive_id: ArchiveId,
}

/// An archival record with its comment texts decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedReportView {
    /// The stored record.
    pub record: ArchivalRecord,
    /// Comment texts in stored order; empty when the stored array is unreadable.
    pub comments: Vec<String>,
}

/// Driving port for archive read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveQuery: Send + Sync {
    /// List archival records, newest first.
    async fn list_archived_reports(
        &self,
        request: ListArchivedReportsRequest,
    ) -> Result<Vec<ArchivalRecord>, Error>;

    /// Fetch one record with decoded comments.
    async fn get_archived_report(
        &self,
        request: GetArchivedReportRequest,
    ) -> Result<ArchivedReportView, Error>;
}

/// Fixture query with an empty archive.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureArchiveQuery;

#[async_trait]
impl ArchiveQuery for FixtureArchiveQuery {
    async fn list_archived_reports(
        &self,
        _request: ListArchivedReportsRequest,
    ) -> Result<Vec<ArchivalRecord>, Error> {
        Ok(Vec::new())
    }

    async fn get_archived_report(
        &self,
        request: GetArchivedReportRequest,
    ) -> Result<ArchivedReportView, Error> {
        Err(Error::not_found(format!(
            "archived report {} not found",
            request.archive_id
        )))
    }
}
