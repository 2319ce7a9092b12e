//! Column-level vocabulary: which issue and project fields an edit can set,
//! and which issue columns a view may group on.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// Issue columns settable through a partial edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueField {
    /// `title`
    Title,
    /// `status`
    Status,
    /// `team_id`
    TeamId,
    /// `owner_id`
    OwnerId,
    /// `priority`
    Priority,
    /// `content`
    Content,
    /// `project_id`
    ProjectId,
    /// `label`
    Label,
    /// `start_date`
    StartDate,
    /// `end_date`
    EndDate,
}

impl IssueField {
    /// Column name in the `issues` table, also used as the wire field label.
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Status => "status",
            Self::TeamId => "team_id",
            Self::OwnerId => "owner_id",
            Self::Priority => "priority",
            Self::Content => "content",
            Self::ProjectId => "project_id",
            Self::Label => "label",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
        }
    }
}

impl fmt::Display for IssueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Project columns that change through `project_updated`.
///
/// Name, leader and membership have their own events and store calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectField {
    /// `workspace_id`
    WorkspaceId,
    /// `status`
    Status,
    /// `priority`
    Priority,
    /// `label`
    Label,
    /// `start_date`
    StartDate,
    /// `end_date`
    EndDate,
}

impl ProjectField {
    /// Column name in the `projects` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::WorkspaceId => "workspace_id",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Label => "label",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
        }
    }
}

impl fmt::Display for ProjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Issue attribute a view can group on.
///
/// Closed set: the name becomes a column in generated SQL, so anything
/// outside it is refused at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    /// `status`
    Status,
    /// `priority`
    Priority,
    /// `label`
    Label,
    /// `project_id`
    ProjectId,
    /// `owner_id`
    OwnerId,
}

impl Dimension {
    /// Issue column grouped on.
    pub fn column(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Label => "label",
            Self::ProjectId => "project_id",
            Self::OwnerId => "owner_id",
        }
    }

    /// Parse an ordered group-by list. Unknown names are rejected; a
    /// repeated name keeps its first position.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>, DomainError> {
        let mut dims = Vec::with_capacity(names.len());
        for name in names {
            let dim: Self = name.as_ref().parse()?;
            if !dims.contains(&dim) {
                dims.push(dim);
            }
        }
        Ok(dims)
    }
}

impl FromStr for Dimension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "label" => Ok(Self::Label),
            "project_id" => Ok(Self::ProjectId),
            "owner_id" => Ok(Self::OwnerId),
            other => Err(DomainError::UnknownDimension(other.to_owned())),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDateTime, DomainError> {
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(d.and_time(chrono::NaiveTime::MIN));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .map_err(|_| DomainError::InvalidDate {
            field,
            value: value.to_owned(),
        })
}

/// Validate an optional start/end pair.
///
/// Each present value must parse; when both are present the end may not
/// precede the start.
pub fn check_date_range(start: Option<&str>, end: Option<&str>) -> Result<(), DomainError> {
    let s = start.map(|v| parse_date("start_date", v)).transpose()?;
    let e = end.map(|v| parse_date("end_date", v)).transpose()?;
    if let (Some(s), Some(e)) = (s, e) {
        if e < s {
            return Err(DomainError::InvertedDateRange {
                start: start.unwrap_or_default().to_owned(),
                end: end.unwrap_or_default().to_owned(),
            });
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
