//! Core data model.
//!
//! Complaints and notifications are produced by external feeds and are
//! read-only here. Free-text detail fields ride in an opaque JSON map and
//! are only read through an extraction profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Complaint
// ---------------------------------------------------------------------------

/// A complaint record as read from the upstream store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    /// Unique identifier (upstream document id).
    pub id: ComplaintId,

    /// Category slug (e.g. "facilities"). Absent counts as "Unknown".
    #[serde(default)]
    pub category: Option<String>,

    /// Lifecycle status. Absent counts as pending.
    #[serde(default)]
    pub status: Option<Status>,

    /// Stored urgency field, used by analytics and export. The triage
    /// engine ignores this and classifies fresh from text every run.
    #[serde(default)]
    pub urgency: Option<Urgency>,

    /// When the complaint was filed. Absent is treated as epoch 0 for
    /// filtering and rendered as "N/A".
    #[serde(default)]
    pub submission_date: Option<DateTime<Utc>>,

    /// Role the complaint is assigned to, if claimed.
    #[serde(default)]
    pub assigned_role: Option<String>,

    /// Assignee identity, compared case-insensitively.
    #[serde(default)]
    pub assigned_to: Option<String>,

    /// Submitter's college, passed through to the CSV projection.
    #[serde(default)]
    pub college: Option<String>,

    /// Remaining fields, including the free-text descriptions. The core
    /// doesn't interpret these field-by-field; see [`crate::extract`].
    #[serde(flatten)]
    pub details: serde_json::Value,
}

impl Complaint {
    /// Submission date with the missing-date fallback applied.
    pub fn effective_date(&self) -> DateTime<Utc> {
        self.submission_date.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Newtype for complaint IDs. Opaque strings from the upstream store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComplaintId(pub String);

impl std::fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComplaintId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Complaint lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Resolved => "resolved",
            Status::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "in-progress" | "in progress" => Ok(Status::InProgress),
            "resolved" => Ok(Status::Resolved),
            "closed" => Ok(Status::Closed),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

/// Severity classification of a complaint's text content.
///
/// Ordered: Low < Medium < High < Critical. Stored records carry the
/// lowercase form; the external classifier answers with the capitalized
/// form. Serde accepts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "low", alias = "Low")]
    Low,
    #[serde(rename = "medium", alias = "Medium")]
    Medium,
    #[serde(rename = "high", alias = "High")]
    High,
    #[serde(rename = "critical", alias = "Critical")]
    Critical,
}

impl Urgency {
    /// Does this classification qualify for the urgent queue?
    pub fn is_urgent(self) -> bool {
        matches!(self, Urgency::High | Urgency::Critical)
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            "critical" => Ok(Urgency::Critical),
            other => Err(format!("unknown urgency: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Visibility scope
// ---------------------------------------------------------------------------

/// A viewer's visibility rule, constructed once at session start and passed
/// into the triage engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Admin view: unassigned complaints only. Anything carrying an
    /// assigned role or assignee is considered already claimed.
    Unscoped,
    /// Staff view: complaints assigned to this role, and (when both sides
    /// are non-empty) to this identity.
    Scoped { role: String, identity: String },
}

impl Scope {
    /// Build a staff scope. Role and identity comparisons are
    /// case-insensitive, so both are normalized here.
    pub fn scoped(role: impl Into<String>, identity: impl Into<String>) -> Self {
        Scope::Scoped {
            role: role.into().to_lowercase(),
            identity: identity.into().to_lowercase(),
        }
    }

    /// Does this scope admit the given complaint?
    pub fn admits(&self, complaint: &Complaint) -> bool {
        let assigned_role = complaint.assigned_role.as_deref().unwrap_or("");
        let assigned_to = complaint.assigned_to.as_deref().unwrap_or("");

        match self {
            Scope::Unscoped => assigned_role.is_empty() && assigned_to.is_empty(),
            Scope::Scoped { role, identity } => {
                if assigned_role.to_lowercase() != *role {
                    return false;
                }
                if !identity.is_empty()
                    && !assigned_to.is_empty()
                    && assigned_to.to_lowercase() != *identity
                {
                    return false;
                }
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Triage queue entry
// ---------------------------------------------------------------------------

/// Derived view produced by a triage run. Rebuilt fresh every run,
/// never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    pub complaint_id: ComplaintId,
    /// First 120 chars of the extracted text.
    pub snippet: String,
    pub category: Option<String>,
    pub submission_date: Option<DateTime<Utc>>,
    /// Classified urgency, always High or Critical here.
    pub urgency: Urgency,
    /// Full source record.
    pub complaint: Complaint,
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A notification from the external feed. Read-only to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// Used both for ordering and for unread comparison.
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Source complaint this notification refers to.
    #[serde(default)]
    pub complaint_id: Option<ComplaintId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "status", alias = "status-change")]
    StatusChange,
    #[serde(rename = "feedback")]
    Feedback,
}

// ---------------------------------------------------------------------------
// Category labels
// ---------------------------------------------------------------------------

/// Display label for a category slug. Unknown slugs pass through unchanged.
pub fn category_label(slug: &str) -> &str {
    match slug {
        "academic" => "Academic",
        "faculty-conduct" => "Faculty Conduct",
        "facilities" => "Facilities",
        "administrative-student-services" => "Admin/Student Services",
        "other" => "Other",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_accepts_both_stored_and_classifier_forms() {
        let stored: Urgency = serde_json::from_str(r#""high""#).unwrap();
        let classified: Urgency = serde_json::from_str(r#""High""#).unwrap();
        assert_eq!(stored, classified);
        assert_eq!(serde_json::to_string(&stored).unwrap(), r#""high""#);
    }

    #[test]
    fn urgency_ordering_follows_severity() {
        assert!(Urgency::Low < Urgency::Medium);
        assert!(Urgency::Medium < Urgency::High);
        assert!(Urgency::High < Urgency::Critical);
        assert!(!Urgency::Medium.is_urgent());
        assert!(Urgency::Critical.is_urgent());
    }

    #[test]
    fn unscoped_never_admits_assigned_complaints() {
        let mut complaint: Complaint = serde_json::from_value(serde_json::json!({
            "id": "C1",
        }))
        .unwrap();
        assert!(Scope::Unscoped.admits(&complaint));

        complaint.assigned_role = Some("staff".to_string());
        assert!(!Scope::Unscoped.admits(&complaint));
        assert!(Scope::scoped("staff", "").admits(&complaint));
    }
}
