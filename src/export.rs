//! CSV export.
//!
//! Projects the aggregator's filtered complaint set (not the bucket views)
//! one row per complaint with a fixed column set.

use std::io::Write;

use crate::error::Result;
use crate::model::Complaint;

pub const CSV_HEADERS: [&str; 6] = [
    "ID",
    "Category",
    "Status",
    "College",
    "Urgency",
    "Submission Date",
];

/// Write the filtered set as CSV. Missing dates render as "N/A".
pub fn write_csv<W: Write>(complaints: &[Complaint], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADERS)?;

    for complaint in complaints {
        out.write_record(&[
            complaint.id.0.clone(),
            complaint.category.clone().unwrap_or_default(),
            complaint
                .status
                .map(|s| s.to_string())
                .unwrap_or_default(),
            complaint.college.clone().unwrap_or_default(),
            complaint
                .urgency
                .map(|u| u.to_string())
                .unwrap_or_default(),
            complaint
                .submission_date
                .map(|d| d.format("%-m/%-d/%Y").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        ])?;
    }

    out.flush()
        .map_err(|e| crate::error::Error::Other(format!("csv flush: {e}")))?;
    Ok(())
}

/// Render the filtered set as a CSV string.
pub fn to_csv_string(complaints: &[Complaint]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(complaints, &mut buf)?;
    String::from_utf8(buf).map_err(|e| crate::error::Error::Other(format!("csv utf8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComplaintId, Status, Urgency};
    use chrono::{TimeZone, Utc};

    #[test]
    fn renders_fixed_columns_and_na_dates() {
        let complaints = vec![
            Complaint {
                id: ComplaintId::from("C1"),
                category: Some("facilities".to_string()),
                status: Some(Status::Pending),
                urgency: Some(Urgency::High),
                submission_date: Some(Utc.with_ymd_and_hms(2025, 7, 9, 12, 0, 0).unwrap()),
                assigned_role: None,
                assigned_to: None,
                college: Some("Engineering".to_string()),
                details: serde_json::json!({}),
            },
            Complaint {
                id: ComplaintId::from("C2"),
                category: None,
                status: None,
                urgency: None,
                submission_date: None,
                assigned_role: None,
                assigned_to: None,
                college: None,
                details: serde_json::json!({}),
            },
        ];

        let csv = to_csv_string(&complaints).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID,Category,Status,College,Urgency,Submission Date"
        );
        assert_eq!(
            lines.next().unwrap(),
            "C1,facilities,pending,Engineering,high,7/9/2025"
        );
        assert_eq!(lines.next().unwrap(), "C2,,,,,N/A");
    }
}
