//! HTML rendering of the sign-off report sent on completion.

use std::fmt::Write;

use signoff_core::signoff::{RagStatus, NOT_AVAILABLE, STATUS_COMPLETE};
use signoff_core::tally::{DefectSummary, TestCaseSummary};
use signoff_core::types::{Date, Timestamp};
use signoff_db::models::signoff::SignOffDetail;

/// Subject line for the completion email.
pub fn signoff_subject(project_name: &str) -> String {
    format!("QA Sign Off - {project_name}")
}

const STYLE: &str = "\
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 20px; color: #333; line-height: 1.6; background-color: #f5f5f5; }
.container { max-width: 1000px; margin: 0 auto; background-color: white; padding: 30px; border-radius: 8px; }
.header { background: linear-gradient(135deg, #007bff, #0056b3); padding: 25px; text-align: center; margin: -30px -30px 30px -30px; border-radius: 8px 8px 0 0; }
.header h1 { margin: 0; font-size: 28px; }
.header h2 { margin: 10px 0 0 0; font-size: 22px; font-weight: normal; }
.row { display: flex; margin-bottom: 15px; gap: 20px; }
.col { flex: 1; }
.form-group { margin-bottom: 15px; }
.form-group label { font-weight: 600; color: #495057; display: block; margin-bottom: 5px; font-size: 14px; }
.form-value { padding: 12px; border: 1px solid #dee2e6; background-color: #f8f9fa; min-height: 20px; border-radius: 4px; font-size: 14px; }
.table { width: 100%; border-collapse: collapse; margin: 15px 0; }
.table th, .table td { border: 1px solid #dee2e6; padding: 12px; text-align: center; font-size: 14px; }
.table th { background-color: #343a40; color: white; font-weight: 600; }
.table-secondary { background-color: #6c757d; color: white; font-weight: 600; }
.status-badge { padding: 6px 12px; border-radius: 20px; font-weight: 600; font-size: 12px; text-transform: uppercase; }
.status-complete { background-color: #81e758; color: #a53e0f; border: 1px solid #c3e6cb; }
.status-inprogress { background-color: #fff3cd; color: #856404; border: 1px solid #ffeaa7; }
h4 { color: #007bff; border-bottom: 2px solid #007bff; padding-bottom: 8px; margin-top: 30px; font-size: 18px; }
.footer { margin-top: 40px; padding: 20px; background-color: #f8f9fa; text-align: center; border-left: 4px solid #007bff; }
.footer p { margin: 5px 0; color: #6c757d; font-size: 13px; }
a { color: #007bff; text-decoration: none; }
";

/// Everything the report needs, already loaded.
#[derive(Debug)]
pub struct SignOffReport<'a> {
    pub detail: &'a SignOffDetail,
    /// Display name of the VDS, or `N/A`.
    pub vds_name: &'a str,
    pub generated_at: Timestamp,
}

impl SignOffReport<'_> {
    /// Render the full HTML document. All record text is escaped.
    pub fn render(&self) -> String {
        let s = &self.detail.signoff;
        let mut html = String::with_capacity(8 * 1024);

        let status = s.status.as_deref().unwrap_or(NOT_AVAILABLE);
        let status_class = if status == STATUS_COMPLETE {
            "status-complete"
        } else {
            "status-inprogress"
        };

        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n\
             <title>{title}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n\
             <div class=\"container\">\n<div class=\"header\">\n\
             <h1>QA Sign Off Report</h1>\n<h2>{project}</h2>\n\
             <p>Status: <span class=\"status-badge {status_class}\">{status}</span></p>\n\
             </div>\n<div class=\"section\">\n",
            title = escape(&signoff_subject(&s.project_name)),
            project = escape(&s.project_name),
            status = escape(status),
        );

        pair(
            &mut html,
            ("Project Name", text(Some(&s.project_name))),
            ("VDS", text(Some(self.vds_name))),
        );
        pair(
            &mut html,
            ("Application", text(s.application.as_deref())),
            ("QA", text(s.qa.as_deref())),
        );
        pair(
            &mut html,
            ("Start Date", date(s.start_date)),
            ("End Date", date(s.end_date)),
        );
        pair(
            &mut html,
            ("Actual Start Date", date(s.actual_start_date)),
            ("Actual End Date", date(s.actual_end_date)),
        );
        pair(
            &mut html,
            ("Production Release Date", date(s.prod_rel_dt)),
            ("RAG Status", rag(s.rag_status.as_deref())),
        );
        pair(
            &mut html,
            ("Task Type", text(s.task_type.as_deref())),
            ("Sign-Off Type", text(s.sign_off_type.as_deref())),
        );
        pair(
            &mut html,
            ("CM Number", text(s.cm_number.as_deref())),
            ("JIRA Link", link(s.jira_link.as_deref())),
        );
        field(&mut html, "Project Details", &text(s.project_details.as_deref()));
        field(&mut html, "Observations", &text(s.observations.as_deref()));
        field(&mut html, "Caveats", &text(s.caveats.as_deref()));
        field(&mut html, "Out Of Scope", &text(s.out_of_scope.as_deref()));
        pair(
            &mut html,
            ("Defect Filter Link", link(s.defect_filter_link.as_deref())),
            ("Evidences", text(s.evidences.as_deref())),
        );
        field(&mut html, "Sign-Off Comments", &text(s.comments.as_deref()));

        test_case_table(&mut html, &self.detail.test_case_summary());
        defect_table(&mut html, &self.detail.defect_summary());

        let _ = write!(
            html,
            "</div>\n<div class=\"footer\">\n\
             <p><strong>This email was generated automatically from the QA Sign Off \
             Process Automation system.</strong></p>\n\
             <p>Generated on: {}</p>\n</div>\n</div>\n</body>\n</html>\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );

        html
    }
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// Escaped text, or `N/A` when absent or blank.
fn text(value: Option<&str>) -> String {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) => escape(v),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn date(value: Option<Date>) -> String {
    value
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn link(value: Option<&str>) -> String {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(url) => {
            let url = escape(url);
            format!("<a href=\"{url}\">{url}</a>")
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

fn rag(value: Option<&str>) -> String {
    let style = value
        .and_then(RagStatus::parse)
        .map(RagStatus::badge_style)
        .unwrap_or("");
    format!("<span style=\"{style}\">{}</span>", text(value))
}

/// A full-width labelled value. `value` must already be escaped.
fn field(html: &mut String, label: &str, value: &str) {
    let _ = write!(
        html,
        "<div class=\"form-group\"><label>{label}</label>\
         <div class=\"form-value\">{value}</div></div>\n"
    );
}

/// Two labelled values side by side.
fn pair(html: &mut String, left: (&str, String), right: (&str, String)) {
    html.push_str("<div class=\"row\">\n");
    for (label, value) in [left, right] {
        html.push_str("<div class=\"col\">");
        field(html, label, &value);
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");
}

fn table_row(html: &mut String, label: &str, cells: (i32, i32), total: bool) {
    let _ = if total {
        write!(
            html,
            "<tr class=\"table-secondary\"><td><strong>{label}</strong></td>\
             <td><strong>{}</strong></td><td><strong>{}</strong></td></tr>\n",
            cells.0, cells.1
        )
    } else {
        write!(
            html,
            "<tr><td><strong>{label}</strong></td><td>{}</td><td>{}</td></tr>\n",
            cells.0, cells.1
        )
    };
}

fn table_head(html: &mut String, heading: &str, columns: (&str, &str)) {
    let _ = write!(
        html,
        "<h4>{heading}</h4>\n<table class=\"table\">\n<thead><tr><th>{heading}</th>\
         <th>{}</th><th>{}</th></tr></thead>\n<tbody>\n",
        columns.0, columns.1
    );
}

fn test_case_table(html: &mut String, summary: &TestCaseSummary) {
    table_head(html, "Test Cases", ("RIAST", "RIASP"));
    table_row(html, "Passed", summary.passed, false);
    table_row(html, "Failed", summary.failed, false);
    table_row(html, "Unexecuted", summary.unexecuted, false);
    table_row(html, "Total", summary.totals(), true);
    html.push_str("</tbody>\n</table>\n");
}

fn defect_table(html: &mut String, summary: &DefectSummary) {
    table_head(html, "Defects", ("Resolved", "Deferred"));
    table_row(html, "Enhancements", summary.enhancements, false);
    table_row(html, "Defects", summary.defects, false);
    table_row(html, "Total", summary.totals(), true);
    html.push_str("</tbody>\n</table>\n");
}

/// Minimal HTML escaping for text and attribute values.
pub(crate) fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use signoff_db::models::signoff::{Defect, SignOff, TestCase};

    use super::*;

    fn signoff() -> SignOff {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        SignOff {
            id: 7,
            project_name: "Apollo <Phase 2>".into(),
            vds_id: Some(1),
            user_id: 3,
            status: Some("Complete".into()),
            observations: Some("Stable & ready".into()),
            caveats: None,
            jira_link: Some("https://jira.example.com/browse/QA-1".into()),
            application: Some("Billing".into()),
            cm_number: Some("".into()),
            project_details: None,
            qa: Some("Dana".into()),
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            end_date: None,
            actual_start_date: None,
            actual_end_date: None,
            prod_rel_dt: NaiveDate::from_ymd_opt(2024, 3, 15),
            rag_status: Some("GREEN".into()),
            out_of_scope: None,
            evidences: None,
            comments: Some("<script>alert(1)</script>".into()),
            task_type: None,
            sign_off_type: None,
            defect_filter_link: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn detail() -> SignOffDetail {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let tc = |id, test_type: &str, passed, failed, non_executed| TestCase {
            id,
            sign_off_id: 7,
            test_type: test_type.into(),
            passed,
            failed,
            non_executed,
            total: passed + failed + non_executed,
            created_at: at,
        };
        SignOffDetail {
            signoff: signoff(),
            test_cases: vec![tc(1, "RIAST", 40, 2, 1), tc(2, "RIASP", 30, 0, 5)],
            defects: vec![Defect {
                id: 1,
                sign_off_id: 7,
                defect_type: "Defects".into(),
                resolved: 6,
                deferred: 2,
                total: 8,
                defect_filter_link: None,
                created_at: at,
            }],
        }
    }

    fn render(detail: &SignOffDetail) -> String {
        SignOffReport {
            detail,
            vds_name: "Payments",
            generated_at: Utc.with_ymd_and_hms(2024, 3, 2, 10, 30, 0).unwrap(),
        }
        .render()
    }

    #[test]
    fn subject_names_the_project() {
        assert_eq!(signoff_subject("Apollo"), "QA Sign Off - Apollo");
    }

    #[test]
    fn record_text_is_escaped() {
        let html = render(&detail());
        assert!(html.contains("<h2>Apollo &lt;Phase 2&gt;</h2>"));
        assert!(html.contains("Stable &amp; ready"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn missing_and_blank_fields_render_not_available() {
        let html = render(&detail());
        assert!(html.contains("<label>Caveats</label><div class=\"form-value\">N/A</div>"));
        assert!(html.contains("<label>CM Number</label><div class=\"form-value\">N/A</div>"));
        assert!(html.contains("<label>End Date</label><div class=\"form-value\">N/A</div>"));
        assert!(html.contains("<label>Defect Filter Link</label><div class=\"form-value\">N/A</div>"));
    }

    #[test]
    fn dates_links_and_rag_badge_are_formatted() {
        let html = render(&detail());
        assert!(html.contains("<div class=\"form-value\">15/03/2024</div>"));
        assert!(html.contains(
            "<a href=\"https://jira.example.com/browse/QA-1\">https://jira.example.com/browse/QA-1</a>"
        ));
        assert!(html.contains(RagStatus::Green.badge_style()));
        assert!(html.contains("status-complete"));
        assert!(html.contains("<div class=\"form-value\">Payments</div>"));
        assert!(html.contains("Generated on: 2024-03-02 10:30:00 UTC"));
    }

    #[test]
    fn tables_carry_column_totals() {
        let html = render(&detail());
        assert!(html.contains("<tr><td><strong>Passed</strong></td><td>40</td><td>30</td></tr>"));
        assert!(html.contains(
            "<td><strong>Total</strong></td><td><strong>43</strong></td><td><strong>35</strong></td>"
        ));
        // Enhancements were never submitted, so they render as zero.
        assert!(html.contains("<tr><td><strong>Enhancements</strong></td><td>0</td><td>0</td></tr>"));
        assert!(html.contains(
            "<td><strong>Total</strong></td><td><strong>6</strong></td><td><strong>2</strong></td>"
        ));
    }

    #[test]
    fn unknown_rag_value_has_no_badge_style() {
        let mut detail = detail();
        detail.signoff.rag_status = Some("PURPLE".into());
        let html = render(&detail);
        assert!(html.contains("<span style=\"\">PURPLE</span>"));
    }
}
