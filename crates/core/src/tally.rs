//! Test-case and defect tallies attached to a sign-off.
//!
//! The entry form groups counts by outcome (`passed.riast`, `passed.riasp`,
//! ...) while storage keeps one row per test type / defect type with a
//! derived total. [`TestCaseForm::rows`] and [`DefectForm::rows`] convert
//! form → rows; [`TestCaseSummary`] and [`DefectSummary`] go back the other
//! way for reporting.

use serde::{Deserialize, Serialize};

/// Test run against the integration (RIAST) environment.
pub const TEST_TYPE_RIAST: &str = "RIAST";
/// Test run against the pre-production (RIASP) environment.
pub const TEST_TYPE_RIASP: &str = "RIASP";

pub const DEFECT_TYPE_ENHANCEMENTS: &str = "Enhancements";
pub const DEFECT_TYPE_DEFECTS: &str = "Defects";

// ---------------------------------------------------------------------------
// Test cases
// ---------------------------------------------------------------------------

/// One outcome row of the test-case grid, split by environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvCounts {
    #[serde(default)]
    pub riast: Option<i32>,
    #[serde(default)]
    pub riasp: Option<i32>,
}

impl EnvCounts {
    pub fn riast(&self) -> i32 {
        self.riast.unwrap_or(0)
    }

    pub fn riasp(&self) -> i32 {
        self.riasp.unwrap_or(0)
    }

    fn for_type(&self, test_type: &str) -> i32 {
        if test_type == TEST_TYPE_RIAST {
            self.riast()
        } else {
            self.riasp()
        }
    }
}

/// Test-case grid as submitted by the entry form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseForm {
    pub passed: Option<EnvCounts>,
    pub failed: Option<EnvCounts>,
    pub unexecuted: Option<EnvCounts>,
}

/// A row destined for the `test_cases` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseRow {
    pub test_type: &'static str,
    pub passed: i32,
    pub failed: i32,
    pub non_executed: i32,
    pub total: i32,
}

impl TestCaseRow {
    pub fn new(test_type: &'static str, passed: i32, failed: i32, non_executed: i32) -> Self {
        Self {
            test_type,
            passed,
            failed,
            non_executed,
            total: passed + failed + non_executed,
        }
    }
}

impl TestCaseForm {
    /// Rows for both environments, or nothing if no outcome group was submitted.
    pub fn rows(&self) -> Vec<TestCaseRow> {
        if self.passed.is_none() && self.failed.is_none() && self.unexecuted.is_none() {
            return Vec::new();
        }

        let passed = self.passed.unwrap_or_default();
        let failed = self.failed.unwrap_or_default();
        let unexecuted = self.unexecuted.unwrap_or_default();

        [TEST_TYPE_RIAST, TEST_TYPE_RIASP]
            .into_iter()
            .map(|ty| {
                TestCaseRow::new(
                    ty,
                    passed.for_type(ty),
                    failed.for_type(ty),
                    unexecuted.for_type(ty),
                )
            })
            .collect()
    }
}

/// Test-case grid rebuilt from stored rows, for the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCaseSummary {
    pub passed: (i32, i32),
    pub failed: (i32, i32),
    pub unexecuted: (i32, i32),
}

impl TestCaseSummary {
    /// Fold `(test_type, passed, failed, non_executed)` rows into the grid.
    /// Unknown test types are ignored; later rows of the same type win.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, i32, i32, i32)>,
    {
        let mut summary = Self::default();
        for (test_type, passed, failed, non_executed) in rows {
            match test_type {
                TEST_TYPE_RIAST => {
                    summary.passed.0 = passed;
                    summary.failed.0 = failed;
                    summary.unexecuted.0 = non_executed;
                }
                TEST_TYPE_RIASP => {
                    summary.passed.1 = passed;
                    summary.failed.1 = failed;
                    summary.unexecuted.1 = non_executed;
                }
                _ => {}
            }
        }
        summary
    }

    /// Column totals as `(riast, riasp)`.
    pub fn totals(&self) -> (i32, i32) {
        (
            self.passed.0 + self.failed.0 + self.unexecuted.0,
            self.passed.1 + self.failed.1 + self.unexecuted.1,
        )
    }
}

// ---------------------------------------------------------------------------
// Defects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectCounts {
    #[serde(default)]
    pub resolved: Option<i32>,
    #[serde(default)]
    pub deferred: Option<i32>,
}

/// Defect grid as submitted by the entry form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefectForm {
    pub enhancements: Option<DefectCounts>,
    pub defects: Option<DefectCounts>,
}

/// A row destined for the `defects` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectRow {
    pub defect_type: &'static str,
    pub resolved: i32,
    pub deferred: i32,
    pub total: i32,
}

impl DefectRow {
    pub fn new(defect_type: &'static str, resolved: i32, deferred: i32) -> Self {
        Self {
            defect_type,
            resolved,
            deferred,
            total: resolved + deferred,
        }
    }
}

impl DefectForm {
    /// One row per submitted group; absent groups produce no row.
    pub fn rows(&self) -> Vec<DefectRow> {
        [
            (DEFECT_TYPE_ENHANCEMENTS, self.enhancements),
            (DEFECT_TYPE_DEFECTS, self.defects),
        ]
        .into_iter()
        .filter_map(|(ty, counts)| {
            counts.map(|c| DefectRow::new(ty, c.resolved.unwrap_or(0), c.deferred.unwrap_or(0)))
        })
        .collect()
    }
}

/// Defect grid rebuilt from stored rows: `(resolved, deferred)` per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefectSummary {
    pub enhancements: (i32, i32),
    pub defects: (i32, i32),
}

impl DefectSummary {
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, i32, i32)>,
    {
        let mut summary = Self::default();
        for (defect_type, resolved, deferred) in rows {
            match defect_type {
                DEFECT_TYPE_ENHANCEMENTS => summary.enhancements = (resolved, deferred),
                DEFECT_TYPE_DEFECTS => summary.defects = (resolved, deferred),
                _ => {}
            }
        }
        summary
    }

    /// Column totals as `(resolved, deferred)`.
    pub fn totals(&self) -> (i32, i32) {
        (
            self.enhancements.0 + self.defects.0,
            self.enhancements.1 + self.defects.1,
        )
    }
}
