//! Compliance report aggregation

use crate::catalog::ReferenceCatalog;
use crate::classify::{classify, search_query, search_url, Classification};
use biosaudit_inventory::InventoryRow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Department bucket for host names without a "-" separator
pub const UNASSIGNED_DEPARTMENT: &str = "INNE";

const NOT_MATCHED: &str = "---";

/// Organization-wide risk rating derived from the outdated percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    NoData,
    Excellent,
    Stable,
    Warning,
    Critical,
}

impl RiskTier {
    /// Inclusive upper bounds: 10, 30, 60
    pub fn from_outdated_pct(pct: f64) -> Self {
        if pct <= 10.0 {
            Self::Excellent
        } else if pct <= 30.0 {
            Self::Stable
        } else if pct <= 60.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoData => "NO DATA",
            Self::Excellent => "EXCELLENT",
            Self::Stable => "STABLE",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Severity of a department compliance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Bad,
    Warning,
    Good,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score < 50.0 {
            Self::Bad
        } else if score < 80.0 {
            Self::Warning
        } else {
            Self::Good
        }
    }
}

/// One classified inventory row with display fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub computer_name: String,
    pub model: String,
    pub service_tag: String,
    pub current_version: String,
    pub latest_version: String,
    pub status: String,
    pub classification: Classification,
    pub match_model: String,
    pub department: String,
    pub search_query: String,
    pub search_url: String,
}

/// Aggregated counts for one department
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSummary {
    pub name: String,
    pub total: usize,
    /// Up to date plus ahead
    pub ok: usize,
    pub outdated: usize,
    pub unknown: usize,
    pub score: f64,
    pub tier: ScoreTier,
}

/// Organization-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStatistics {
    pub total: usize,
    /// Rows exactly at the reference version
    pub ok: usize,
    pub outdated: usize,
    pub unknown: usize,
    /// Rows ahead of the reference version
    pub newer: usize,
    pub outdated_pct: f64,
    pub compliance_rate: f64,
    pub risk: RiskTier,
    pub analysis_date: DateTime<Utc>,
    /// Worst score first
    pub departments: Vec<DepartmentSummary>,
    /// Largest department first
    pub chart_departments: Vec<DepartmentSummary>,
    pub chart_dept_labels: String,
    pub chart_dept_data: String,
}

impl ReportStatistics {
    /// Rows that could be judged against a reference
    pub fn valid_total(&self) -> usize {
        self.total - self.unknown
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub statistics: ReportStatistics,
    pub rows: Vec<ReportRow>,
}

/// Department code of a host name: the upper-cased text before the first "-"
pub fn department_code(computer_name: &str) -> String {
    match computer_name.split_once('-') {
        Some((prefix, _)) => prefix.to_uppercase(),
        None => UNASSIGNED_DEPARTMENT.to_string(),
    }
}

/// Round to one decimal place from the exact binary value, ties to even
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

fn percentage(part: usize, whole: usize) -> f64 {
    round1(part as f64 / whole as f64 * 100.0)
}

#[derive(Debug, Clone, Default)]
struct DepartmentCounter {
    name: String,
    total: usize,
    ok: usize,
    outdated: usize,
    unknown: usize,
}

impl DepartmentCounter {
    fn summarize(&self) -> DepartmentSummary {
        let valid = self.total - self.unknown;
        let score = if valid > 0 { percentage(self.ok, valid) } else { 0.0 };

        DepartmentSummary {
            name: self.name.clone(),
            total: self.total,
            ok: self.ok,
            outdated: self.outdated,
            unknown: self.unknown,
            score,
            tier: ScoreTier::from_score(score),
        }
    }
}

/// Folds inventory rows into a [`Report`], one row at a time
pub struct ReportBuilder<'a, C: ReferenceCatalog + ?Sized> {
    catalog: &'a C,
    rows: Vec<ReportRow>,
    ok: usize,
    outdated: usize,
    unknown: usize,
    newer: usize,
    departments: Vec<DepartmentCounter>,
    department_index: HashMap<String, usize>,
}

impl<'a, C: ReferenceCatalog + ?Sized> ReportBuilder<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            rows: Vec::new(),
            ok: 0,
            outdated: 0,
            unknown: 0,
            newer: 0,
            departments: Vec::new(),
            department_index: HashMap::new(),
        }
    }

    /// Classify a row and add it to the running totals
    pub fn add_row(&mut self, row: &InventoryRow) -> &ReportRow {
        let verdict = classify(row, self.catalog);
        let classification = verdict.classification;
        let department = department_code(&row.computer_name);

        match classification {
            Classification::UpToDate => self.ok += 1,
            Classification::Ahead => self.newer += 1,
            Classification::Outdated => self.outdated += 1,
            Classification::DataError | Classification::NoReference => self.unknown += 1,
        }

        let counter = self.department_mut(&department);
        counter.total += 1;
        if classification.is_ok() {
            counter.ok += 1;
        } else if classification.is_unknown() {
            counter.unknown += 1;
        } else {
            counter.outdated += 1;
        }

        debug!(
            computer = %row.computer_name,
            model = %row.model_raw,
            status = classification.label(),
            "Classified row"
        );

        self.rows.push(ReportRow {
            computer_name: row.computer_name.clone(),
            model: row.model_raw.clone(),
            service_tag: row.service_tag.clone(),
            current_version: row.current_version_raw.clone(),
            latest_version: verdict
                .matched
                .map(|e| e.latest_version.clone())
                .unwrap_or_else(|| NOT_MATCHED.to_string()),
            status: classification.label().to_string(),
            classification,
            match_model: verdict
                .matched
                .map(|e| e.model_name.clone())
                .unwrap_or_else(|| NOT_MATCHED.to_string()),
            department,
            search_query: search_query(&row.model_raw),
            search_url: search_url(&row.model_raw),
        });

        &self.rows[self.rows.len() - 1]
    }

    fn department_mut(&mut self, name: &str) -> &mut DepartmentCounter {
        let idx = match self.department_index.get(name) {
            Some(&idx) => idx,
            None => {
                self.departments.push(DepartmentCounter {
                    name: name.to_string(),
                    ..Default::default()
                });
                let idx = self.departments.len() - 1;
                self.department_index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.departments[idx]
    }

    /// Compute percentages, risk and department orderings
    pub fn finish(self) -> Report {
        let total = self.rows.len();
        let valid_total = total - self.unknown;

        let (outdated_pct, compliance_rate, risk) = if valid_total > 0 {
            let outdated_pct = percentage(self.outdated, valid_total);
            let compliance_rate = percentage(self.ok + self.newer, valid_total);
            (outdated_pct, compliance_rate, RiskTier::from_outdated_pct(outdated_pct))
        } else {
            (0.0, 0.0, RiskTier::NoData)
        };

        let summaries: Vec<DepartmentSummary> =
            self.departments.iter().map(DepartmentCounter::summarize).collect();

        // Stable sorts keep first-seen order among ties
        let mut departments = summaries.clone();
        departments.sort_by(|a, b| a.score.total_cmp(&b.score));

        let mut chart_departments = summaries;
        chart_departments.sort_by(|a, b| b.total.cmp(&a.total));

        let chart_dept_labels = chart_departments
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let chart_dept_data = chart_departments
            .iter()
            .map(|d| d.total.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let statistics = ReportStatistics {
            total,
            ok: self.ok,
            outdated: self.outdated,
            unknown: self.unknown,
            newer: self.newer,
            outdated_pct,
            compliance_rate,
            risk,
            analysis_date: Utc::now(),
            departments,
            chart_departments,
            chart_dept_labels,
            chart_dept_data,
        };

        info!(
            total,
            ok = statistics.ok,
            newer = statistics.newer,
            outdated = statistics.outdated,
            unknown = statistics.unknown,
            outdated_pct,
            risk = risk.label(),
            "Built compliance report"
        );

        Report {
            statistics,
            rows: self.rows,
        }
    }
}

/// Build a report for a whole inventory
pub fn build_report<C>(rows: &[InventoryRow], catalog: &C) -> Report
where
    C: ReferenceCatalog + ?Sized,
{
    let mut builder = ReportBuilder::new(catalog);
    for row in rows {
        builder.add_row(row);
    }
    builder.finish()
}
