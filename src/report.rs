//! Console and JSON reports of phase durations

use serde::Serialize;

use crate::config::RunConfig;
use crate::phase::{Phase, PhaseReport};

/// One report line: `create:   0.004211 seconds`
pub fn format_phase_line(report: &PhaseReport) -> String {
    format!(
        "{:<9} {} seconds",
        format!("{}:", report.label()),
        report.elapsed
    )
}

/// Duration of one phase in the JSON report
#[derive(Debug, Clone, Serialize)]
pub struct JsonPhase {
    pub phase: Phase,
    /// Whole seconds
    pub secs: i64,
    /// Sub-second remainder in microseconds
    pub usecs: i64,
    /// Total duration in microseconds
    pub total_us: u64,
}

impl From<&PhaseReport> for JsonPhase {
    fn from(report: &PhaseReport) -> Self {
        Self {
            phase: report.phase,
            secs: report.elapsed.secs,
            usecs: report.elapsed.usecs,
            total_us: report.elapsed.as_duration().as_micros() as u64,
        }
    }
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    /// Format version identifier
    pub version: &'static str,
    /// Format name
    pub format: &'static str,
    /// Parameters of the run
    pub config: &'a RunConfig,
    /// Completed phases, in run order
    pub phases: Vec<JsonPhase>,
}

impl<'a> JsonReport<'a> {
    pub fn new(config: &'a RunConfig, reports: &[PhaseReport]) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            format: "xattrtest-json-v1",
            config,
            phases: reports.iter().map(JsonPhase::from).collect(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::Elapsed;

    fn report(phase: Phase, secs: i64, usecs: i64) -> PhaseReport {
        PhaseReport {
            phase,
            elapsed: Elapsed { secs, usecs },
        }
    }

    #[test]
    fn test_phase_line_alignment() {
        assert_eq!(
            format_phase_line(&report(Phase::Create, 0, 4211)),
            "create:   0.004211 seconds"
        );
        assert_eq!(
            format_phase_line(&report(Phase::Write, 12, 500_000)),
            "setxattr: 12.500000 seconds"
        );
        assert_eq!(
            format_phase_line(&report(Phase::Read, 1, 0)),
            "getxattr: 1.000000 seconds"
        );
        assert_eq!(
            format_phase_line(&report(Phase::Teardown, 0, 999_999)),
            "unlink:   0.999999 seconds"
        );
    }

    #[test]
    fn test_json_report_fields() {
        let config = RunConfig::new().with_files(3).with_seed(42);
        let reports = vec![
            report(Phase::Create, 0, 1500),
            report(Phase::Write, 2, 250_000),
        ];
        let json = JsonReport::new(&config, &reports).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["format"], "xattrtest-json-v1");
        assert_eq!(value["config"]["files"], 3);
        assert_eq!(value["config"]["seed"], 42);
        assert_eq!(value["phases"][0]["phase"], "create");
        assert_eq!(value["phases"][1]["phase"], "setxattr");
        assert!(value["phases"][1].get("label").is_none());
        assert_eq!(value["phases"][1]["secs"], 2);
        assert_eq!(value["phases"][1]["usecs"], 250_000);
        assert_eq!(value["phases"][1]["total_us"], 2_250_000);
    }
}
