//! `edm check`

use edm_core::{check_model, CheckReport, Edm};
use std::process::ExitCode;

pub fn run(edm: &Edm) -> ExitCode {
    let report = check_model(edm);
    print!("{}", render(&report));
    if report.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// One line per error, one per warning, then a summary line
fn render(report: &CheckReport) -> String {
    let mut out = String::new();
    for issue in &report.errors {
        out.push_str(&format!("error: {issue}\n"));
    }
    for issue in &report.warnings {
        out.push_str(&format!("warning: {issue}\n"));
    }
    out.push_str(&format!(
        "Checked {} elements: {} errors, {} warnings\n",
        report.checked,
        report.errors.len(),
        report.warnings.len()
    ));
    out
}
