use cloudsift_core::report::{Report, ReportSink};
use colored::*;

/// Sink writing to the terminal.
///
/// Findings and diagnostics both go to stdout, one `println!` per
/// report so concurrent workers never interleave mid-line.
pub struct TerminalSink {
    verbose: bool,
}

impl TerminalSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ReportSink for TerminalSink {
    fn emit(&self, report: Report) {
        match report {
            Report::Diagnostic { url, status } => {
                println!("{url},{status}");
            }
            Report::Finding { url } => {
                if self.verbose {
                    println!(
                        "{} {} {}",
                        "[!]".green().bold(),
                        "Potential CloudFront misconfiguration found:".green(),
                        url.green().bold()
                    );
                } else {
                    println!("{url}");
                }
            }
        }
    }
}
