//! Human-readable output formatter with colors and styling.

use super::formatter::Disposition;
use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use gopack_core::PackReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    /// Summary lines printed below the headline.
    fn report_lines(&self, report: &PackReport, disposition: &Disposition) -> Vec<String> {
        let mut lines = vec![
            format!("  Source:           {}", report.source),
            format!("  Files added:      {}", report.files_added),
            format!("  Total size:       {}", humanize_bytes(report.bytes_written)),
            format!(
                "  Archive size:     {}",
                humanize_bytes(report.bytes_compressed)
            ),
        ];

        if report.files_skipped > 0 {
            lines.push(format!("  Files filtered:   {}", report.files_skipped));
        }
        if let Some(url) = &disposition.uploaded_to {
            lines.push(format!("  Uploaded to:      {url}"));
        }
        if let Some(path) = &disposition.stored_at {
            lines.push(format!("  Stored at:        {}", path.display()));
        }

        if self.verbose {
            if let Some(rev) = &report.revision {
                lines.push(format!("  Revision:         {rev}"));
            }
            lines.push(format!(
                "  Compression:      {:.1}x",
                report.compression_ratio()
            ));
            lines.push(format!("  Duration:         {:?}", report.duration));
        }

        lines
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_package_result(&self, report: &PackReport, disposition: &Disposition) -> Result<()> {
        for warning in &report.warnings {
            self.format_warning(warning);
        }
        if self.quiet {
            return Ok(());
        }

        let headline = format!("Packaged {}@{}", report.module, report.version);
        if self.use_colors {
            self.term
                .write_line(&format!("{} {headline}", style("✓").green().bold()))?;
        } else {
            self.term.write_line(&headline)?;
        }
        for line in self.report_lines(report, disposition) {
            self.term.write_line(&line)?;
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .err_term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.err_term.write_line(&format!("WARNING: {message}"));
        }
    }
}
