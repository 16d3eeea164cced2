//! Report rendering for completed review runs.

use std::io::Write;

use diffscribe_core::FileReviewResult;

/// Layout of the emitted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportStyle {
    /// PR summary followed by one markdown section per reviewed file.
    #[default]
    PerFileSections,
    /// PR summary followed by a fenced JSON dump of every per-file result.
    InlineJson,
}

/// Writes the PR-level summary and the per-file results to `out`.
pub fn write_report(
    out: &mut dyn Write,
    summary: &str,
    results: &[FileReviewResult],
    style: ReportStyle,
) -> std::io::Result<()> {
    writeln!(out, "{summary}")?;
    match style {
        ReportStyle::PerFileSections => {
            for result in results {
                writeln!(out)?;
                writeln!(out, "## `{}`", result.file_name)?;
                writeln!(out)?;
                writeln!(out, "{}", result.description)?;
                if !result.comments.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "### Review")?;
                    writeln!(out)?;
                    writeln!(out, "{}", result.comments)?;
                }
            }
        }
        ReportStyle::InlineJson => {
            let json = serde_json::to_string_pretty(results).map_err(std::io::Error::other)?;
            writeln!(out, "\n\n### The raw json output for the file reviews was: ")?;
            writeln!(out, "\n```json")?;
            writeln!(out, "{json}")?;
            writeln!(out, "```")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> Vec<FileReviewResult> {
        vec![
            FileReviewResult {
                file_name: "src/lib.rs".to_owned(),
                description: "Adds a helper".to_owned(),
                comments: "Name it better".to_owned(),
            },
            FileReviewResult {
                file_name: "README.md".to_owned(),
                description: "Documents the helper".to_owned(),
                comments: String::new(),
            },
        ]
    }

    #[test]
    fn sections_style_lists_every_file() {
        let mut out = Vec::new();
        write_report(&mut out, "A tidy PR", &sample_results(), ReportStyle::PerFileSections)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("A tidy PR\n"));
        assert!(text.contains("## `src/lib.rs`"));
        assert!(text.contains("Name it better"));
        assert!(text.contains("## `README.md`"));
        // Clean files get no empty review section.
        assert_eq!(text.matches("### Review").count(), 1);
    }

    #[test]
    fn json_style_embeds_the_raw_results() {
        let mut out = Vec::new();
        write_report(&mut out, "A tidy PR", &sample_results(), ReportStyle::InlineJson).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("```json"));
        assert!(text.contains("\"FileName\": \"src/lib.rs\""));
        assert!(text.contains("\"Comments\": \"\""));
    }
}
