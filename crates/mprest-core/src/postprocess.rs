use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::config::GenerationPolicy;
use crate::format::SourceFormatter;

/// Result of formatting one recorded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Formatted in place; `changed` is false when the file was already formatted.
    Formatted { path: PathBuf, changed: bool },
    /// Left untouched on disk.
    Failed { path: PathBuf, reason: String },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Formatted { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// The formatter was disabled and no file was touched.
    pub skipped: bool,
    pub outcomes: Vec<FileOutcome>,
}

impl SweepReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            outcomes: Vec::new(),
        }
    }

    pub fn formatted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Formatted { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed { path, reason } => Some((path.as_path(), reason.as_str())),
            FileOutcome::Formatted { .. } => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Collects the paths of every file written during a run and formats them afterwards.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPostProcessor {
    recorded: Vec<PathBuf>,
}

impl ArtifactPostProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a written file. Duplicates are kept and formatted twice.
    pub fn record(&mut self, path: impl Into<PathBuf>) {
        self.recorded.push(path.into());
    }

    pub fn recorded(&self) -> &[PathBuf] {
        &self.recorded
    }

    /// Format every recorded file in recording order.
    ///
    /// A failing file is logged once and left as it was; the sweep always reaches
    /// the end of the list.
    pub fn run_sweep(
        &self,
        policy: &GenerationPolicy,
        formatter: &dyn SourceFormatter,
    ) -> SweepReport {
        if !policy.formatter {
            return SweepReport::skipped();
        }

        let mut report = SweepReport::default();
        for path in &self.recorded {
            info!("formatting source code: {}", path.display());
            let outcome = match format_file(path, formatter) {
                Ok(changed) => FileOutcome::Formatted {
                    path: path.clone(),
                    changed,
                },
                Err(reason) => {
                    error!("failed to format {}: {reason}", path.display());
                    FileOutcome::Failed {
                        path: path.clone(),
                        reason,
                    }
                }
            };
            report.outcomes.push(outcome);
        }
        report
    }
}

fn format_file(path: &Path, formatter: &dyn SourceFormatter) -> Result<bool, String> {
    let original = fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    let formatted = formatter.format(&original).map_err(|e| e.to_string())?;
    if formatted == original {
        return Ok(false);
    }
    fs::write(path, formatted).map_err(|e| format!("write failed: {e}"))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::FormatError;
    use crate::format::TidyFormatter;

    struct CountingFormatter {
        calls: Cell<usize>,
    }

    impl SourceFormatter for CountingFormatter {
        fn format(&self, source: &str) -> Result<String, FormatError> {
            self.calls.set(self.calls.get() + 1);
            Ok(source.to_string())
        }
    }

    fn enabled() -> GenerationPolicy {
        GenerationPolicy {
            formatter: true,
            ..GenerationPolicy::default()
        }
    }

    #[test]
    fn test_disabled_formatter_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("PetsApi.java");
        fs::write(&file, "class  A {}   \n\n\n").unwrap();

        let mut post = ArtifactPostProcessor::new();
        post.record(&file);
        post.record(dir.path().join("missing.java"));

        let counter = CountingFormatter { calls: Cell::new(0) };
        let policy = GenerationPolicy {
            formatter: false,
            ..GenerationPolicy::default()
        };
        let report = post.run_sweep(&policy, &counter);

        assert!(report.skipped);
        assert!(report.outcomes.is_empty());
        assert_eq!(counter.calls.get(), 0);
        assert_eq!(fs::read_to_string(&file).unwrap(), "class  A {}   \n\n\n");
    }

    #[test]
    fn test_failing_file_does_not_stop_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("Good.java");
        let bad = dir.path().join("Bad.java");
        let after = dir.path().join("After.java");
        fs::write(&good, "class Good {}   \n").unwrap();
        fs::write(&bad, "class Bad {\n").unwrap();
        fs::write(&after, "\n\nclass After {}\n").unwrap();

        let mut post = ArtifactPostProcessor::new();
        for path in [&good, &bad, &after] {
            post.record(path);
        }
        let report = post.run_sweep(&enabled(), &TidyFormatter);

        assert!(!report.skipped);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.formatted_count(), 2);
        let failures: Vec<&Path> = report.failures().map(|(p, _)| p).collect();
        assert_eq!(failures, vec![bad.as_path()]);
        assert!(!report.is_clean());

        assert_eq!(fs::read_to_string(&good).unwrap(), "class Good {}\n");
        assert_eq!(fs::read_to_string(&bad).unwrap(), "class Bad {\n");
        assert_eq!(fs::read_to_string(&after).unwrap(), "class After {}\n");
    }

    #[test]
    fn test_missing_file_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut post = ArtifactPostProcessor::new();
        post.record(dir.path().join("Gone.java"));

        let report = post.run_sweep(&enabled(), &TidyFormatter);
        let failures: Vec<(&Path, &str)> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].1.starts_with("read failed"));
    }

    #[test]
    fn test_duplicate_records_are_formatted_twice() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Pet.java");
        fs::write(&file, "import b;\nimport a;\nclass Pet {}\n").unwrap();

        let mut post = ArtifactPostProcessor::new();
        post.record(&file);
        post.record(&file);
        let report = post.run_sweep(&enabled(), &TidyFormatter);

        assert_eq!(
            report.outcomes,
            vec![
                FileOutcome::Formatted {
                    path: file.clone(),
                    changed: true
                },
                FileOutcome::Formatted {
                    path: file.clone(),
                    changed: false
                },
            ]
        );
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "import a;\nimport b;\nclass Pet {}\n"
        );
    }
}
