// crates/flash-harness/src/artifacts.rs
// ============================================================================
// Module: Run Artifacts
// Description: Per-scenario artifact directories and summaries.
// Purpose: Keep every run diagnosable after the fact.
// Dependencies: flash-harness-config, serde, serde_jcs
// ============================================================================

//! ## Overview
//! Each scenario writes into its own run root (by default
//! `target/flash-harness/run_<millis>/<scenario>`): the liquidator config and
//! key file, captured stdout and stderr, the evaluation report, and a
//! `summary.json` / `summary.md` pair. The reporter still writes a summary
//! when the scenario panics.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use flash_harness_config::HarnessEnvConfig;
use serde::Serialize;

use crate::error::HarnessError;

/// Default parent of all run roots.
const DEFAULT_RUN_ROOT: &str = "target/flash-harness";

/// Final summary of one scenario.
#[derive(Debug, Serialize)]
struct ScenarioSummary {
    /// Scenario name.
    scenario: String,
    /// `passed`, `failed`, `panic`, or `unknown`.
    status: String,
    /// Start time, ms since the epoch.
    started_at_ms: u128,
    /// End time, ms since the epoch.
    ended_at_ms: u128,
    /// Wall time.
    duration_ms: u128,
    /// Free-form notes.
    notes: Vec<String>,
    /// Artifact file names.
    artifacts: Vec<String>,
}

/// Milliseconds since the Unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Default run root for `scenario`.
fn default_run_root(scenario: &str) -> PathBuf {
    PathBuf::from(DEFAULT_RUN_ROOT).join(format!("run_{}", now_millis())).join(scenario)
}

/// Artifact directory for one scenario.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    /// Root directory.
    root: PathBuf,
}

impl RunArtifacts {
    /// Creates the artifact root, honoring environment overrides.
    ///
    /// An override root is used as the parent of a per-scenario directory.
    /// Reusing a non-empty directory requires `allow_overwrite`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] when the directory cannot be created or
    /// already holds files and overwriting is not allowed.
    pub fn new(scenario: &str, env: &HarnessEnvConfig) -> Result<Self, HarnessError> {
        let root = env
            .run_root
            .as_ref()
            .map_or_else(|| default_run_root(scenario), |parent| parent.join(scenario));
        Self::at(root, env.allow_overwrite)
    }

    /// Uses `root` directly.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] when the directory cannot be created or
    /// already holds files and `allow_overwrite` is false.
    pub fn at(root: PathBuf, allow_overwrite: bool) -> Result<Self, HarnessError> {
        if !allow_overwrite && fs::read_dir(&root).is_ok_and(|mut entries| entries.next().is_some())
        {
            return Err(HarnessError::Io(format!(
                "run root {} is not empty; set FLASH_HARNESS_ALLOW_OVERWRITE=1 to reuse it",
                root.display()
            )));
        }
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory handed to the liquidator for its input files.
    #[must_use]
    pub fn liquidator_dir(&self) -> PathBuf {
        self.root.join("liquidator")
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] when serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, HarnessError> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| HarnessError::Io(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a text artifact.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] when the write fails.
    pub fn write_text(&self, name: &str, value: &str) -> Result<PathBuf, HarnessError> {
        self.write_bytes(name, value.as_bytes())
    }

    /// Writes a raw artifact.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] when the write fails.
    pub fn write_bytes(&self, name: &str, value: &[u8]) -> Result<PathBuf, HarnessError> {
        let path = self.root.join(name);
        fs::write(&path, value)?;
        Ok(path)
    }
}

/// Writes a scenario summary on `finish`, or on drop if never finished.
#[derive(Debug)]
pub struct ScenarioReporter {
    /// Artifact directory.
    artifacts: RunArtifacts,
    /// Scenario name.
    scenario: String,
    /// Start time.
    started_at_ms: u128,
    /// Set once a summary was written.
    finalized: bool,
}

impl ScenarioReporter {
    /// Creates a reporter for `scenario`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] when the artifact root cannot be created.
    pub fn new(scenario: &str, env: &HarnessEnvConfig) -> Result<Self, HarnessError> {
        Ok(Self::with_artifacts(scenario, RunArtifacts::new(scenario, env)?))
    }

    /// Creates a reporter over an existing artifact directory.
    #[must_use]
    pub fn with_artifacts(scenario: &str, artifacts: RunArtifacts) -> Self {
        Self {
            artifacts,
            scenario: scenario.to_string(),
            started_at_ms: now_millis(),
            finalized: false,
        }
    }

    /// Returns the artifact directory.
    #[must_use]
    pub const fn artifacts(&self) -> &RunArtifacts {
        &self.artifacts
    }

    /// Writes the final summary.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] when the summary cannot be written.
    pub fn finish(
        &mut self,
        status: &str,
        notes: Vec<String>,
        artifacts: Vec<String>,
    ) -> Result<(), HarnessError> {
        let ended_at_ms = now_millis();
        let summary = ScenarioSummary {
            scenario: self.scenario.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes,
            artifacts,
        };
        self.artifacts.write_json("summary.json", &summary)?;
        self.artifacts.write_text("summary.md", &summary_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for ScenarioReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.finish(
            status,
            vec!["scenario terminated without explicit summary".to_string()],
            Vec::new(),
        );
    }
}

/// Renders the Markdown summary.
fn summary_markdown(summary: &ScenarioSummary) -> String {
    let mut out = String::new();
    out.push_str("# Flash Liquidator Regression Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Scenario: {}", summary.scenario);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    out.push_str("\n## Notes\n\n");
    push_list(&mut out, &summary.notes);
    out.push_str("\n## Artifacts\n\n");
    push_list(&mut out, &summary.artifacts);
    out
}

/// Appends a bullet list, or `- None`.
fn push_list(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("- None\n");
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}
