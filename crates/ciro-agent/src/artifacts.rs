// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Artifacts produced by sandbox executions.
//!
//! The sandbox reports every file in its scratch directory after each run,
//! so the collector keeps the names it has already seen and only admits new
//! ones. Artifacts are handles; the sandbox keeps the bytes.

use std::collections::HashSet;

use ciro_core::SandboxFile;
use serde::Serialize;
use strum::Display;

/// Coarse artifact kind, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ArtifactType {
    Code,
    Chart,
    Table,
    File,
}

impl ArtifactType {
    /// Classify a file name by extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Self {
        match extension(name).as_deref() {
            Some("png" | "jpg" | "jpeg" | "gif" | "svg" | "webp") => ArtifactType::Chart,
            Some("csv" | "json") => ArtifactType::Table,
            Some("py") => ArtifactType::Code,
            _ => ArtifactType::File,
        }
    }
}

/// A reference to something the analysis produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticalArtifact {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl AnalyticalArtifact {
    /// Handle for a file reported by the sandbox.
    pub fn from_sandbox_file(file: &SandboxFile) -> Self {
        Self {
            artifact_type: ArtifactType::from_file_name(&file.name),
            name: file.name.clone(),
            content: None,
            url: file.path.clone(),
            mime_type: mime_type_for(&file.name).map(str::to_string),
            size: Some(file.size),
        }
    }
}

/// Accumulates artifacts across iterations, one per file name.
#[derive(Debug, Default)]
pub struct ArtifactCollector {
    seen: HashSet<String>,
    artifacts: Vec<AnalyticalArtifact>,
}

impl ArtifactCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit files not seen before and return the newly admitted artifacts.
    pub fn collect(&mut self, files: &[SandboxFile]) -> Vec<AnalyticalArtifact> {
        let mut fresh = Vec::new();
        for file in files {
            if self.seen.insert(file.name.clone()) {
                let artifact = AnalyticalArtifact::from_sandbox_file(file);
                self.artifacts.push(artifact.clone());
                fresh.push(artifact);
            }
        }
        fresh
    }

    pub fn artifacts(&self) -> &[AnalyticalArtifact] {
        &self.artifacts
    }

    pub fn into_artifacts(self) -> Vec<AnalyticalArtifact> {
        self.artifacts
    }
}

fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

fn mime_type_for(name: &str) -> Option<&'static str> {
    let mime = match extension(name)?.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "csv" => "text/csv",
        "json" => "application/json",
        "py" => "text/x-python",
        "txt" => "text/plain",
        "html" => "text/html",
        "pdf" => "application/pdf",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> SandboxFile {
        SandboxFile {
            name: name.to_string(),
            size: 42,
            path: Some(format!("/scratch/{name}")),
        }
    }

    #[test]
    fn types_follow_extension() {
        for (name, expected) in [
            ("plot.png", ArtifactType::Chart),
            ("photo.JPEG", ArtifactType::Chart),
            ("fig.svg", ArtifactType::Chart),
            ("anim.webp", ArtifactType::Chart),
            ("data.csv", ArtifactType::Table),
            ("summary.json", ArtifactType::Table),
            ("analysis.py", ArtifactType::Code),
            ("report.pdf", ArtifactType::File),
            ("README", ArtifactType::File),
            (".png", ArtifactType::File),
        ] {
            assert_eq!(ArtifactType::from_file_name(name), expected, "{name}");
        }
    }

    #[test]
    fn collector_deduplicates_by_name() {
        let mut collector = ArtifactCollector::new();
        let first = collector.collect(&[file("a.png"), file("b.csv")]);
        assert_eq!(first.len(), 2);

        let second = collector.collect(&[file("a.png"), file("b.csv"), file("c.json")]);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "c.json");
        assert_eq!(collector.artifacts().len(), 3);
    }

    #[test]
    fn artifact_carries_handle_fields() {
        let artifact = AnalyticalArtifact::from_sandbox_file(&file("chart.png"));
        assert_eq!(artifact.mime_type.as_deref(), Some("image/png"));
        assert_eq!(artifact.url.as_deref(), Some("/scratch/chart.png"));
        assert_eq!(artifact.size, Some(42));
        assert!(artifact.content.is_none());
    }

    #[test]
    fn artifact_serializes_type_field() {
        let json = serde_json::to_value(AnalyticalArtifact::from_sandbox_file(&file("t.csv"))).unwrap();
        assert_eq!(json["type"], "table");
        assert!(json.get("content").is_none());
    }
}
