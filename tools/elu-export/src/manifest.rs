//! Batch manifest parsing and build orchestration
//!
//! Parses assets.toml, converts every target in parallel and writes one
//! `model.glb` plus `source_meta.json` per target, followed by a run
//! manifest and a markdown report for the whole batch.

use anyhow::{Context, Result, bail};
use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::animation::{ClipReport, ClipSource};
use crate::convert::{ConvertOptions, ConvertedModel, DEFAULT_FPS, convert_to_memory};
use crate::error::Diagnostic;
use crate::scene::ConversionSummary;
use crate::texture::FsTextureResolver;

pub const RUN_MANIFEST_FILE: &str = "open_assets_manifest.json";
pub const REPORT_FILE: &str = "conversion_report.md";
pub const MODEL_FILE: &str = "model.glb";
pub const SIDECAR_FILE: &str = "source_meta.json";

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Base for relative mesh/clip paths and for texture lookups
    #[serde(default = "default_client_root")]
    pub client_root: PathBuf,
    #[serde(default = "default_fps")]
    pub fps: f32,
    /// Fail the run if anything is missing or failed
    #[serde(default = "default_strict")]
    pub strict: bool,
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
    /// Directory of the manifest file; relative roots are resolved against it
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetEntry {
    pub id: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub mesh: PathBuf,
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipEntry {
    pub name: String,
    #[serde(default, alias = "motion_type")]
    pub motion_type: i32,
    pub path: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("open_assets")
}

fn default_client_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_fps() -> f32 {
    DEFAULT_FPS
}

fn default_strict() -> bool {
    true
}

fn default_kind() -> String {
    "model".to_string()
}

impl Manifest {
    pub fn client_root(&self) -> PathBuf {
        self.base_dir.join(&self.client_root)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.output_dir)
    }

    /// Resolve a mesh or clip path; relative paths are under the client root
    pub fn source_path(&self, path: &Path) -> PathBuf {
        self.client_root().join(path)
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let base_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
    parse_manifest(&content, &base_dir)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))
}

/// Parse manifest text; relative roots resolve against `base_dir`
pub fn parse_manifest(content: &str, base_dir: &Path) -> Result<Manifest> {
    let mut manifest: Manifest = toml::from_str(content)?;
    manifest.base_dir = base_dir.to_path_buf();
    Ok(manifest)
}

/// A source file referenced by the manifest but absent on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingDependency {
    pub model_id: String,
    #[serde(rename = "type")]
    pub kind: DependencyKind,
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    SourceElu,
    SourceAni,
}

/// Validate a manifest without building
///
/// Structural problems are errors. Missing source files are returned so the
/// caller can decide whether they are fatal.
pub fn validate(manifest: &Manifest) -> Result<Vec<MissingDependency>> {
    if !(manifest.fps.is_finite() && manifest.fps > 0.0) {
        bail!("fps must be a positive number, got {}", manifest.fps);
    }

    let mut seen = HashSet::new();
    for target in &manifest.targets {
        if target.id.trim().is_empty() {
            bail!("Target with mesh {:?} has an empty id", target.mesh);
        }
        if !seen.insert(target.id.as_str()) {
            bail!("Duplicate target id '{}'", target.id);
        }
    }

    let mut targets: Vec<&TargetEntry> = manifest.targets.iter().collect();
    targets.sort_by(|a, b| a.id.cmp(&b.id));
    if let Some((id, first)) = output_claims(&targets).into_iter().flatten().next() {
        bail!(
            "Target ids '{}' and '{}' share the output directory {:?}",
            first,
            id,
            safe_target_path(id)
        );
    }

    let missing: Vec<_> = manifest
        .targets
        .iter()
        .flat_map(|t| missing_dependencies(manifest, t))
        .collect();
    for m in &missing {
        tracing::warn!("{} :: {:?} :: {}", m.model_id, m.kind, m.file);
    }
    Ok(missing)
}

fn missing_dependencies(manifest: &Manifest, target: &TargetEntry) -> Vec<MissingDependency> {
    let mut out = Vec::new();
    let mesh = manifest.source_path(&target.mesh);
    if !mesh.is_file() {
        out.push(MissingDependency {
            model_id: target.id.clone(),
            kind: DependencyKind::SourceElu,
            file: slash_path(&mesh),
        });
    }
    for clip in &target.clips {
        let path = manifest.source_path(&clip.path);
        if !path.is_file() {
            out.push(MissingDependency {
                model_id: target.id.clone(),
                kind: DependencyKind::SourceAni,
                file: slash_path(&path),
            });
        }
    }
    out
}

/// Command-line overrides for a build
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub output_override: Option<PathBuf>,
    /// Overrides the manifest's `strict` setting with `false`
    pub allow_missing: bool,
    pub fps_override: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Ok,
    Error,
    MissingSource,
}

/// Outcome of one target in the run manifest
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetResult {
    pub model_id: String,
    pub model_type: String,
    pub status: TargetStatus,
    pub source_elu: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_glb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_meta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ConversionSummary>,
    pub clip_count: usize,
    pub missing_ani_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glb_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInputs {
    pub client_root: String,
    pub output_root: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub target_count: usize,
    pub ok_count: usize,
    pub error_count: usize,
    pub missing_source_count: usize,
    pub missing_dependency_count: usize,
}

/// Run manifest written next to the converted models
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunManifest {
    pub version: &'static str,
    pub generated_at_unix: u64,
    pub strict: bool,
    pub inputs: RunInputs,
    pub stats: RunStats,
    pub missing: Vec<MissingDependency>,
    pub entries: Vec<TargetResult>,
}

impl RunManifest {
    /// Whether a strict run must fail
    pub fn has_failures(&self) -> bool {
        self.stats.missing_dependency_count > 0
            || self.stats.error_count > 0
            || self.stats.missing_source_count > 0
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMeta<'a> {
    model_id: &'a str,
    model_type: &'a str,
    source_elu: String,
    mesh_version: u32,
    clip_refs: Vec<ClipRef<'a>>,
    animation_results: &'a [ClipReport],
    summary: ConversionSummary,
    diagnostics: &'a [Diagnostic],
    hashes: Hashes,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClipRef<'a> {
    clip_name: &'a str,
    motion_type: i32,
    source_ani: String,
    exists: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Hashes {
    glb_sha256: String,
}

/// Build all targets from a manifest
///
/// Per-target failures, including output I/O for one target, are recorded
/// in the returned run manifest. Only failing to create the output root or
/// to write the run reports, or a strict run with failures, return an error.
pub fn build_all(manifest: &Manifest, options: &BuildOptions) -> Result<RunManifest> {
    let output_dir = options
        .output_override
        .clone()
        .unwrap_or_else(|| manifest.output_dir());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let strict = manifest.strict && !options.allow_missing;
    let fps = options.fps_override.unwrap_or(manifest.fps);
    let convert_options = ConvertOptions::with_fps(fps);

    // Sorted by id; the first entry for a repeated id wins
    let mut targets: Vec<&TargetEntry> = manifest.targets.iter().collect();
    targets.sort_by(|a, b| a.id.cmp(&b.id));
    targets.dedup_by(|b, a| a.id == b.id);
    let claims = output_claims(&targets);

    tracing::info!("Converting {} targets into {:?}", targets.len(), output_dir);

    let results: Vec<_> = targets
        .par_iter()
        .zip(claims.par_iter())
        .map(|(target, claim)| match claim {
            Some((_, first)) => collided_target(manifest, target, first),
            None => build_target(manifest, target, &output_dir, &convert_options),
        })
        .collect();

    let mut missing = Vec::new();
    let mut entries = Vec::with_capacity(results.len());
    for (target_missing, entry) in results {
        missing.extend(target_missing);
        entries.push(entry);
    }

    let count = |status: TargetStatus| entries.iter().filter(|e| e.status == status).count();
    let stats = RunStats {
        target_count: entries.len(),
        ok_count: count(TargetStatus::Ok),
        error_count: count(TargetStatus::Error),
        missing_source_count: count(TargetStatus::MissingSource),
        missing_dependency_count: missing.len(),
    };

    let run = RunManifest {
        version: "open_assets_manifest_v1",
        generated_at_unix: std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
        strict,
        inputs: RunInputs {
            client_root: slash_path(&manifest.client_root()),
            output_root: slash_path(&output_dir),
        },
        stats,
        missing,
        entries,
    };

    let run_json = serde_json::to_vec_pretty(&run)?;
    write_atomic(&output_dir.join(RUN_MANIFEST_FILE), &run_json)?;
    write_atomic(&output_dir.join(REPORT_FILE), render_report(&run).as_bytes())?;

    tracing::info!(
        "targets={} ok={} error={} missing_source={}",
        stats.target_count,
        stats.ok_count,
        stats.error_count,
        stats.missing_source_count
    );

    if strict && run.has_failures() {
        bail!(
            "strict mode failed: missing={} error={} missing_source={}",
            stats.missing_dependency_count,
            stats.error_count,
            stats.missing_source_count
        );
    }

    Ok(run)
}

fn build_target(
    manifest: &Manifest,
    target: &TargetEntry,
    output_dir: &Path,
    options: &ConvertOptions,
) -> (Vec<MissingDependency>, TargetResult) {
    let (missing, mut result) = pending_result(manifest, target);
    let mesh_path = manifest.source_path(&target.mesh);

    let mesh_bytes = match std::fs::read(&mesh_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("{}: mesh source unavailable: {}", target.id, e);
            return (missing, result);
        }
    };

    let clips: Vec<ClipSource> = target
        .clips
        .iter()
        .map(|clip| {
            let path = manifest.source_path(&clip.path);
            ClipSource {
                name: clip.name.clone(),
                motion_type: clip.motion_type,
                source: slash_path(&path),
                bytes: std::fs::read(&path).ok(),
            }
        })
        .collect();

    let target_dir = output_dir.join(safe_target_path(&target.id));
    let mesh_dir = mesh_path.parent().unwrap_or(Path::new(""));
    let resolver = FsTextureResolver::new(mesh_dir, &manifest.client_root(), &target_dir);

    let converted = match convert_to_memory(&mesh_bytes, &clips, &resolver, options) {
        Ok(converted) => converted,
        Err(e) => {
            tracing::warn!("{}: conversion failed: {}", target.id, e);
            result.status = TargetStatus::Error;
            result.error = Some(e.to_string());
            return (missing, result);
        }
    };

    let written = write_target(target, &mesh_path, &clips, &converted, &target_dir);
    let (glb_path, meta_path, glb_sha256) = match written {
        Ok(written) => written,
        Err(e) => {
            tracing::warn!("{}: failed to write outputs: {:#}", target.id, e);
            result.status = TargetStatus::Error;
            result.error = Some(format!("{e:#}"));
            return (missing, result);
        }
    };

    tracing::info!(
        "{} -> {:?} ({} vertices, {} animations)",
        target.id,
        glb_path,
        converted.summary.vertex_count,
        converted.summary.animation_count
    );

    result.status = TargetStatus::Ok;
    result.output_glb = Some(slash_path(&glb_path));
    result.output_meta = Some(slash_path(&meta_path));
    result.summary = Some(converted.summary);
    result.glb_sha256 = Some(glb_sha256);
    (missing, result)
}

/// For each target in order, the (id, earlier id) pair when an earlier
/// target already owns the same sanitized output directory
fn output_claims<'a>(targets: &[&'a TargetEntry]) -> Vec<Option<(&'a str, &'a str)>> {
    let mut owners: HashMap<PathBuf, &str> = HashMap::new();
    targets
        .iter()
        .map(|t| {
            let first = *owners.entry(safe_target_path(&t.id)).or_insert(t.id.as_str());
            (first != t.id).then_some((t.id.as_str(), first))
        })
        .collect()
}

/// Report for a target whose output directory belongs to `first`
fn collided_target(
    manifest: &Manifest,
    target: &TargetEntry,
    first: &str,
) -> (Vec<MissingDependency>, TargetResult) {
    let (missing, mut result) = pending_result(manifest, target);
    let message = format!(
        "output directory {:?} is already used by target '{}'",
        safe_target_path(&target.id),
        first
    );
    tracing::warn!("{}: {}", target.id, message);
    result.status = TargetStatus::Error;
    result.error = Some(message);
    (missing, result)
}

/// Result skeleton with status `missing_source`, plus the target's missing files
fn pending_result(
    manifest: &Manifest,
    target: &TargetEntry,
) -> (Vec<MissingDependency>, TargetResult) {
    let missing = missing_dependencies(manifest, target);
    let mesh_path = manifest.source_path(&target.mesh);
    let missing_ani_count = missing
        .iter()
        .filter(|m| m.kind == DependencyKind::SourceAni)
        .count();

    let result = TargetResult {
        model_id: target.id.clone(),
        model_type: target.kind.clone(),
        status: TargetStatus::MissingSource,
        source_elu: slash_path(&mesh_path),
        output_glb: None,
        output_meta: None,
        summary: None,
        clip_count: target.clips.len(),
        missing_ani_count,
        glb_sha256: None,
        error: None,
    };
    (missing, result)
}

/// Write `model.glb` and its sidecar; returns their paths and the GLB hash
fn write_target(
    target: &TargetEntry,
    mesh_path: &Path,
    clips: &[ClipSource],
    converted: &ConvertedModel,
    target_dir: &Path,
) -> Result<(PathBuf, PathBuf, String)> {
    std::fs::create_dir_all(target_dir)
        .with_context(|| format!("Failed to create {:?}", target_dir))?;

    let glb_path = target_dir.join(MODEL_FILE);
    write_atomic(&glb_path, &converted.glb)?;
    let glb_sha256 = hex::encode(Sha256::digest(&converted.glb));

    let sidecar = SourceMeta {
        model_id: &target.id,
        model_type: &target.kind,
        source_elu: slash_path(mesh_path),
        mesh_version: converted.mesh_version,
        clip_refs: clips
            .iter()
            .map(|c| ClipRef {
                clip_name: &c.name,
                motion_type: c.motion_type,
                source_ani: c.source.clone(),
                exists: c.bytes.is_some(),
            })
            .collect(),
        animation_results: &converted.clips,
        summary: converted.summary,
        diagnostics: &converted.diagnostics,
        hashes: Hashes {
            glb_sha256: glb_sha256.clone(),
        },
    };
    let meta_path = target_dir.join(SIDECAR_FILE);
    write_atomic(&meta_path, &serde_json::to_vec_pretty(&sidecar)?)?;

    Ok((glb_path, meta_path, glb_sha256))
}

/// Write through a temporary sibling and rename, so readers never see a partial file
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes).with_context(|| format!("Failed to write {:?}", tmp))?;
    std::fs::rename(&tmp, path).with_context(|| format!("Failed to move {:?} into place", path))?;
    Ok(())
}

/// Lowercased, filesystem-safe relative directory for a target id
pub fn safe_target_path(id: &str) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in id.split(['/', '\\']) {
        let safe = safe_segment(segment);
        if !safe.is_empty() && safe != "." && safe != ".." {
            path.push(safe);
        }
    }
    if path.as_os_str().is_empty() {
        path.push("unknown");
    }
    path
}

fn safe_segment(segment: &str) -> String {
    let mut out = String::new();
    for c in segment.trim().to_lowercase().chars() {
        let keep = c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-');
        let c = if keep { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn render_report(run: &RunManifest) -> String {
    let mut lines = vec![
        "# open_assets conversion report".to_string(),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- targets: **{}**", run.stats.target_count),
        format!("- ok: **{}**", run.stats.ok_count),
        format!("- error: **{}**", run.stats.error_count),
        format!("- missing_source: **{}**", run.stats.missing_source_count),
        format!("- missing dependencies: **{}**", run.stats.missing_dependency_count),
        String::new(),
        "## Entries".to_string(),
        String::new(),
        "| model_id | type | status | vertices | indices | animations | glb |".to_string(),
        "|---|---|---|---:|---:|---:|---|".to_string(),
    ];

    for e in &run.entries {
        let summary = e.summary.unwrap_or_default();
        let status = match e.status {
            TargetStatus::Ok => "ok",
            TargetStatus::Error => "error",
            TargetStatus::MissingSource => "missing_source",
        };
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} | {} |",
            e.model_id,
            e.model_type,
            status,
            summary.vertex_count,
            summary.index_count,
            summary.animation_count,
            e.output_glb.as_deref().unwrap_or("-")
        ));
    }

    lines.push(String::new());
    lines.push("## Missing Dependencies".to_string());
    lines.push(String::new());
    if run.missing.is_empty() {
        lines.push("- none".to_string());
    }
    for m in &run.missing {
        let kind = match m.kind {
            DependencyKind::SourceElu => "source_elu",
            DependencyKind::SourceAni => "source_ani",
        };
        lines.push(format!("- {} :: {} :: {}", m.model_id, kind, m.file));
    }

    lines.join("\n")
}
