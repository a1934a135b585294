//! Texture reference resolution
//!
//! The converter core only ever sees a [`TextureResolver`]. The filesystem
//! search used by the batch driver lives in [`FsTextureResolver`].

use std::path::{Component, Path, PathBuf};

/// Maps a legacy texture name to an output-relative URI
pub trait TextureResolver {
    fn resolve(&self, legacy_name: &str) -> Option<String>;
}

impl<F> TextureResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, legacy_name: &str) -> Option<String> {
        self(legacy_name)
    }
}

/// Resolver that never finds anything
pub struct NoTextures;

impl TextureResolver for NoTextures {
    fn resolve(&self, _legacy_name: &str) -> Option<String> {
        None
    }
}

/// Extensions that also have a compressed `.dds` variant on disk
const DDS_SOURCE_EXTENSIONS: &[&str] = &["tga", "bmp", "jpg", "jpeg", "png"];

/// Extensions probed for names without one, in order
const PROBE_EXTENSIONS: &[&str] = &["dds", "png", "bmp", "tga", "jpg", "jpeg"];

/// Prefixes of names that are relative to the client root, not the mesh
const CLIENT_ROOT_PREFIXES: &[&str] = &["model/", "system/", "ui/"];

/// Searches the mesh directory and the client root for texture files
///
/// Found files are returned relative to the directory the model is written to.
pub struct FsTextureResolver {
    mesh_dir: PathBuf,
    client_root: PathBuf,
    model_dir: PathBuf,
}

impl FsTextureResolver {
    pub fn new(mesh_dir: &Path, client_root: &Path, model_dir: &Path) -> Self {
        Self {
            mesh_dir: absolute(mesh_dir),
            client_root: absolute(client_root),
            model_dir: absolute(model_dir),
        }
    }

    /// Candidate paths for `name`, in search order, without duplicates
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let raw = name.trim().replace('\\', "/");
        if raw.is_empty() {
            return Vec::new();
        }
        let lower = raw.to_lowercase();
        let client_relative = CLIENT_ROOT_PREFIXES.iter().any(|p| lower.starts_with(p));
        let extension = Path::new(&lower)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);

        let mut out: Vec<PathBuf> = Vec::new();
        let mut add = |path: PathBuf| {
            if !out.contains(&path) {
                out.push(path);
            }
        };

        if !client_relative {
            add(self.mesh_dir.join(&raw));
        }
        add(self.client_root.join(&raw));

        match extension.as_deref() {
            Some(ext) if DDS_SOURCE_EXTENSIONS.contains(&ext) => {
                let appended = format!("{raw}.dds");
                let replaced = format!("{}.dds", &raw[..raw.len() - ext.len() - 1]);
                if client_relative {
                    add(self.client_root.join(&appended));
                    add(self.client_root.join(&replaced));
                } else {
                    add(self.mesh_dir.join(&appended));
                    add(self.mesh_dir.join(&replaced));
                    add(self.client_root.join(&appended));
                }
            }
            None => {
                for ext in PROBE_EXTENSIONS {
                    let probed = format!("{raw}.{ext}");
                    if !client_relative {
                        add(self.mesh_dir.join(&probed));
                    }
                    add(self.client_root.join(&probed));
                }
            }
            Some(_) => {}
        }

        out
    }
}

impl TextureResolver for FsTextureResolver {
    fn resolve(&self, legacy_name: &str) -> Option<String> {
        let found = self
            .candidates(legacy_name)
            .into_iter()
            .find(|candidate| candidate.is_file())?;
        Some(relative_uri(&self.model_dir, &found))
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Lexically normalize `.` and `..` components
fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.last(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Forward-slash path from directory `from` to `to`
pub fn relative_uri(from: &Path, to: &Path) -> String {
    let from = normalize(from);
    let to = normalize(to);
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(std::iter::repeat_n("..".to_string(), from.len() - common));
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}
