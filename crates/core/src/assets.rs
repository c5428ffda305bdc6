//! Image asset lookup for form avatars and backgrounds.
//!
//! Forms store relative paths; a public URL is only exposed when the file
//! behind the path actually exists. The store is injected so callers can
//! swap the filesystem for something else in tests.

use std::path::{Path, PathBuf};

/// Public URL prefix under which stored images are served.
pub const IMAGES_PREFIX: &str = "images";

/// Reports whether a stored asset exists.
pub trait AssetStore: Send + Sync {
    fn exists(&self, path: &str) -> bool;
}

/// Asset store backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for LocalAssetStore {
    fn exists(&self, path: &str) -> bool {
        let relative = Path::new(path);
        // Stored paths are relative; anything escaping the root is ignored.
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return false;
        }
        self.root.join(relative).is_file()
    }
}

/// Public URL for a stored image, or `None` when no path is set or the
/// asset is missing.
pub fn asset_url(base_url: &str, store: &dyn AssetStore, path: Option<&str>) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    if !store.exists(path) {
        return None;
    }
    Some(format!(
        "{}/{IMAGES_PREFIX}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_only_for_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("avatar.png"), b"png").unwrap();
        let store = LocalAssetStore::new(dir.path());

        assert_eq!(
            asset_url("https://forms.test/", &store, Some("avatar.png")),
            Some("https://forms.test/images/avatar.png".to_string())
        );
        assert_eq!(asset_url("https://forms.test", &store, Some("missing.png")), None);
        assert_eq!(asset_url("https://forms.test", &store, None), None);
        assert_eq!(asset_url("https://forms.test", &store, Some("")), None);
    }

    #[test]
    fn directories_are_not_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let store = LocalAssetStore::new(dir.path());
        assert!(!store.exists("nested"));
    }

    #[test]
    fn paths_outside_root_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path().join("inner"));
        std::fs::create_dir(store.root()).unwrap();
        std::fs::write(dir.path().join("secret.png"), b"x").unwrap();
        assert!(!store.exists("../secret.png"));
        assert!(!store.exists("/etc/passwd"));
    }
}
