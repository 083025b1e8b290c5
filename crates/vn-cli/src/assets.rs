use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use vn_runtime::AssetRoots;
use walkdir::WalkDir;

/// Files found under the image and audio roots when the story was opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AssetIndex {
    files: BTreeSet<PathBuf>,
}

impl AssetIndex {
    pub(crate) fn scan(roots: &AssetRoots) -> Self {
        let mut files = BTreeSet::new();
        for root in [&roots.images, &roots.audio] {
            scan_root(root, &mut files);
        }
        tracing::debug!(files = files.len(), "asset index built");
        Self { files }
    }

    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub(crate) fn len(&self) -> usize {
        self.files.len()
    }
}

fn scan_root(root: &Path, files: &mut BTreeSet<PathBuf>) {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "asset root missing");
        return;
    }
    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                files.insert(entry.into_path());
            }
            Ok(_) => {}
            Err(error) => tracing::warn!(%error, "skipping unreadable asset entry"),
        }
    }
}
