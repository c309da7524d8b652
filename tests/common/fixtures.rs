use asm_versions_engine::fixture::AssemblyImage;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// The ECMA-335 neutral key; its token is `b77a5c561934e089`.
#[allow(dead_code)]
pub const ECMA_KEY: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0];

/// Temporary directory tree to scan.
#[derive(Debug)]
pub struct ScanTree {
    dir: TempDir,
}

#[allow(dead_code)]
impl ScanTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a synthetic assembly at `rel` (forward slashes).
    pub fn assembly(&self, rel: &str, image: AssemblyImage) -> PathBuf {
        let path = self.prepare(rel);
        image.write_to(&path).unwrap();
        path
    }

    pub fn file(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let path = self.prepare(rel);
        fs::write(&path, contents).unwrap();
        path
    }

    fn prepare(&self, rel: &str) -> PathBuf {
        let path = rel.split('/').fold(self.path().to_path_buf(), |p, c| p.join(c));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        path
    }
}

/// Native rendering of a forward-slash relative path.
#[allow(dead_code)]
pub fn native(rel: &str) -> String {
    rel.split('/')
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}
