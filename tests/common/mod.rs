use camino::Utf8PathBuf;
use spicery::backend::synthetic::SyntheticSpice;
use spicery::Spicery;
use tempfile::TempDir;

/// A temporary directory to drop synthetic kernel files into.
pub struct KernelDir {
    dir: TempDir,
}

impl KernelDir {
    pub fn new() -> Self {
        KernelDir {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Write a kernel file with the given name and return its path.
    pub fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write kernel file");
        Utf8PathBuf::from_path_buf(path).expect("temp path is not UTF-8")
    }
}

pub fn service() -> Spicery {
    Spicery::new(Box::new(SyntheticSpice::new())).expect("service construction failed")
}

/// An ephemeris kernel with the Moon covered on [100, 200] moving linearly
/// along +X, and the Earth parked off-origin over a wide window.
pub const MOON_EARTH_BSP: &str = "\
body 301 MOON  100 200  1000 0 0   10 0 0
body 399 EARTH 0 1000000  500 0 0   0 0 0
";
