// src/utils/fsio.rs
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Replace `path` with `bytes` through a sibling `.tmp` file, so readers see
/// either the old report or the new one. The temp file never outlives a failure.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create_dir_all({:?})", parent))?;
    }
    let tmp = path.with_extension("tmp");
    let staged = File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(bytes)?;
            f.sync_all()
        })
        .with_context(|| format!("stage {:?}", tmp))
        .and_then(|()| {
            fs::rename(&tmp, path).with_context(|| format!("rename {:?} -> {:?}", tmp, path))
        });
    if staged.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    staged
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("nested").join("report.html");
        write_atomic(&out, b"first").unwrap();
        write_atomic(&out, b"second").unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "second");
        assert!(!out.with_extension("tmp").exists());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        // a non-empty directory cannot be renamed over
        let out = tmp.path().join("report");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("keep"), "x").unwrap();

        assert!(write_atomic(&out, b"body").is_err());
        assert!(!tmp.path().join("report.tmp").exists());
        assert!(out.join("keep").exists());
    }
}
