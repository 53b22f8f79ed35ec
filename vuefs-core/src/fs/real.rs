//! Disk-backed filesystem host.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{split_patterns, FileSystemHost, RuntimeDirEntry};
use crate::error::{FsError, FsResult};
use crate::glob::{contains_glob, glob_match, literal_prefix};

/// Filesystem host over the real disk.
///
/// Blocking operations use `std::fs`, async operations use `tokio::fs`.
#[derive(Debug, Clone)]
pub struct RealFileSystemHost {
    cwd: PathBuf,
}

impl RealFileSystemHost {
    /// Host rooted at the process working directory.
    pub fn new() -> FsResult<Self> {
        Ok(Self {
            cwd: std::env::current_dir()?,
        })
    }

    /// Host that resolves relative paths against `cwd`.
    pub fn with_current_directory(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.cwd.join(p)
        }
    }

    /// Absolute, `/`-separated form used for glob matching.
    fn resolve_pattern(&self, pattern: &str) -> String {
        let pattern = pattern.replace('\\', "/");
        if Path::new(&pattern).is_absolute() || pattern.starts_with('/') {
            pattern
        } else {
            format!("{}/{}", slash_path(&self.cwd).trim_end_matches('/'), pattern)
        }
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn copy_dir_all(src: &Path, dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Collect every file below `dir` into `out`.
fn walk_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("glob: skipping {}: {}", dir.display(), e);
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            // Follow the link, but never into a directory we are already in.
            match std::fs::metadata(&path) {
                Ok(m) if m.is_file() => out.push(path),
                Ok(m) if m.is_dir() => {
                    let looped = std::fs::canonicalize(&path)
                        .ok()
                        .zip(std::fs::canonicalize(dir).ok())
                        .is_some_and(|(target, here)| here.starts_with(target));
                    if !looped {
                        walk_files(&path, out);
                    }
                }
                _ => {}
            }
        } else if file_type.is_dir() {
            walk_files(&path, out);
        } else if file_type.is_file() {
            out.push(path);
        }
    }
}

impl RealFileSystemHost {
    fn walk_glob(&self, patterns: &[String]) -> Vec<String> {
        let (include, exclude) = split_patterns(patterns);
        let exclude: Vec<String> = exclude.iter().map(|p| self.resolve_pattern(p)).collect();

        let mut matches = BTreeSet::new();
        for pattern in include {
            let pattern = self.resolve_pattern(pattern);
            if !contains_glob(&pattern) {
                let excluded = exclude.iter().any(|p| glob_match(p, &pattern));
                if !excluded && Path::new(&pattern).is_file() {
                    matches.insert(display(Path::new(&pattern)));
                }
                continue;
            }

            let base = match literal_prefix(&pattern) {
                "" => self.cwd.clone(),
                prefix => PathBuf::from(prefix),
            };

            let mut files = Vec::new();
            walk_files(&base, &mut files);
            for file in files {
                let candidate = slash_path(&file);
                if glob_match(&pattern, &candidate)
                    && !exclude.iter().any(|p| glob_match(p, &candidate))
                {
                    matches.insert(display(&file));
                }
            }
        }
        matches.into_iter().collect()
    }
}

#[async_trait]
impl FileSystemHost for RealFileSystemHost {
    fn is_case_sensitive(&self) -> bool {
        !cfg!(any(windows, target_os = "macos"))
    }

    async fn delete(&self, path: &str) -> FsResult<()> {
        let target = self.resolve(path);
        let meta = tokio::fs::symlink_metadata(&target)
            .await
            .map_err(|e| FsError::from_io_file(&display(&target), e))?;
        let result = if meta.is_dir() {
            tokio::fs::remove_dir_all(&target).await
        } else {
            tokio::fs::remove_file(&target).await
        };
        result.map_err(|e| FsError::from_io_file(&display(&target), e))
    }

    fn delete_sync(&self, path: &str) -> FsResult<()> {
        let target = self.resolve(path);
        let meta = std::fs::symlink_metadata(&target)
            .map_err(|e| FsError::from_io_file(&display(&target), e))?;
        let result = if meta.is_dir() {
            std::fs::remove_dir_all(&target)
        } else {
            std::fs::remove_file(&target)
        };
        result.map_err(|e| FsError::from_io_file(&display(&target), e))
    }

    fn read_dir_sync(&self, dir_path: &str) -> FsResult<Vec<RuntimeDirEntry>> {
        let dir = self.resolve(dir_path);
        let read_dir =
            std::fs::read_dir(&dir).map_err(|e| FsError::from_io_dir(&display(&dir), e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let (is_file, is_directory) = if file_type.is_symlink() {
                // Report what the link points at.
                std::fs::metadata(entry.path())
                    .map(|m| (m.is_file(), m.is_dir()))
                    .unwrap_or((false, false))
            } else {
                (file_type.is_file(), file_type.is_dir())
            };
            entries.push(RuntimeDirEntry {
                name: display(&entry.path()),
                is_file,
                is_directory,
                is_symlink: file_type.is_symlink(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_file(&self, file_path: &str) -> FsResult<String> {
        let path = self.resolve(file_path);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FsError::from_io_file(&display(&path), e))
    }

    fn read_file_sync(&self, file_path: &str) -> FsResult<String> {
        let path = self.resolve(file_path);
        std::fs::read_to_string(&path).map_err(|e| FsError::from_io_file(&display(&path), e))
    }

    async fn write_file(&self, file_path: &str, file_text: &str) -> FsResult<()> {
        let path = self.resolve(file_path);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| FsError::from_io_dir(&display(dir), e))?;
        }
        tokio::fs::write(&path, file_text)
            .await
            .map_err(|e| FsError::from_io_file(&display(&path), e))
    }

    fn write_file_sync(&self, file_path: &str, file_text: &str) -> FsResult<()> {
        let path = self.resolve(file_path);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| FsError::from_io_dir(&display(dir), e))?;
        }
        std::fs::write(&path, file_text).map_err(|e| FsError::from_io_file(&display(&path), e))
    }

    async fn mkdir(&self, dir_path: &str) -> FsResult<()> {
        let dir = self.resolve(dir_path);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| FsError::from_io_dir(&display(&dir), e))
    }

    fn mkdir_sync(&self, dir_path: &str) -> FsResult<()> {
        let dir = self.resolve(dir_path);
        std::fs::create_dir_all(&dir).map_err(|e| FsError::from_io_dir(&display(&dir), e))
    }

    async fn move_path(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        let src = self.resolve(src_path);
        let dest = self.resolve(dest_path);
        if let Some(dir) = dest.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| FsError::from_io_dir(&display(dir), e))?;
        }
        tokio::fs::rename(&src, &dest)
            .await
            .map_err(|e| FsError::from_io_file(&display(&src), e))
    }

    fn move_path_sync(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        let src = self.resolve(src_path);
        let dest = self.resolve(dest_path);
        if let Some(dir) = dest.parent() {
            std::fs::create_dir_all(dir).map_err(|e| FsError::from_io_dir(&display(dir), e))?;
        }
        std::fs::rename(&src, &dest).map_err(|e| FsError::from_io_file(&display(&src), e))
    }

    async fn copy(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        let host = self.clone();
        let (src, dest) = (src_path.to_string(), dest_path.to_string());
        tokio::task::spawn_blocking(move || host.copy_sync(&src, &dest))
            .await
            .map_err(|e| FsError::Io(std::io::Error::other(e)))?
    }

    fn copy_sync(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        let src = self.resolve(src_path);
        let dest = self.resolve(dest_path);
        let meta = std::fs::metadata(&src).map_err(|e| FsError::from_io_file(&display(&src), e))?;
        if meta.is_dir() {
            return copy_dir_all(&src, &dest).map_err(|e| FsError::from_io_file(&display(&src), e));
        }
        if let Some(dir) = dest.parent() {
            std::fs::create_dir_all(dir).map_err(|e| FsError::from_io_dir(&display(dir), e))?;
        }
        std::fs::copy(&src, &dest)
            .map(|_| ())
            .map_err(|e| FsError::from_io_file(&display(&src), e))
    }

    async fn file_exists(&self, file_path: &str) -> bool {
        tokio::fs::metadata(self.resolve(file_path))
            .await
            .is_ok_and(|m| m.is_file())
    }

    fn file_exists_sync(&self, file_path: &str) -> bool {
        self.resolve(file_path).is_file()
    }

    async fn directory_exists(&self, dir_path: &str) -> bool {
        tokio::fs::metadata(self.resolve(dir_path))
            .await
            .is_ok_and(|m| m.is_dir())
    }

    fn directory_exists_sync(&self, dir_path: &str) -> bool {
        self.resolve(dir_path).is_dir()
    }

    fn realpath_sync(&self, path: &str) -> FsResult<String> {
        let resolved = self.resolve(path);
        std::fs::canonicalize(&resolved)
            .map(|p| display(&p))
            .map_err(|e| FsError::from_io_file(&display(&resolved), e))
    }

    fn get_current_directory(&self) -> String {
        display(&self.cwd)
    }

    async fn glob(&self, patterns: &[String]) -> FsResult<Vec<String>> {
        let host = self.clone();
        let patterns = patterns.to_vec();
        tokio::task::spawn_blocking(move || host.walk_glob(&patterns))
            .await
            .map_err(|e| FsError::Io(std::io::Error::other(e)))
    }

    fn glob_sync(&self, patterns: &[String]) -> FsResult<Vec<String>> {
        Ok(self.walk_glob(patterns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn host() -> (TempDir, RealFileSystemHost) {
        let dir = TempDir::new().unwrap();
        let host = RealFileSystemHost::with_current_directory(dir.path());
        (dir, host)
    }

    #[test]
    fn test_write_read_relative() {
        let (dir, fs) = host();
        fs.write_file_sync("src/App.vue", "<template/>").unwrap();

        assert!(dir.path().join("src/App.vue").is_file());
        assert_eq!(fs.read_file_sync("src/App.vue").unwrap(), "<template/>");
        assert!(fs.file_exists_sync("src/App.vue"));
        assert!(fs.directory_exists_sync("src"));
        assert!(!fs.file_exists_sync("src"));
    }

    #[test]
    fn test_missing_file_error() {
        let (_dir, fs) = host();
        assert!(matches!(
            fs.read_file_sync("missing.vue"),
            Err(FsError::FileNotFound(p)) if p.ends_with("missing.vue")
        ));
        assert!(matches!(
            fs.read_dir_sync("nowhere"),
            Err(FsError::DirectoryNotFound(_))
        ));
        assert!(matches!(
            fs.delete_sync("missing.vue"),
            Err(FsError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_read_dir_sorted_full_paths() {
        let (dir, fs) = host();
        fs.write_file_sync("b.txt", "").unwrap();
        fs.write_file_sync("a.vue", "").unwrap();
        fs.mkdir_sync("sub").unwrap();

        let entries = fs.read_dir_sync(&fs.get_current_directory()).unwrap();
        let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        let root = dir.path();
        assert_eq!(
            names,
            vec![
                display(&root.join("a.vue")),
                display(&root.join("b.txt")),
                display(&root.join("sub")),
            ]
        );
        assert!(entries[2].is_directory);
    }

    #[test]
    fn test_copy_move_delete_tree() {
        let (_dir, fs) = host();
        fs.write_file_sync("src/a.ts", "a").unwrap();
        fs.write_file_sync("src/x/b.ts", "b").unwrap();

        fs.copy_sync("src", "copy").unwrap();
        assert_eq!(fs.read_file_sync("copy/x/b.ts").unwrap(), "b");

        fs.move_path_sync("copy", "moved/inner").unwrap();
        assert!(!fs.directory_exists_sync("copy"));
        assert_eq!(fs.read_file_sync("moved/inner/a.ts").unwrap(), "a");

        fs.delete_sync("moved").unwrap();
        assert!(!fs.directory_exists_sync("moved"));
    }

    #[test]
    fn test_glob_sync() {
        let (_dir, fs) = host();
        fs.write_file_sync("src/App.vue", "").unwrap();
        fs.write_file_sync("src/main.ts", "").unwrap();
        fs.write_file_sync("src/gen/types.ts", "").unwrap();

        let found = fs
            .glob_sync(&["src/**/*.ts".to_string(), "!src/gen/**".to_string()])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("main.ts"));

        let none = fs.glob_sync(&["missing/**/*.ts".to_string()]).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_glob_literal_pattern() {
        let (dir, fs) = host();
        fs.write_file_sync("src/App.vue", "").unwrap();

        let found = fs.glob_sync(&["src/App.vue".to_string()]).unwrap();
        assert_eq!(found, vec![display(&dir.path().join("src/App.vue"))]);
        assert!(fs.glob_sync(&["src/Other.vue".to_string()]).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_glob_follows_symlinks() {
        let (dir, fs) = host();
        fs.write_file_sync("shared/Button.vue", "").unwrap();
        fs.write_file_sync("src/App.vue", "").unwrap();
        let root = dir.path();
        std::os::unix::fs::symlink(root.join("shared"), root.join("src/linked")).unwrap();
        std::os::unix::fs::symlink(root.join("src/App.vue"), root.join("src/Alias.vue")).unwrap();
        // Points back up the tree; must not recurse forever.
        std::os::unix::fs::symlink(root.join("src"), root.join("src/self")).unwrap();

        let found = fs.glob_sync(&["src/**/*.vue".to_string()]).unwrap();
        assert_eq!(
            found,
            vec![
                display(&root.join("src/Alias.vue")),
                display(&root.join("src/App.vue")),
                display(&root.join("src/linked/Button.vue")),
            ]
        );
    }

    #[tokio::test]
    async fn test_async_ops() {
        let (_dir, fs) = host();
        fs.write_file("deep/nested/file.vue", "<script>\nx\n</script>")
            .await
            .unwrap();
        assert!(fs.file_exists("deep/nested/file.vue").await);
        assert!(fs.directory_exists("deep").await);
        assert_eq!(
            fs.read_file("deep/nested/file.vue").await.unwrap(),
            "<script>\nx\n</script>"
        );

        fs.copy("deep", "other").await.unwrap();
        fs.move_path("other/nested/file.vue", "final.vue").await.unwrap();
        let found = fs.glob(&["**/*.vue".to_string()]).await.unwrap();
        assert_eq!(found.len(), 2);

        fs.delete("deep").await.unwrap();
        assert!(!fs.directory_exists("deep").await);
    }

    #[test]
    fn test_realpath() {
        let (dir, fs) = host();
        fs.write_file_sync("a.vue", "").unwrap();
        let real = fs.realpath_sync("./a.vue").unwrap();
        let expected = std::fs::canonicalize(dir.path().join("a.vue")).unwrap();
        assert_eq!(real, display(&expected));
    }
}
