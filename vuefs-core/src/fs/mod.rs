//! Filesystem host abstraction.
//!
//! This module provides the capability interface a project host talks to:
//! - `FileSystemHost`: blocking and async file operations
//! - `InMemoryFileSystemHost`: in-memory implementation for tests
//! - `RealFileSystemHost`: disk-backed implementation

mod memory;
mod real;

use async_trait::async_trait;

use crate::error::FsResult;

pub use memory::InMemoryFileSystemHost;
pub use real::RealFileSystemHost;

/// Entry returned by [`FileSystemHost::read_dir_sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeDirEntry {
    /// Full path of the entry.
    pub name: String,
    pub is_file: bool,
    pub is_directory: bool,
    pub is_symlink: bool,
}

impl RuntimeDirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_file: true,
            is_directory: false,
            is_symlink: false,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_file: false,
            is_directory: true,
            is_symlink: false,
        }
    }
}

/// File operations consumed by a project host.
///
/// Every async operation has a blocking `_sync` twin with the same contract.
/// Paths are plain strings; relative paths resolve against
/// [`get_current_directory`](FileSystemHost::get_current_directory).
#[async_trait]
pub trait FileSystemHost: Send + Sync {
    fn is_case_sensitive(&self) -> bool;

    /// Delete a file or a directory tree.
    async fn delete(&self, path: &str) -> FsResult<()>;
    fn delete_sync(&self, path: &str) -> FsResult<()>;

    fn read_dir_sync(&self, dir_path: &str) -> FsResult<Vec<RuntimeDirEntry>>;

    async fn read_file(&self, file_path: &str) -> FsResult<String>;
    fn read_file_sync(&self, file_path: &str) -> FsResult<String>;

    /// Write a file, creating missing parent directories.
    async fn write_file(&self, file_path: &str, file_text: &str) -> FsResult<()>;
    fn write_file_sync(&self, file_path: &str, file_text: &str) -> FsResult<()>;

    /// Create a directory and any missing parents.
    async fn mkdir(&self, dir_path: &str) -> FsResult<()>;
    fn mkdir_sync(&self, dir_path: &str) -> FsResult<()>;

    async fn move_path(&self, src_path: &str, dest_path: &str) -> FsResult<()>;
    fn move_path_sync(&self, src_path: &str, dest_path: &str) -> FsResult<()>;

    async fn copy(&self, src_path: &str, dest_path: &str) -> FsResult<()>;
    fn copy_sync(&self, src_path: &str, dest_path: &str) -> FsResult<()>;

    async fn file_exists(&self, file_path: &str) -> bool;
    fn file_exists_sync(&self, file_path: &str) -> bool;

    async fn directory_exists(&self, dir_path: &str) -> bool;
    fn directory_exists_sync(&self, dir_path: &str) -> bool;

    fn realpath_sync(&self, path: &str) -> FsResult<String>;

    fn get_current_directory(&self) -> String;

    /// Paths of files matching any pattern; patterns starting with `!` exclude.
    async fn glob(&self, patterns: &[String]) -> FsResult<Vec<String>>;
    fn glob_sync(&self, patterns: &[String]) -> FsResult<Vec<String>>;
}

/// Split glob patterns into includes and `!`-prefixed excludes.
pub(crate) fn split_patterns(patterns: &[String]) -> (Vec<&str>, Vec<&str>) {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for pattern in patterns {
        match pattern.strip_prefix('!') {
            Some(p) => exclude.push(p),
            None => include.push(pattern.as_str()),
        }
    }
    (include, exclude)
}

/// Normalize a path against `cwd`: make it absolute, unify separators and
/// collapse `.` and `..` segments.
pub(crate) fn normalize_path(cwd: &str, path: &str) -> String {
    let path = path.replace('\\', "/");
    let joined = if path.starts_with('/') {
        path
    } else {
        format!("{}/{}", cwd.trim_end_matches('/'), path)
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/", "file.vue"), "/file.vue");
        assert_eq!(normalize_path("/proj", "src/./a/../b.ts"), "/proj/src/b.ts");
        assert_eq!(normalize_path("/proj", "/abs//x"), "/abs/x");
        assert_eq!(normalize_path("/proj", "..\\..\\up"), "/up");
        assert_eq!(normalize_path("/", "/"), "/");
    }

    #[test]
    fn test_split_patterns() {
        let patterns = vec!["/src/**/*.ts".to_string(), "!/src/gen/**".to_string()];
        let (include, exclude) = split_patterns(&patterns);
        assert_eq!(include, vec!["/src/**/*.ts"]);
        assert_eq!(exclude, vec!["/src/gen/**"]);
    }
}
