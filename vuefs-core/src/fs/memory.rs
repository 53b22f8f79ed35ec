//! In-memory filesystem host.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{normalize_path, split_patterns, FileSystemHost, RuntimeDirEntry};
use crate::error::{FsError, FsResult};
use crate::glob::glob_match;

#[derive(Debug, Default, Clone)]
struct MemoryTree {
    files: BTreeMap<String, String>,
    /// Always contains `/`.
    dirs: BTreeSet<String>,
}

impl MemoryTree {
    fn new() -> Self {
        let mut dirs = BTreeSet::new();
        dirs.insert("/".to_string());
        Self {
            files: BTreeMap::new(),
            dirs,
        }
    }

    /// Create `dir` and its missing ancestors. Fails without changing
    /// anything if a file sits where one of them should be.
    fn add_dir_all(&mut self, dir: &str) -> FsResult<()> {
        let mut missing = Vec::new();
        let mut current = Some(dir);
        while let Some(d) = current {
            if self.dirs.contains(d) {
                break;
            }
            if self.files.contains_key(d) {
                return Err(FsError::NotAFile(d.to_string()));
            }
            missing.push(d.to_string());
            current = parent(d);
        }
        self.dirs.extend(missing);
        Ok(())
    }

    fn add_file(&mut self, path: &str, text: &str) -> FsResult<()> {
        if self.dirs.contains(path) {
            return Err(FsError::NotAFile(path.to_string()));
        }
        if let Some(dir) = parent(path) {
            self.add_dir_all(dir)?;
        }
        self.files.insert(path.to_string(), text.to_string());
        Ok(())
    }

    /// Files and directories at or below `dir`.
    fn subtree(&self, dir: &str) -> (Vec<String>, Vec<String>) {
        let prefix = descendant_prefix(dir);
        let dirs = self
            .dirs
            .iter()
            .filter(|d| d.as_str() == dir || d.starts_with(&prefix))
            .cloned()
            .collect();
        let files = self
            .files
            .keys()
            .filter(|f| f.starts_with(&prefix))
            .cloned()
            .collect();
        (dirs, files)
    }

    fn copy_entry(&mut self, src: &str, dest: &str) -> FsResult<()> {
        if dest.starts_with(&descendant_prefix(src)) {
            return Err(FsError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot copy {} into itself at {}", src, dest),
            )));
        }
        if let Some(text) = self.files.get(src).cloned() {
            return self.add_file(dest, &text);
        }
        if !self.dirs.contains(src) {
            return Err(FsError::FileNotFound(src.to_string()));
        }

        let (dirs, files) = self.subtree(src);
        for d in dirs {
            self.add_dir_all(&rebase(&d, src, dest))?;
        }
        for f in files {
            let text = self.files[&f].clone();
            self.add_file(&rebase(&f, src, dest), &text)?;
        }
        Ok(())
    }

    fn remove_entry(&mut self, path: &str) -> FsResult<()> {
        if self.files.remove(path).is_some() {
            return Ok(());
        }
        if !self.dirs.contains(path) {
            return Err(FsError::FileNotFound(path.to_string()));
        }

        let (dirs, files) = self.subtree(path);
        for f in files {
            self.files.remove(&f);
        }
        for d in dirs {
            if d != "/" {
                self.dirs.remove(&d);
            }
        }
        Ok(())
    }
}

fn parent(path: &str) -> Option<&str> {
    match path.rfind('/') {
        _ if path == "/" => None,
        Some(0) => Some("/"),
        Some(pos) => Some(&path[..pos]),
        None => None,
    }
}

fn descendant_prefix(dir: &str) -> String {
    if dir == "/" {
        "/".to_string()
    } else {
        format!("{}/", dir)
    }
}

/// Move `path` from under `from` to under `to`.
fn rebase(path: &str, from: &str, to: &str) -> String {
    normalize_path("/", &format!("{}/{}", to, &path[from.len()..]))
}

/// Filesystem that lives entirely in memory.
///
/// Paths resolve against the current directory (`/` by default). Cloning
/// shares nothing: each clone owns its own tree.
#[derive(Debug)]
pub struct InMemoryFileSystemHost {
    tree: RwLock<MemoryTree>,
    cwd: String,
}

impl Default for InMemoryFileSystemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryFileSystemHost {
    fn clone(&self) -> Self {
        let tree = self
            .tree
            .read()
            .map(|t| MemoryTree::clone(&t))
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone());
        Self {
            tree: RwLock::new(tree),
            cwd: self.cwd.clone(),
        }
    }
}

impl InMemoryFileSystemHost {
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(MemoryTree::new()),
            cwd: "/".to_string(),
        }
    }

    /// Create with an initial set of files.
    pub fn with_files<I, P, T>(files: I) -> FsResult<Self>
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
        T: AsRef<str>,
    {
        let host = Self::new();
        for (path, text) in files {
            host.write_file_sync(path.as_ref(), text.as_ref())?;
        }
        Ok(host)
    }

    /// Resolve relative paths against `cwd` instead of `/`.
    pub fn with_current_directory(mut self, cwd: &str) -> Self {
        self.cwd = normalize_path("/", cwd);
        if let Ok(mut tree) = self.tree.write() {
            if let Err(e) = tree.add_dir_all(&self.cwd) {
                tracing::warn!("current directory {} not created: {}", self.cwd, e);
            }
        }
        self
    }

    /// Paths of every file, sorted.
    pub fn file_paths(&self) -> FsResult<Vec<String>> {
        Ok(self.read()?.files.keys().cloned().collect())
    }

    fn resolve(&self, path: &str) -> String {
        normalize_path(&self.cwd, path)
    }

    fn read(&self) -> FsResult<RwLockReadGuard<'_, MemoryTree>> {
        self.tree.read().map_err(|_| FsError::LockPoisoned)
    }

    fn write(&self) -> FsResult<RwLockWriteGuard<'_, MemoryTree>> {
        self.tree.write().map_err(|_| FsError::LockPoisoned)
    }
}

#[async_trait]
impl FileSystemHost for InMemoryFileSystemHost {
    fn is_case_sensitive(&self) -> bool {
        true
    }

    async fn delete(&self, path: &str) -> FsResult<()> {
        self.delete_sync(path)
    }

    fn delete_sync(&self, path: &str) -> FsResult<()> {
        let path = self.resolve(path);
        self.write()?.remove_entry(&path)
    }

    fn read_dir_sync(&self, dir_path: &str) -> FsResult<Vec<RuntimeDirEntry>> {
        let dir = self.resolve(dir_path);
        let tree = self.read()?;
        if !tree.dirs.contains(&dir) {
            return Err(FsError::DirectoryNotFound(dir));
        }

        let is_child = |p: &String| p.as_str() != dir && parent(p) == Some(dir.as_str());
        let mut entries: Vec<RuntimeDirEntry> = tree
            .dirs
            .iter()
            .filter(|d| is_child(*d))
            .map(|d| RuntimeDirEntry::directory(d.as_str()))
            .chain(
                tree.files
                    .keys()
                    .filter(|f| is_child(*f))
                    .map(|f| RuntimeDirEntry::file(f.as_str())),
            )
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_file(&self, file_path: &str) -> FsResult<String> {
        self.read_file_sync(file_path)
    }

    fn read_file_sync(&self, file_path: &str) -> FsResult<String> {
        let path = self.resolve(file_path);
        self.read()?
            .files
            .get(&path)
            .cloned()
            .ok_or(FsError::FileNotFound(path))
    }

    async fn write_file(&self, file_path: &str, file_text: &str) -> FsResult<()> {
        self.write_file_sync(file_path, file_text)
    }

    fn write_file_sync(&self, file_path: &str, file_text: &str) -> FsResult<()> {
        let path = self.resolve(file_path);
        self.write()?.add_file(&path, file_text)
    }

    async fn mkdir(&self, dir_path: &str) -> FsResult<()> {
        self.mkdir_sync(dir_path)
    }

    fn mkdir_sync(&self, dir_path: &str) -> FsResult<()> {
        let dir = self.resolve(dir_path);
        let mut tree = self.write()?;
        if tree.files.contains_key(&dir) {
            return Err(FsError::AlreadyExists(dir));
        }
        tree.add_dir_all(&dir)
    }

    async fn move_path(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        self.move_path_sync(src_path, dest_path)
    }

    fn move_path_sync(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        let src = self.resolve(src_path);
        let dest = self.resolve(dest_path);
        if src == dest {
            return Ok(());
        }
        let mut tree = self.write()?;
        tree.copy_entry(&src, &dest)?;
        tree.remove_entry(&src)
    }

    async fn copy(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        self.copy_sync(src_path, dest_path)
    }

    fn copy_sync(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        let src = self.resolve(src_path);
        let dest = self.resolve(dest_path);
        if src == dest {
            return Ok(());
        }
        self.write()?.copy_entry(&src, &dest)
    }

    async fn file_exists(&self, file_path: &str) -> bool {
        self.file_exists_sync(file_path)
    }

    fn file_exists_sync(&self, file_path: &str) -> bool {
        let path = self.resolve(file_path);
        self.read().is_ok_and(|tree| tree.files.contains_key(&path))
    }

    async fn directory_exists(&self, dir_path: &str) -> bool {
        self.directory_exists_sync(dir_path)
    }

    fn directory_exists_sync(&self, dir_path: &str) -> bool {
        let dir = self.resolve(dir_path);
        self.read().is_ok_and(|tree| tree.dirs.contains(&dir))
    }

    fn realpath_sync(&self, path: &str) -> FsResult<String> {
        Ok(self.resolve(path))
    }

    fn get_current_directory(&self) -> String {
        self.cwd.clone()
    }

    async fn glob(&self, patterns: &[String]) -> FsResult<Vec<String>> {
        self.glob_sync(patterns)
    }

    fn glob_sync(&self, patterns: &[String]) -> FsResult<Vec<String>> {
        let (include, exclude) = split_patterns(patterns);
        let include: Vec<String> = include.into_iter().map(|p| self.resolve(p)).collect();
        let exclude: Vec<String> = exclude.into_iter().map(|p| self.resolve(p)).collect();

        Ok(self
            .read()?
            .files
            .keys()
            .filter(|f| include.iter().any(|p| glob_match(p, f)))
            .filter(|f| !exclude.iter().any(|p| glob_match(p, f)))
            .cloned()
            .collect())
    }
}
