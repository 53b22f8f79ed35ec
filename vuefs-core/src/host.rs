//! Filesystem host that exposes Vue script blocks as TypeScript files.

use async_trait::async_trait;

use crate::error::{FsError, FsResult};
use crate::fs::{FileSystemHost, RealFileSystemHost, RuntimeDirEntry};
use crate::path::PathMapping;
use crate::script::{extract_script, splice_script};

/// Wraps another [`FileSystemHost`] and maps `*.vue.ts` onto the script
/// block of the matching `*.vue` file.
///
/// - Reads of `App.vue.ts` return the `<script setup>` (or `<script>`)
///   content of `App.vue`, or an empty string if there is none
/// - Writes to `App.vue.ts` splice the new text into `App.vue`, leaving the
///   template, styles and any other script block unchanged
/// - Directory listings show `App.vue` as `App.vue.ts`
/// - Everything else is forwarded unchanged
///
/// Nothing is cached; every read and write reparses the current document.
pub struct VueFileSystemHost<'a> {
    inner: Inner<'a>,
    mapping: PathMapping,
}

enum Inner<'a> {
    Borrowed(&'a dyn FileSystemHost),
    Owned(Box<dyn FileSystemHost + 'a>),
}

/// Adapter over the real disk, rooted at the process working directory.
pub fn create_vue_file_system_host() -> FsResult<VueFileSystemHost<'static>> {
    Ok(VueFileSystemHost::owned(RealFileSystemHost::new()?))
}

impl<'a> VueFileSystemHost<'a> {
    pub fn new(inner: &'a dyn FileSystemHost) -> Self {
        Self::with_mapping(inner, PathMapping::default())
    }

    pub fn with_mapping(inner: &'a dyn FileSystemHost, mapping: PathMapping) -> Self {
        Self {
            inner: Inner::Borrowed(inner),
            mapping,
        }
    }

    /// Adapter that owns its underlying host.
    pub fn owned(inner: impl FileSystemHost + 'a) -> Self {
        Self {
            inner: Inner::Owned(Box::new(inner)),
            mapping: PathMapping::default(),
        }
    }

    /// The wrapped host.
    pub fn inner(&self) -> &dyn FileSystemHost {
        match &self.inner {
            Inner::Borrowed(host) => *host,
            Inner::Owned(host) => host.as_ref(),
        }
    }

    pub fn mapping(&self) -> &PathMapping {
        &self.mapping
    }

    fn real_path(&self, path: &str) -> String {
        self.mapping.from_virtual(path)
    }

    fn script_of(&self, real_path: &str, document: &str) -> String {
        match extract_script(document) {
            Some(script) => {
                tracing::debug!(path = %real_path, len = script.len(), "read script block");
                script
            }
            None => {
                tracing::debug!(path = %real_path, "no script block, reading as empty");
                String::new()
            }
        }
    }

    fn spliced(&self, real_path: &str, document: &str, script: &str) -> FsResult<String> {
        match splice_script(document, script) {
            Some(text) => {
                tracing::debug!(path = %real_path, len = script.len(), "splicing script block");
                Ok(text)
            }
            None => {
                tracing::warn!(path = %real_path, "refusing write: no script block");
                Err(FsError::MissingScriptBlock(real_path.to_string()))
            }
        }
    }

    fn virtual_patterns(&self, patterns: &[String]) -> Vec<String> {
        // Best effort: `*.vue` becomes `*.vue.ts`, but a bare `*` that also
        // matches components is passed through as-is.
        patterns.iter().map(|p| self.mapping.to_virtual(p)).collect()
    }
}

#[async_trait]
impl<'a> FileSystemHost for VueFileSystemHost<'a> {
    fn is_case_sensitive(&self) -> bool {
        self.inner().is_case_sensitive()
    }

    async fn delete(&self, path: &str) -> FsResult<()> {
        self.inner().delete(&self.real_path(path)).await
    }

    fn delete_sync(&self, path: &str) -> FsResult<()> {
        self.inner().delete_sync(&self.real_path(path))
    }

    fn read_dir_sync(&self, dir_path: &str) -> FsResult<Vec<RuntimeDirEntry>> {
        let entries = self.inner().read_dir_sync(dir_path)?;
        Ok(entries
            .into_iter()
            .map(|entry| RuntimeDirEntry {
                name: self.mapping.to_virtual(&entry.name),
                ..entry
            })
            .collect())
    }

    async fn read_file(&self, file_path: &str) -> FsResult<String> {
        if !self.mapping.is_virtual(file_path) {
            tracing::trace!(path = %file_path, "pass-through read");
            return self.inner().read_file(file_path).await;
        }

        let real = self.real_path(file_path);
        let document = self.inner().read_file(&real).await?;
        Ok(self.script_of(&real, &document))
    }

    fn read_file_sync(&self, file_path: &str) -> FsResult<String> {
        if !self.mapping.is_virtual(file_path) {
            tracing::trace!(path = %file_path, "pass-through read");
            return self.inner().read_file_sync(file_path);
        }

        let real = self.real_path(file_path);
        let document = self.inner().read_file_sync(&real)?;
        Ok(self.script_of(&real, &document))
    }

    async fn write_file(&self, file_path: &str, file_text: &str) -> FsResult<()> {
        if !self.mapping.is_virtual(file_path) {
            tracing::trace!(path = %file_path, "pass-through write");
            return self.inner().write_file(file_path, file_text).await;
        }

        let real = self.real_path(file_path);
        let document = self.inner().read_file(&real).await?;
        let text = self.spliced(&real, &document, file_text)?;
        self.inner().write_file(&real, &text).await
    }

    fn write_file_sync(&self, file_path: &str, file_text: &str) -> FsResult<()> {
        if !self.mapping.is_virtual(file_path) {
            tracing::trace!(path = %file_path, "pass-through write");
            return self.inner().write_file_sync(file_path, file_text);
        }

        let real = self.real_path(file_path);
        let document = self.inner().read_file_sync(&real)?;
        let text = self.spliced(&real, &document, file_text)?;
        self.inner().write_file_sync(&real, &text)
    }

    async fn mkdir(&self, dir_path: &str) -> FsResult<()> {
        self.inner().mkdir(dir_path).await
    }

    fn mkdir_sync(&self, dir_path: &str) -> FsResult<()> {
        self.inner().mkdir_sync(dir_path)
    }

    async fn move_path(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        self.inner()
            .move_path(&self.real_path(src_path), &self.real_path(dest_path))
            .await
    }

    fn move_path_sync(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        self.inner()
            .move_path_sync(&self.real_path(src_path), &self.real_path(dest_path))
    }

    async fn copy(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        self.inner()
            .copy(&self.real_path(src_path), &self.real_path(dest_path))
            .await
    }

    fn copy_sync(&self, src_path: &str, dest_path: &str) -> FsResult<()> {
        self.inner()
            .copy_sync(&self.real_path(src_path), &self.real_path(dest_path))
    }

    async fn file_exists(&self, file_path: &str) -> bool {
        self.inner().file_exists(&self.real_path(file_path)).await
    }

    fn file_exists_sync(&self, file_path: &str) -> bool {
        self.inner().file_exists_sync(&self.real_path(file_path))
    }

    async fn directory_exists(&self, dir_path: &str) -> bool {
        self.inner().directory_exists(&self.real_path(dir_path)).await
    }

    fn directory_exists_sync(&self, dir_path: &str) -> bool {
        self.inner().directory_exists_sync(&self.real_path(dir_path))
    }

    fn realpath_sync(&self, path: &str) -> FsResult<String> {
        self.inner().realpath_sync(&self.real_path(path))
    }

    fn get_current_directory(&self) -> String {
        self.inner().get_current_directory()
    }

    async fn glob(&self, patterns: &[String]) -> FsResult<Vec<String>> {
        self.inner().glob(&self.virtual_patterns(patterns)).await
    }

    fn glob_sync(&self, patterns: &[String]) -> FsResult<Vec<String>> {
        self.inner().glob_sync(&self.virtual_patterns(patterns))
    }
}
