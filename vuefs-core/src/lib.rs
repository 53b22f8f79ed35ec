//! Vue SFC filesystem host
//!
//! This crate lets a TypeScript project host read and write the script block
//! of a Vue single-file component as if it were a standalone file:
//! - `App.vue` appears as `App.vue.ts`
//! - Reads return the `<script setup>` or `<script>` content
//! - Writes splice new content back, preserving the rest of the component
//!
//! # Architecture
//!
//! The crate uses a layered design:
//! - `FileSystemHost` trait: blocking and async file operations
//! - `InMemoryFileSystemHost` / `RealFileSystemHost`: concrete hosts
//! - `sfc`: top-level block parser with byte offsets
//! - `VueFileSystemHost`: wraps any host and translates virtual paths
//!
//! ```
//! use vuefs_core::{FileSystemHost, InMemoryFileSystemHost, VueFileSystemHost};
//!
//! let base = InMemoryFileSystemHost::with_files([(
//!     "/App.vue",
//!     "<script setup>\nconst a = 1\n</script>\n<template><p/></template>\n",
//! )])?;
//! let host = VueFileSystemHost::new(&base);
//!
//! assert_eq!(host.read_file_sync("/App.vue.ts")?, "const a = 1\n");
//! host.write_file_sync("/App.vue.ts", "const a = 2\n")?;
//! assert_eq!(
//!     base.read_file_sync("/App.vue")?,
//!     "<script setup>\nconst a = 2\n</script>\n<template><p/></template>\n"
//! );
//! # Ok::<(), vuefs_core::FsError>(())
//! ```

pub mod error;
pub mod fs;
pub mod glob;
pub mod host;
pub mod path;
pub mod script;
pub mod sfc;

pub use error::{FsError, FsResult};
pub use fs::{FileSystemHost, InMemoryFileSystemHost, RealFileSystemHost, RuntimeDirEntry};
pub use host::{create_vue_file_system_host, VueFileSystemHost};
pub use path::{from_virtual_path, is_virtual_path, to_virtual_path, PathMapping};
pub use script::{extract_script, select_script, splice_script};
pub use sfc::{parse_sfc, BlockKind, SfcBlock, SfcDescriptor, SfcParseResult};
