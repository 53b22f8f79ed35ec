//! End-to-end tests for VueFileSystemHost over in-memory and on-disk hosts.

use vuefs_core::{
    FileSystemHost, FsError, InMemoryFileSystemHost, RealFileSystemHost, VueFileSystemHost,
};

const COMPONENT: &str = "\
<script setup>
const props = defineProps(['todo', 'index']);
</script>
<script>
export default { compatConfig: { MODE: 3 } }
</script>
<template><div /></template>
";

const UPDATED_SCRIPT: &str = "\
const props = defineProps(['todo', 'index', 'foobar']);
const emits = defineEmits(['update:todo']);
";

const UPDATED_COMPONENT: &str = "\
<script setup>
const props = defineProps(['todo', 'index', 'foobar']);
const emits = defineEmits(['update:todo']);
</script>
<script>
export default { compatConfig: { MODE: 3 } }
</script>
<template><div /></template>
";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn mock_host() -> InMemoryFileSystemHost {
    InMemoryFileSystemHost::with_files([("file.vue", COMPONENT)]).expect("seed file.vue")
}

#[test]
fn test_read_setup_script_sync() {
    init_tracing();
    let base = mock_host();
    let vue = VueFileSystemHost::new(&base);

    assert_eq!(
        vue.read_file_sync("file.vue.ts").unwrap(),
        "const props = defineProps(['todo', 'index']);\n"
    );
}

#[tokio::test]
async fn test_read_setup_script_async() {
    init_tracing();
    let base = mock_host();
    let vue = VueFileSystemHost::new(&base);

    assert_eq!(
        vue.read_file("file.vue.ts").await.unwrap(),
        "const props = defineProps(['todo', 'index']);\n"
    );
}

#[test]
fn test_write_setup_script_sync() {
    init_tracing();
    let base = mock_host();
    let vue = VueFileSystemHost::new(&base);

    vue.write_file_sync("file.vue.ts", UPDATED_SCRIPT).unwrap();
    assert_eq!(base.read_file_sync("file.vue").unwrap(), UPDATED_COMPONENT);
}

#[tokio::test]
async fn test_write_setup_script_async() {
    init_tracing();
    let base = mock_host();
    let vue = VueFileSystemHost::new(&base);

    vue.write_file("file.vue.ts", UPDATED_SCRIPT).await.unwrap();
    assert_eq!(base.read_file_sync("file.vue").unwrap(), UPDATED_COMPONENT);
}

#[test]
fn test_write_then_read_returns_written_text() {
    let base = mock_host();
    let vue = VueFileSystemHost::new(&base);

    for text in [UPDATED_SCRIPT, "no trailing newline", "\nleading blank line\n"] {
        vue.write_file_sync("file.vue.ts", text).unwrap();
        assert_eq!(vue.read_file_sync("file.vue.ts").unwrap(), text);
    }
}

#[test]
fn test_emptied_setup_falls_back_to_plain_script() {
    // A whitespace-only block is dropped by the parser, so the plain
    // `<script>` becomes the virtual file's backing block.
    let base = mock_host();
    let vue = VueFileSystemHost::new(&base);

    vue.write_file_sync("file.vue.ts", "").unwrap();
    assert_eq!(
        vue.read_file_sync("file.vue.ts").unwrap(),
        "export default { compatConfig: { MODE: 3 } }\n"
    );
}

#[test]
fn test_unmodified_write_back_is_byte_identical() {
    let base = mock_host();
    let vue = VueFileSystemHost::new(&base);

    let script = vue.read_file_sync("file.vue.ts").unwrap();
    vue.write_file_sync("file.vue.ts", &script).unwrap();
    assert_eq!(base.read_file_sync("file.vue").unwrap(), COMPONENT);
}

#[test]
fn test_missing_script_write_leaves_file_untouched() {
    let doc = "<template>\n  <div />\n</template>\n<style scoped>\ndiv { color: red; }\n</style>\n";
    let base = InMemoryFileSystemHost::with_files([("/Empty.vue", doc)]).unwrap();
    let vue = VueFileSystemHost::new(&base);

    assert_eq!(vue.read_file_sync("/Empty.vue.ts").unwrap(), "");
    assert!(matches!(
        vue.write_file_sync("/Empty.vue.ts", "export {}\n"),
        Err(FsError::MissingScriptBlock(_))
    ));
    assert_eq!(base.read_file_sync("/Empty.vue").unwrap(), doc);
}

#[test]
fn test_unclosed_setup_block_is_still_editable() {
    let base = InMemoryFileSystemHost::with_files([(
        "/Draft.vue",
        "<template><p/></template>\n<script setup>\nconst a = 1\n",
    )])
    .unwrap();
    let vue = VueFileSystemHost::new(&base);

    assert_eq!(vue.read_file_sync("/Draft.vue.ts").unwrap(), "const a = 1\n");
    vue.write_file_sync("/Draft.vue.ts", "const a = 2\n").unwrap();
    assert_eq!(
        base.read_file_sync("/Draft.vue").unwrap(),
        "<template><p/></template>\n<script setup>\nconst a = 2\n"
    );
}

#[test]
fn test_listing_shows_virtual_names() {
    let base = InMemoryFileSystemHost::with_files([("/dir/a.vue", COMPONENT), ("/dir/b.txt", "")])
        .unwrap();
    let vue = VueFileSystemHost::new(&base);

    let names: Vec<String> = vue
        .read_dir_sync("/dir")
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["/dir/a.vue.ts", "/dir/b.txt"]);

    // Every listed name can be read back through the adapter.
    for name in &names {
        assert!(vue.read_file_sync(name).is_ok());
    }
}

#[test]
fn test_adapter_over_disk() {
    init_tracing();
    let dir = tempfile::TempDir::new().unwrap();
    let disk = RealFileSystemHost::with_current_directory(dir.path());
    disk.write_file_sync("components/Todo.vue", COMPONENT).unwrap();

    let vue = VueFileSystemHost::new(&disk);
    assert!(vue.file_exists_sync("components/Todo.vue.ts"));
    assert_eq!(
        vue.read_file_sync("components/Todo.vue.ts").unwrap(),
        "const props = defineProps(['todo', 'index']);\n"
    );

    vue.write_file_sync("components/Todo.vue.ts", UPDATED_SCRIPT)
        .unwrap();
    let on_disk = std::fs::read_to_string(dir.path().join("components/Todo.vue")).unwrap();
    assert_eq!(on_disk, UPDATED_COMPONENT);
}

#[tokio::test]
async fn test_adapter_over_disk_async() {
    let dir = tempfile::TempDir::new().unwrap();
    let disk = RealFileSystemHost::with_current_directory(dir.path());
    disk.write_file("Todo.vue", COMPONENT).await.unwrap();

    let vue = VueFileSystemHost::new(&disk);
    vue.write_file("Todo.vue.ts", UPDATED_SCRIPT).await.unwrap();
    assert_eq!(vue.read_file("Todo.vue.ts").await.unwrap(), UPDATED_SCRIPT);
    assert_eq!(vue.read_file("Todo.vue").await.unwrap(), UPDATED_COMPONENT);

    vue.delete("Todo.vue.ts").await.unwrap();
    assert!(!dir.path().join("Todo.vue").exists());
}

#[test]
fn test_nested_adapters_share_one_document() {
    // Two adapters over the same host see each other's writes immediately.
    let base = mock_host();
    let a = VueFileSystemHost::new(&base);
    let b = VueFileSystemHost::new(&base);

    a.write_file_sync("file.vue.ts", UPDATED_SCRIPT).unwrap();
    assert_eq!(b.read_file_sync("file.vue.ts").unwrap(), UPDATED_SCRIPT);
}
