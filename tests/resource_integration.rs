//! End-to-end tests of the resource manager against real directory trees.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rms::resource::{
    locate_root, FileType, JsonCodec, Resource, ResourceLogger, ResourceManager, StringLoader,
};
use rms::{Handle, ManagerConfig};
use serde::Deserialize;
use tempfile::TempDir;

struct Text;

impl StringLoader for Text {
    type Resource = String;

    fn extension(&self) -> &str {
        "txt"
    }

    fn load(&self, _: &ResourceManager, _: &str, _: &str, text: String) -> anyhow::Result<String> {
        Ok(text)
    }

    fn create_fallback(&self, _: &ResourceManager, _: &str, _: &str) -> Option<String> {
        Some("FAILED".to_string())
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Palette {
    name: String,
    colors: Vec<[u8; 3]>,
}

impl Resource for Palette {
    fn dispose(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct Warnings {
    failures: RefCell<Vec<(String, PathBuf)>>,
}

impl ResourceLogger for Warnings {
    fn warn_exception(
        &self,
        _type_name: &str,
        path: &Path,
        _directory: &str,
        namespace: &str,
        name: &str,
        _error: &anyhow::Error,
    ) {
        self.failures
            .borrow_mut()
            .push((format!("{}:{}", namespace, name), path.to_path_buf()));
    }

    fn log_dispose(&self) {}

    fn warn_dispose_exception(&self, _: &str, _: &str, _: &str, _: &dyn Resource, _: &anyhow::Error) {}
}

fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn setup_manager(root: &Path) -> (ResourceManager, Rc<Warnings>) {
    let manager = ResourceManager::new(root, "std");
    let warnings = Rc::new(Warnings::default());
    let sink: Rc<dyn ResourceLogger> = warnings.clone();
    manager.set_logger(Some(sink));
    (manager, warnings)
}

#[test]
fn load_fallback_and_reload_from_new_root() {
    let first = TempDir::new().expect("Failed to create temp dir");
    let second = TempDir::new().expect("Failed to create temp dir");
    write_file(first.path(), "std/content/a.txt", "hello");
    write_file(second.path(), "std/content/a.txt", "world");

    let (manager, warnings) = setup_manager(first.path());
    let text = Rc::new(FileType::string(Text));
    manager.register(&text, "content").unwrap();

    let a: Handle<_> = manager.handle(&text, None, "a").unwrap();
    assert_eq!(*manager.get(&text, None, "a").unwrap().unwrap(), "hello");
    assert_eq!(*a.get().unwrap(), "hello");

    assert_eq!(*manager.get(&text, None, "b").unwrap().unwrap(), "FAILED");
    assert_eq!(*manager.get(&text, None, "b").unwrap().unwrap(), "FAILED");
    assert_eq!(
        *warnings.failures.borrow(),
        vec![("std:b".to_string(), first.path().join("std").join("content"))]
    );

    manager.dispose_with_root(second.path()).unwrap();
    assert_eq!(*a.get().unwrap(), "world");
    assert_eq!(*manager.get(&text, None, "a").unwrap().unwrap(), "world");
}

#[test]
fn namespaces_are_separate_directories() {
    let root = TempDir::new().expect("Failed to create temp dir");
    write_file(root.path(), "std/content/a.txt", "base");
    write_file(root.path(), "addon/content/a.txt", "override");

    let (manager, warnings) = setup_manager(root.path());
    let text = Rc::new(FileType::string(Text));
    manager.register(&text, "content").unwrap();

    assert_eq!(*manager.get(&text, None, "a").unwrap().unwrap(), "base");
    assert_eq!(*manager.get(&text, Some("addon"), "a").unwrap().unwrap(), "override");
    assert!(warnings.failures.borrow().is_empty());
}

#[test]
fn json_codec_decodes_and_falls_back() {
    let root = TempDir::new().expect("Failed to create temp dir");
    write_file(
        root.path(),
        "std/palettes/warm.json",
        r#"{ "name": "warm", "colors": [[255, 128, 0], [200, 40, 40]] }"#,
    );
    write_file(root.path(), "std/palettes/broken.json", r#"{ "name": 3 }"#);

    let (manager, warnings) = setup_manager(root.path());
    let palettes = Rc::new(FileType::json(JsonCodec::create(|| Palette {
        name: "default".to_string(),
        colors: Vec::new(),
    })));
    manager.register(&palettes, "palettes").unwrap();

    let warm = manager.get(&palettes, None, "warm").unwrap().unwrap();
    assert_eq!(warm.name, "warm");
    assert_eq!(warm.colors, vec![[255, 128, 0], [200, 40, 40]]);

    let broken = manager.get(&palettes, None, "broken").unwrap().unwrap();
    assert_eq!(broken.name, "default");
    let missing = manager.get(&palettes, None, "missing").unwrap().unwrap();
    assert_eq!(missing.name, "default");
    assert_eq!(warnings.failures.borrow().len(), 2);
}

#[test]
fn text_and_json_types_share_a_manager() {
    let root = TempDir::new().expect("Failed to create temp dir");
    write_file(root.path(), "std/content/title.txt", "Palette viewer");
    write_file(root.path(), "std/palettes/mono.json", r#"{ "name": "mono", "colors": [] }"#);

    let (manager, _warnings) = setup_manager(root.path());
    let text = Rc::new(FileType::string(Text));
    let palettes = Rc::new(FileType::json(JsonCodec::<Palette>::without_fallback()));
    manager.register(&text, "content").unwrap();
    manager.register(&palettes, "palettes").unwrap();

    assert_eq!(*manager.get(&text, None, "title").unwrap().unwrap(), "Palette viewer");
    assert_eq!(manager.get(&palettes, None, "mono").unwrap().unwrap().name, "mono");
    assert!(manager.get(&palettes, None, "title").unwrap().is_none());

    manager.dispose();
    assert_eq!(manager.cached_count(&text).unwrap(), 0);
    assert_eq!(manager.cached_count(&palettes).unwrap(), 0);
}

#[test]
fn config_file_and_marker_locate_the_root() {
    let project = TempDir::new().expect("Failed to create temp dir");
    write_file(project.path(), "assets/.rmsroot", "");
    write_file(project.path(), "assets/std/content/a.txt", "found");
    let nested = project.path().join("src").join("deep");
    fs::create_dir_all(&nested).unwrap();

    let root = locate_root(&nested, "assets/.rmsroot").unwrap();
    assert_eq!(root, project.path().join("assets"));
    assert_eq!(locate_root(&nested, "assets/.missing"), None);

    write_file(project.path(), "rms.cfg", "# project settings\nroot = assets\nlogger = silent\n");
    let config = ManagerConfig::from_propfile(project.path().join("rms.cfg")).unwrap();
    assert_eq!(config.root, root);

    let manager = ResourceManager::from_config(&config);
    let text = Rc::new(FileType::string(Text));
    manager.register(&text, "content").unwrap();
    assert_eq!(*manager.get(&text, None, "a").unwrap().unwrap(), "found");
}
