//! File-based loading strategies
//!
//! Most resource types load one file named after the resource. Rather than
//! implementing [`ResourceType`] directly, such types implement one of the
//! narrower loader traits and are wrapped in adapters:
//!
//! | Implement        | Receives                | Register as          |
//! |------------------|-------------------------|----------------------|
//! | [`FileLoader`]   | `&mut dyn Read`         | `FileType<L>`        |
//! | [`TextLoader`]   | `&mut dyn BufRead`      | `TextType<L>`        |
//! | [`StringLoader`] | the whole file as text  | `StringType<L>`      |
//!
//! Each adapter narrows its input and hands it to the layer above. None of
//! them catch errors; a failure anywhere ends up in the manager's fallback
//! path.
//!
//! # Example
//! ```ignore
//! struct Greeting;
//!
//! impl StringLoader for Greeting {
//!     type Resource = String;
//!     fn extension(&self) -> &str { "txt" }
//!     fn load(&self, _: &ResourceManager, _: &str, _: &str, text: String) -> anyhow::Result<String> {
//!         Ok(text)
//!     }
//!     fn create_fallback(&self, _: &ResourceManager, _: &str, _: &str) -> Option<String> {
//!         Some("FAILED".to_string())
//!     }
//! }
//!
//! let greeting = Rc::new(FileType::string(Greeting));
//! manager.register(&greeting, "content")?;
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use encoding_rs::{Encoding, UTF_8};

use super::manager::ResourceManager;
use super::resource_type::{Resource, ResourceType};

/// Resolve `directory/name.extension`.
pub fn locate_file(directory: &Path, name: &str, extension: &str) -> PathBuf {
    directory.join(format!("{}.{}", name, extension))
}

/// Loads a resource from the byte stream of a single file.
pub trait FileLoader: 'static {
    type Resource: Resource;

    /// Extension of resource files, without the dot.
    fn extension(&self) -> &str;

    /// Path of the file backing `name`. Override to change the naming scheme.
    fn locate(&self, directory: &Path, name: &str) -> PathBuf {
        locate_file(directory, name, self.extension())
    }

    fn load(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
        input: &mut dyn Read,
    ) -> anyhow::Result<Self::Resource>;

    fn create_fallback(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
    ) -> Option<Self::Resource>;

    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Adapts a [`FileLoader`] into a [`ResourceType`].
#[derive(Debug, Clone, Default)]
pub struct FileType<L> {
    loader: L,
}

impl<L> FileType<L> {
    pub fn new(loader: L) -> Self {
        FileType { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: FileLoader> ResourceType for FileType<L> {
    type Resource = L::Resource;

    fn load(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
        directory: &Path,
    ) -> anyhow::Result<Self::Resource> {
        let path = self.loader.locate(directory, name);
        let mut file =
            File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        self.loader.load(manager, namespace, name, &mut file)
    }

    fn create_fallback(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
    ) -> Option<Self::Resource> {
        self.loader.create_fallback(manager, namespace, name)
    }

    fn type_name(&self) -> &str {
        self.loader.type_name()
    }
}

/// Loads a resource from a decoded character stream.
pub trait TextLoader: 'static {
    type Resource: Resource;

    fn extension(&self) -> &str;

    /// Encoding of the file on disk. Anything `encoding_rs` knows is accepted.
    fn charset(&self) -> &'static Encoding {
        UTF_8
    }

    fn locate(&self, directory: &Path, name: &str) -> PathBuf {
        locate_file(directory, name, self.extension())
    }

    /// The stream yields UTF-8 regardless of [`charset`](TextLoader::charset).
    fn load(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
        input: &mut dyn BufRead,
    ) -> anyhow::Result<Self::Resource>;

    fn create_fallback(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
    ) -> Option<Self::Resource>;

    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Decodes a byte stream for a [`TextLoader`].
#[derive(Debug, Clone, Default)]
pub struct TextAdapter<L> {
    loader: L,
}

impl<L> TextAdapter<L> {
    pub fn new(loader: L) -> Self {
        TextAdapter { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: TextLoader> FileLoader for TextAdapter<L> {
    type Resource = L::Resource;

    fn extension(&self) -> &str {
        self.loader.extension()
    }

    fn locate(&self, directory: &Path, name: &str) -> PathBuf {
        self.loader.locate(directory, name)
    }

    fn load(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
        input: &mut dyn Read,
    ) -> anyhow::Result<Self::Resource> {
        let encoding = self.loader.charset();
        if encoding == UTF_8 {
            let mut reader = BufReader::new(input);
            return self.loader.load(manager, namespace, name, &mut reader);
        }

        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {}:{}", namespace, name))?;
        let text = encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .with_context(|| format!("Malformed {} text in {}:{}", encoding.name(), namespace, name))?;
        let mut reader = Cursor::new(text.as_bytes());
        self.loader.load(manager, namespace, name, &mut reader)
    }

    fn create_fallback(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
    ) -> Option<Self::Resource> {
        self.loader.create_fallback(manager, namespace, name)
    }

    fn type_name(&self) -> &str {
        self.loader.type_name()
    }
}

/// Loads a resource from the complete contents of a text file.
pub trait StringLoader: 'static {
    type Resource: Resource;

    fn extension(&self) -> &str;

    fn charset(&self) -> &'static Encoding {
        UTF_8
    }

    fn locate(&self, directory: &Path, name: &str) -> PathBuf {
        locate_file(directory, name, self.extension())
    }

    fn load(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
        text: String,
    ) -> anyhow::Result<Self::Resource>;

    fn create_fallback(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
    ) -> Option<Self::Resource>;

    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Drains a character stream into a `String` for a [`StringLoader`].
#[derive(Debug, Clone, Default)]
pub struct StringAdapter<L> {
    loader: L,
}

impl<L> StringAdapter<L> {
    pub fn new(loader: L) -> Self {
        StringAdapter { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: StringLoader> TextLoader for StringAdapter<L> {
    type Resource = L::Resource;

    fn extension(&self) -> &str {
        self.loader.extension()
    }

    fn charset(&self) -> &'static Encoding {
        self.loader.charset()
    }

    fn locate(&self, directory: &Path, name: &str) -> PathBuf {
        self.loader.locate(directory, name)
    }

    fn load(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
        input: &mut dyn BufRead,
    ) -> anyhow::Result<Self::Resource> {
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to read {}:{} as text", namespace, name))?;
        self.loader.load(manager, namespace, name, text)
    }

    fn create_fallback(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
    ) -> Option<Self::Resource> {
        self.loader.create_fallback(manager, namespace, name)
    }

    fn type_name(&self) -> &str {
        self.loader.type_name()
    }
}

pub type TextType<L> = FileType<TextAdapter<L>>;
pub type StringType<L> = FileType<TextAdapter<StringAdapter<L>>>;

impl<L: TextLoader> FileType<TextAdapter<L>> {
    /// Wrap a [`TextLoader`] into a registrable type.
    pub fn text(loader: L) -> Self {
        FileType::new(TextAdapter::new(loader))
    }
}

impl<L: StringLoader> FileType<TextAdapter<StringAdapter<L>>> {
    /// Wrap a [`StringLoader`] into a registrable type.
    pub fn string(loader: L) -> Self {
        FileType::new(TextAdapter::new(StringAdapter::new(loader)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Plain;

    impl StringLoader for Plain {
        type Resource = String;

        fn extension(&self) -> &str {
            "txt"
        }

        fn load(&self, _: &ResourceManager, _: &str, _: &str, text: String) -> anyhow::Result<String> {
            Ok(text)
        }

        fn create_fallback(&self, _: &ResourceManager, _: &str, _: &str) -> Option<String> {
            None
        }
    }

    /// Plain text stored in a legacy encoding.
    struct Legacy {
        encoding: &'static Encoding,
        extension: &'static str,
    }

    impl StringLoader for Legacy {
        type Resource = String;

        fn extension(&self) -> &str {
            self.extension
        }

        fn charset(&self) -> &'static Encoding {
            self.encoding
        }

        fn load(&self, _: &ResourceManager, _: &str, _: &str, text: String) -> anyhow::Result<String> {
            Ok(text)
        }

        fn create_fallback(&self, _: &ResourceManager, _: &str, _: &str) -> Option<String> {
            None
        }
    }

    /// Counts lines through the streaming layer.
    struct LineCount;

    #[derive(Debug)]
    struct Lines(usize);

    impl Resource for Lines {
        fn dispose(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    impl TextLoader for LineCount {
        type Resource = Lines;

        fn extension(&self) -> &str {
            "txt"
        }

        fn load(&self, _: &ResourceManager, _: &str, _: &str, input: &mut dyn BufRead) -> anyhow::Result<Lines> {
            let mut count = 0;
            for line in input.lines() {
                line?;
                count += 1;
            }
            Ok(Lines(count))
        }

        fn create_fallback(&self, _: &ResourceManager, _: &str, _: &str) -> Option<Lines> {
            Some(Lines(0))
        }
    }

    fn setup_test_env() -> (TempDir, ResourceManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("ns").join("content");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("hello.txt"), "Hello, World!").unwrap();
        fs::write(dir.join("three.txt"), "one\ntwo\nthree\n").unwrap();
        fs::write(dir.join("bad.txt"), vec![0xFF, 0xFE, 0x00, 0x01]).unwrap();
        fs::write(dir.join("cafe.lat"), vec![b'c', b'a', b'f', 0xE9]).unwrap();
        fs::write(dir.join("nihon.sjis"), vec![0x93, 0xFA, 0x96, 0x7B]).unwrap();
        fs::write(dir.join("torn.sjis"), vec![b'a', 0x93]).unwrap();

        let manager = ResourceManager::new(temp_dir.path(), "ns");
        (temp_dir, manager)
    }

    #[test]
    fn test_locate_file() {
        let path = locate_file(Path::new("root/ns/content"), "a", "txt");
        assert_eq!(path, Path::new("root/ns/content/a.txt"));
    }

    #[test]
    fn test_string_type_reads_whole_file() {
        let (temp_dir, manager) = setup_test_env();
        let dir = temp_dir.path().join("ns").join("content");

        let text = FileType::string(Plain)
            .load(&manager, "ns", "hello", &dir)
            .expect("Should load string");
        assert_eq!(text, "Hello, World!");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let (temp_dir, manager) = setup_test_env();
        let dir = temp_dir.path().join("ns").join("content");

        let err = FileType::string(Plain)
            .load(&manager, "ns", "missing", &dir)
            .unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let (temp_dir, manager) = setup_test_env();
        let dir = temp_dir.path().join("ns").join("content");

        let result = FileType::string(Plain).load(&manager, "ns", "bad", &dir);
        assert!(result.is_err());
    }

    #[test]
    fn test_latin1_decoding() {
        let (temp_dir, manager) = setup_test_env();
        let dir = temp_dir.path().join("ns").join("content");

        let legacy = Legacy {
            encoding: encoding_rs::WINDOWS_1252,
            extension: "lat",
        };
        let text = FileType::string(legacy)
            .load(&manager, "ns", "cafe", &dir)
            .expect("Should decode latin-1");
        assert_eq!(text, "caf\u{e9}");
    }

    #[test]
    fn test_multibyte_legacy_decoding() {
        let (temp_dir, manager) = setup_test_env();
        let dir = temp_dir.path().join("ns").join("content");
        let sjis = FileType::string(Legacy {
            encoding: encoding_rs::SHIFT_JIS,
            extension: "sjis",
        });

        let text = sjis.load(&manager, "ns", "nihon", &dir).expect("Should decode Shift_JIS");
        assert_eq!(text, "\u{65e5}\u{672c}");

        let err = sjis.load(&manager, "ns", "torn", &dir).unwrap_err();
        assert!(err.to_string().contains("Shift_JIS"));
    }

    #[test]
    fn test_text_type_streams_lines() {
        let (temp_dir, manager) = setup_test_env();
        let dir = temp_dir.path().join("ns").join("content");

        let lines = FileType::text(LineCount)
            .load(&manager, "ns", "three", &dir)
            .expect("Should count lines");
        assert_eq!(lines.0, 3);
    }

    #[test]
    fn test_fallback_passes_through_layers() {
        let (_temp_dir, manager) = setup_test_env();

        let text_type = FileType::text(LineCount);
        assert_eq!(text_type.create_fallback(&manager, "ns", "x").map(|l| l.0), Some(0));
        assert!(FileType::string(Plain).create_fallback(&manager, "ns", "x").is_none());
    }

    #[test]
    fn test_type_name_is_innermost_loader() {
        assert!(FileType::string(Plain).type_name().ends_with("Plain"));
    }
}
