// JSON Resource Types
// Loaders that parse a JSON or JSON5 document before handing it on

use std::io::{BufRead, Read};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::loader::{FileType, TextAdapter, TextLoader};
use super::manager::ResourceManager;
use super::resource_type::Resource;

impl Resource for Value {
    fn dispose(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Loads a resource from a parsed JSON tree.
///
/// The same loader can sit behind [`JsonAdapter`] (strict JSON, files named
/// `*.json`) or [`Json5Adapter`] (JSON5, files named `*.json5`).
pub trait JsonLoader: 'static {
    type Resource: Resource;

    /// Extension override. `None` uses the adapter's default.
    fn extension(&self) -> Option<&str> {
        None
    }

    fn load(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
        tree: Value,
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

/// Parses a character stream as strict JSON for a [`JsonLoader`].
#[derive(Debug, Clone, Default)]
pub struct JsonAdapter<L> {
    loader: L,
}

impl<L> JsonAdapter<L> {
    pub const DEFAULT_EXTENSION: &'static str = "json";

    pub fn new(loader: L) -> Self {
        JsonAdapter { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: JsonLoader> TextLoader for JsonAdapter<L> {
    type Resource = L::Resource;

    fn extension(&self) -> &str {
        self.loader.extension().unwrap_or(Self::DEFAULT_EXTENSION)
    }

    fn load(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
        input: &mut dyn BufRead,
    ) -> anyhow::Result<Self::Resource> {
        let tree: Value = serde_json::from_reader(input)
            .with_context(|| format!("Malformed JSON in {}:{}", namespace, name))?;
        self.loader.load(manager, namespace, name, tree)
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

/// Parses a character stream as JSON5 for a [`JsonLoader`].
///
/// Accepts comments, unquoted keys, single-quoted strings and trailing commas.
#[derive(Debug, Clone, Default)]
pub struct Json5Adapter<L> {
    loader: L,
}

impl<L> Json5Adapter<L> {
    pub const DEFAULT_EXTENSION: &'static str = "json5";

    pub fn new(loader: L) -> Self {
        Json5Adapter { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: JsonLoader> TextLoader for Json5Adapter<L> {
    type Resource = L::Resource;

    fn extension(&self) -> &str {
        self.loader.extension().unwrap_or(Self::DEFAULT_EXTENSION)
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
        let tree: Value = json5::from_str(&text)
            .with_context(|| format!("Malformed JSON5 in {}:{}", namespace, name))?;
        self.loader.load(manager, namespace, name, tree)
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

/// Decodes a JSON tree into `R` with serde, falling back to a supplied value.
pub struct JsonCodec<R> {
    extension: Option<String>,
    fallback: Box<dyn Fn() -> Option<R>>,
}

impl<R: Resource + DeserializeOwned> JsonCodec<R> {
    /// A codec whose failed loads resolve to `fallback()`.
    pub fn create<F>(fallback: F) -> Self
    where
        F: Fn() -> R + 'static,
    {
        JsonCodec {
            extension: None,
            fallback: Box::new(move || Some(fallback())),
        }
    }

    /// A codec whose failed loads resolve to `None`.
    pub fn without_fallback() -> Self {
        JsonCodec {
            extension: None,
            fallback: Box::new(|| None),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }
}

impl<R: Resource + DeserializeOwned> JsonLoader for JsonCodec<R> {
    type Resource = R;

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    fn load(
        &self,
        _manager: &ResourceManager,
        namespace: &str,
        name: &str,
        tree: Value,
    ) -> anyhow::Result<R> {
        serde_json::from_value(tree)
            .with_context(|| format!("Failed to decode {}:{}", namespace, name))
    }

    fn create_fallback(&self, _manager: &ResourceManager, _namespace: &str, _name: &str) -> Option<R> {
        (self.fallback)()
    }

    fn type_name(&self) -> &str {
        std::any::type_name::<R>()
    }
}

pub type JsonType<L> = FileType<TextAdapter<JsonAdapter<L>>>;
pub type JsonCodecType<R> = JsonType<JsonCodec<R>>;
pub type Json5Type<L> = FileType<TextAdapter<Json5Adapter<L>>>;
pub type Json5CodecType<R> = Json5Type<JsonCodec<R>>;

impl<L: JsonLoader> FileType<TextAdapter<JsonAdapter<L>>> {
    /// Wrap a [`JsonLoader`] into a registrable strict JSON type.
    pub fn json(loader: L) -> Self {
        FileType::new(TextAdapter::new(JsonAdapter::new(loader)))
    }
}

impl<L: JsonLoader> FileType<TextAdapter<Json5Adapter<L>>> {
    /// Wrap a [`JsonLoader`] into a registrable JSON5 type.
    pub fn json5(loader: L) -> Self {
        FileType::new(TextAdapter::new(Json5Adapter::new(loader)))
    }
}
