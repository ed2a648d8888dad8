// Resource Module
// Typed resource loading, caching and reloadable handles

pub mod error;
pub mod handle;
pub mod json;
pub mod loader;
pub mod locate;
pub mod logger;
pub mod manager;
mod resource_set;
pub mod resource_type;


pub use encoding_rs::Encoding;
pub use error::ResourceError;
pub use handle::Handle;
pub use json::{
    Json5Adapter, Json5CodecType, Json5Type, JsonAdapter, JsonCodec, JsonCodecType, JsonLoader,
    JsonType,
};
pub use loader::{
    FileLoader, FileType, StringAdapter, StringLoader, StringType, TextAdapter, TextLoader,
    TextType,
};
pub use locate::{locate_root, locate_root_from_cwd};
pub use logger::{ConsoleLogger, ResourceLogger, SilentLogger};
pub use manager::ResourceManager;
pub use resource_type::{Resource, ResourceType};
