//! Binary persistence of the built index.

mod codec;
pub mod index_file;
pub mod storage;

pub use index_file::{deserialize, serialize, DecodedIndex, FORMAT_VERSION, MAGIC};
pub use storage::{BlobStorage, FileStorage};
