//! Archive files
//!
//! A transferable archive written to disk behind a magic/version header,
//! either zstd-compressed bincode or JSON.

mod file;

pub use file::{
    decode_archive, encode_archive, read_archive, write_archive, ArchiveFormat, COMPRESSION_LEVEL,
};
