//! Single-file archive storage
//!
//! File format:
//! ```text
//! [HEADER: 16 bytes]
//!   - magic: 8 bytes ("CHAMPARC")
//!   - version: 4 bytes (u32 LE)
//!   - encoding: 1 byte (0 = zstd-compressed bincode, 1 = JSON)
//!   - reserved: 3 bytes
//!
//! [BODY: variable]
//!   - the transferable archive in the header's encoding
//! ```

use crate::archive::TransferableArchive;
use crate::{Error, Result, MAGIC, VERSION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADER_SIZE: usize = 16;

/// zstd level for binary archive bodies
pub const COMPRESSION_LEVEL: i32 = 3;

/// Encoding of an archive file body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// bincode, compressed with zstd
    #[default]
    Binary,
    /// Plain JSON, readable and diffable
    Json,
}

impl ArchiveFormat {
    pub fn as_byte(&self) -> u8 {
        match self {
            ArchiveFormat::Binary => 0,
            ArchiveFormat::Json => 1,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(ArchiveFormat::Binary),
            1 => Some(ArchiveFormat::Json),
            _ => None,
        }
    }
}

/// Encode an archive with its file header
pub fn encode_archive<T: Serialize>(
    archive: &TransferableArchive<T>,
    format: ArchiveFormat,
) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(HEADER_SIZE);
    output.extend_from_slice(MAGIC);
    output.extend_from_slice(&VERSION.to_le_bytes());
    output.push(format.as_byte());
    output.extend_from_slice(&[0u8; 3]);

    match format {
        ArchiveFormat::Binary => {
            let payload = bincode::serialize(archive)?;
            output.extend(zstd::encode_all(payload.as_slice(), COMPRESSION_LEVEL)?);
        }
        ArchiveFormat::Json => serde_json::to_writer(&mut output, archive)?,
    }
    Ok(output)
}

/// Decode an archive file, returning the archive and the encoding it used
pub fn decode_archive<T: DeserializeOwned>(
    data: &[u8],
) -> Result<(TransferableArchive<T>, ArchiveFormat)> {
    if data.len() < HEADER_SIZE {
        return Err(Error::InvalidFile("File shorter than header".into()));
    }
    let (header, body) = data.split_at(HEADER_SIZE);

    if &header[0..8] != MAGIC {
        return Err(Error::InvalidFile("Invalid magic bytes".into()));
    }

    let version = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
    if version != VERSION {
        return Err(Error::VersionMismatch {
            expected: VERSION,
            found: version,
        });
    }

    let format = ArchiveFormat::from_byte(header[12])
        .ok_or_else(|| Error::InvalidFile(format!("Unknown encoding: {}", header[12])))?;

    let archive: TransferableArchive<T> = match format {
        ArchiveFormat::Binary => bincode::deserialize(&zstd::decode_all(body)?)?,
        ArchiveFormat::Json => serde_json::from_slice(body)?,
    };
    if archive.version != VERSION {
        return Err(Error::VersionMismatch {
            expected: VERSION,
            found: archive.version,
        });
    }
    Ok((archive, format))
}

/// Write `archive` to `path`, replacing any existing file
pub fn write_archive<T: Serialize>(
    path: impl AsRef<Path>,
    archive: &TransferableArchive<T>,
    format: ArchiveFormat,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_archive(archive, format)?;

    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;

    log::debug!(
        "wrote {} nodes, {} roots to {} ({} bytes, {:?})",
        archive.nodes.len(),
        archive.roots.len(),
        path.display(),
        bytes.len(),
        format
    );
    Ok(())
}

/// Read an archive file; the encoding is taken from its header
pub fn read_archive<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<TransferableArchive<T>> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let (archive, format) = decode_archive(&data)?;
    log::debug!(
        "read {} nodes, {} roots from {} ({:?})",
        archive.nodes.len(),
        archive.roots.len(),
        path.display(),
        format
    );
    Ok(archive)
}
