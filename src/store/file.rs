//! Snapshot File Format
//!
//! Both stores persist their whole key space as one snapshot file.
//!
//! ```text
//! ┌──────────┬────────────┬────────────┬──────────┬─────────────────────┐
//! │Magic (4) │Version (2) │ Length (4) │ CRC (4)  │ bincode(PrefMap)    │
//! └──────────┴────────────┴────────────┴──────────┴─────────────────────┘
//! ```
//!
//! All integers little-endian. Files are written to a temporary sibling and
//! renamed into place, so a reader sees either the old or the new snapshot.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{PrefError, Result};

use super::PrefMap;

/// File magic
pub const MAGIC: &[u8; 4] = b"PRFS";

/// Current format version
pub const VERSION: u16 = 1;

/// Magic + version + length + crc
pub const HEADER_SIZE: usize = 14;

/// Serialize a snapshot, header included
pub fn encode_snapshot(map: &PrefMap) -> Result<Bytes> {
    let payload = bincode::serialize(map)?;
    let payload_len = u32::try_from(payload.len())
        .map_err(|_| PrefError::Serialization(format!("Snapshot too large: {} bytes", payload.len())))?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_slice(MAGIC);
    buf.put_u16_le(VERSION);
    buf.put_u32_le(payload_len);
    buf.put_u32_le(crc32fast::hash(&payload));
    buf.put_slice(&payload);

    Ok(buf.freeze())
}

/// Parse and verify a snapshot
pub fn decode_snapshot(bytes: &[u8]) -> Result<PrefMap> {
    if bytes.len() < HEADER_SIZE {
        return Err(PrefError::Corruption(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let (mut header, payload) = bytes.split_at(HEADER_SIZE);

    let mut magic = [0u8; 4];
    header.copy_to_slice(&mut magic);
    if &magic != MAGIC {
        return Err(PrefError::Corruption("Bad magic".to_string()));
    }

    let version = header.get_u16_le();
    if version != VERSION {
        return Err(PrefError::Corruption(format!(
            "Unsupported snapshot version {}",
            version
        )));
    }

    let payload_len = header.get_u32_le() as usize;
    let expected_crc = header.get_u32_le();

    if payload.len() != payload_len {
        return Err(PrefError::Corruption(format!(
            "Payload length mismatch: header says {}, file has {}",
            payload_len,
            payload.len()
        )));
    }

    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(PrefError::Corruption(format!(
            "CRC mismatch: expected {:08x}, got {:08x}",
            expected_crc, actual_crc
        )));
    }

    Ok(bincode::deserialize(payload)?)
}

/// Read the snapshot at `path`, `None` if the file does not exist
pub fn read_snapshot(path: &Path) -> Result<Option<PrefMap>> {
    match fs::read(path) {
        Ok(bytes) => decode_snapshot(&bytes).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Atomically replace the snapshot at `path`
pub fn write_snapshot(path: &Path, map: &PrefMap, sync: bool) -> Result<()> {
    let bytes = encode_snapshot(map)?;
    let tmp_path = temp_path(path);

    let written = File::create(&tmp_path).and_then(|mut file| {
        file.write_all(&bytes)?;
        if sync {
            file.sync_all()?;
        }
        Ok(())
    });

    if let Err(e) = written.and_then(|()| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// "{name}.prefs" → "{name}.prefs.tmp"
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
