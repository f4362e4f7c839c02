//! Native binary form of [`FlatL2Index`].
//!
//! Layout (little-endian):
//!
//! ```text
//! magic   [u8; 4]  "RDBV"
//! version u32      1
//! dim     u32      0 when no vector was ever added
//! count   u64
//! data    [f32; dim * count]
//! ```

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::flat::FlatL2Index;

pub const MAGIC: &[u8; 4] = b"RDBV";
pub const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("not a vector index (bad magic {0:?})")]
    BadMagic([u8; 4]),
    #[error("unsupported vector index format version {0}")]
    UnsupportedVersion(u32),
    #[error("vector payload length mismatch: header declares {expected} bytes, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("header declares {0} vectors of dimension 0")]
    ZeroDimension(usize),
    #[error("vector index truncated: {0}")]
    Io(#[from] io::Error),
}

impl FlatL2Index {
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        w.write_all(MAGIC)?;
        w.write_u32::<LittleEndian>(FORMAT_VERSION)?;
        w.write_u32::<LittleEndian>(self.dim().unwrap_or(0) as u32)?;
        w.write_u64::<LittleEndian>(self.count() as u64)?;
        for value in self.raw() {
            w.write_f32::<LittleEndian>(*value)?;
        }
        w.flush()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.raw().len() * 4);
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = bytes;
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(CodecError::BadMagic(magic));
        }
        let version = r.read_u32::<LittleEndian>()?;
        if version != FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let dim = r.read_u32::<LittleEndian>()? as usize;
        let count = r.read_u64::<LittleEndian>()? as usize;
        if dim == 0 && count > 0 {
            return Err(CodecError::ZeroDimension(count));
        }

        let expected = dim.saturating_mul(count).saturating_mul(4);
        if r.len() != expected {
            return Err(CodecError::LengthMismatch { expected, found: r.len() });
        }
        let mut data = vec![0f32; dim * count];
        r.read_f32_into::<LittleEndian>(&mut data)?;
        let dim = if dim == 0 { None } else { Some(dim) };
        Ok(FlatL2Index::from_parts(dim, data))
    }
}
