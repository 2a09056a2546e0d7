//! ARF container handling.
//!
//! ARF bundles conventionally arrive bzip2-compressed (`arf.xml.bz2`),
//! occasionally gzipped, sometimes plain XML. Codec work is delegated to
//! the external decoder crates; this module only sniffs magic bytes.

use std::io::Read;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;

use crate::{ParseError, ParseResult};

const BZIP2_MAGIC: &[u8] = b"BZh";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Decompress the archive payload into raw XML bytes. Uncompressed input
/// passes through untouched.
pub fn decompress(data: &[u8]) -> ParseResult<Vec<u8>> {
    if data.starts_with(BZIP2_MAGIC) {
        let mut decoder = BzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| ParseError::Decompression(format!("bzip2: {}", e)))?;
        Ok(out)
    } else if data.starts_with(GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| ParseError::Decompression(format!("gzip: {}", e)))?;
        Ok(out)
    } else {
        Ok(data.to_vec())
    }
}
