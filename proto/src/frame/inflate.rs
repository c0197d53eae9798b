use crate::error::{Error, Result};

/// Inflate a zlib stream.
pub fn zlib(buf: &[u8]) -> Result<Vec<u8>> {
    miniz_oxide::inflate::decompress_to_vec_zlib(buf).map_err(|_| Error::Inflate)
}

/// Inflate a brotli stream.
pub fn brotli(buf: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    ::brotli::BrotliDecompress(&mut &buf[..], &mut out).map_err(|_| Error::Inflate)?;

    Ok(out)
}
