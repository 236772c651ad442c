use crate::error::DecodeError;
use bytes::Bytes;
use flate2::read::{GzDecoder, ZlibDecoder};
use std::io::Read;

/// Decodes a captured response body according to its declared
/// `Content-Encoding`. Not streaming: the whole body has already been
/// captured by the time this runs, so there is nothing to gain from
/// incremental decompression.
///
/// `flate2`'s readers grow their output buffer geometrically internally
/// (via `Read::read_to_end`), which sidesteps the classic bug of
/// recomputing a realloc'd output pointer from a stale `avail_out`.
pub fn decode(data: &[u8], encoding: &str) -> Result<Bytes, DecodeError> {
    let mut out = Vec::with_capacity(data.len() * 2);
    match encoding.to_lowercase().as_str() {
        "gzip" => {
            GzDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(DecodeError::Inflate)?;
        }
        "deflate" => {
            ZlibDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(DecodeError::Inflate)?;
        }
        other => return Err(DecodeError::UnsupportedEncoding(other.to_string())),
    }
    Ok(Bytes::from(out))
}
