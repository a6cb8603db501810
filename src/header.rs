//! Record header decoding.
use crate::error::Result;
use crate::layout::{header as h, Fields};
use crate::record::{DataType, Header};

/// Decode the 20-byte header at the start of `buf`.
///
/// Unknown type tags are kept as [`DataType::Unknown`]. The timestamp is
/// returned verbatim, null padding included.
pub fn decode_header(buf: &[u8]) -> Result<Header> {
    let f = Fields::new(buf, h::LEN, "header")?;
    Ok(Header {
        data_type: DataType::from_tag(f.u32(h::DATA_TYPE)),
        payload_size: f.u16(h::PAYLOAD_SIZE),
        magic: f.u16(h::MAGIC),
        timestamp: f.raw_text(h::TIMESTAMP, h::TIMESTAMP_LEN, "header.timestamp")?,
    })
}
