//! Byte layouts of every fixed-width block in a `.dat` capture.
//!
//! Offsets are written out by hand. The producer's struct packing leaves
//! padding in places that cannot be derived from field sizes (the entrust body
//! is 38 bytes of fields spread over 48), so nothing here may be computed from
//! `size_of` of a Rust type.
use crate::error::{DecodeError, Result};

/// Record header.
pub mod header {
    pub const LEN: usize = 20;
    pub const DATA_TYPE: usize = 0;
    pub const PAYLOAD_SIZE: usize = 4;
    pub const MAGIC: usize = 6;
    pub const TIMESTAMP: usize = 8;
    pub const TIMESTAMP_LEN: usize = 12;
}

/// Envelope in front of every tick body.
pub mod tick {
    pub const LEN: usize = 48;
    pub const EXCHANGE_ID: usize = 0;
    pub const TICKER: usize = 4;
    pub const TICKER_LEN: usize = 16;
    // 20..24 padding
    pub const SEQ: usize = 24;
    pub const DATA_TIME: usize = 32;
    pub const TICK_TYPE: usize = 40;
    // 44..48 padding
}

/// Order entry body; 38 bytes of fields in a 48-byte slot.
pub mod entrust {
    pub const LEN: usize = 48;
    pub const CHANNEL_NO: usize = 0;
    // 4..8 padding
    pub const SEQ: usize = 8;
    pub const PRICE: usize = 16;
    pub const QTY: usize = 24;
    pub const SIDE: usize = 32;
    pub const ORD_TYPE: usize = 33;
    // 34..40 padding
    pub const ORDER_NO: usize = 40;
}

/// Trade body, packed without padding.
pub mod transaction {
    pub const LEN: usize = 53;
    pub const CHANNEL_NO: usize = 0;
    pub const SEQ: usize = 4;
    pub const PRICE: usize = 12;
    pub const QTY: usize = 20;
    pub const MONEY: usize = 28;
    pub const BID_NO: usize = 36;
    pub const ASK_NO: usize = 44;
    pub const TRADE_FLAG: usize = 52;
}

/// Quote block at the start of a snapshot payload.
pub mod market_data {
    pub const LEN: usize = 504;
    pub const EXCHANGE_ID: usize = 0;
    pub const TICKER: usize = 4;
    pub const TICKER_LEN: usize = 16;
    // 20..24 padding
    pub const LAST_PRICE: usize = 24;
    pub const PRE_CLOSE_PRICE: usize = 32;
    pub const OPEN_PRICE: usize = 40;
    pub const HIGH_PRICE: usize = 48;
    pub const LOW_PRICE: usize = 56;
    pub const CLOSE_PRICE: usize = 64;
    pub const PRE_TOTAL_LONG_POSITION: usize = 72;
    pub const TOTAL_LONG_POSITION: usize = 80;
    pub const PRE_SETTL_PRICE: usize = 88;
    pub const SETTL_PRICE: usize = 96;
    pub const UPPER_LIMIT_PRICE: usize = 104;
    pub const LOWER_LIMIT_PRICE: usize = 112;
    pub const PRE_DELTA: usize = 120;
    pub const CURR_DELTA: usize = 128;
    pub const DATA_TIME: usize = 136;
    pub const QTY: usize = 144;
    pub const TURNOVER: usize = 152;
    pub const AVG_PRICE: usize = 160;
    pub const BID: usize = 168;
    pub const ASK: usize = 248;
    pub const BID_QTY: usize = 328;
    pub const ASK_QTY: usize = 408;
    pub const TRADES_COUNT: usize = 488;
    pub const TICKER_STATUS: usize = 496;
    pub const TICKER_STATUS_LEN: usize = 8;
    pub const DEPTH: usize = 10;
}

/// Level-1 queue block occupying the last bytes of a snapshot payload.
///
/// Each side is one leading 64-bit quantity slot followed by nine 32-bit
/// slots, then the current and maximum queue counts.
pub mod level1 {
    pub const LEN: usize = 112;
    pub const RECV_TIME: usize = 0;
    pub const BID1_QTY: usize = 8;
    pub const BID1_COUNT: usize = 52;
    pub const MAX_BID1_COUNT: usize = 56;
    pub const ASK1_QTY: usize = 60;
    pub const ASK1_COUNT: usize = 104;
    pub const MAX_ASK1_COUNT: usize = 108;
    /// Width of one side's quantity slots: 8 + 9 * 4.
    pub const QTY_SLOTS_LEN: usize = 44;
    pub const QUEUE_LEN: usize = 10;
}

/// Snapshot payload: quote block, reserved region, level-1 block.
pub mod snapshot {
    pub const RESERVED_LEN: usize = 72;
    pub const LEN: usize = super::market_data::LEN + RESERVED_LEN + super::level1::LEN;
}

/// Bounds-checked little-endian field access over one fixed-width block.
///
/// The width is checked once in [`Fields::new`]; every accessor afterwards
/// reads inside that width.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fields<'a> {
    buf: &'a [u8],
}

impl<'a> Fields<'a> {
    pub fn new(buf: &'a [u8], width: usize, context: &'static str) -> Result<Self> {
        if buf.len() < width {
            return Err(DecodeError::TruncatedStream {
                context,
                offset: 0,
                needed: width,
                got: buf.len(),
            });
        }
        Ok(Self { buf: &buf[..width] })
    }

    fn bytes<const N: usize>(&self, off: usize) -> [u8; N] {
        let mut tmp = [0u8; N];
        tmp.copy_from_slice(&self.buf[off..off + N]);
        tmp
    }

    pub fn u8(&self, off: usize) -> u8 {
        self.buf[off]
    }

    pub fn u16(&self, off: usize) -> u16 {
        u16::from_le_bytes(self.bytes(off))
    }

    pub fn u32(&self, off: usize) -> u32 {
        u32::from_le_bytes(self.bytes(off))
    }

    pub fn i32(&self, off: usize) -> i32 {
        i32::from_le_bytes(self.bytes(off))
    }

    pub fn i64(&self, off: usize) -> i64 {
        i64::from_le_bytes(self.bytes(off))
    }

    pub fn f64(&self, off: usize) -> f64 {
        f64::from_le_bytes(self.bytes(off))
    }

    pub fn f64_array<const N: usize>(&self, off: usize) -> [f64; N] {
        std::array::from_fn(|i| self.f64(off + i * 8))
    }

    pub fn i64_array<const N: usize>(&self, off: usize) -> [i64; N] {
        std::array::from_fn(|i| self.i64(off + i * 8))
    }

    /// Text field with the trailing null padding removed.
    pub fn text(&self, off: usize, len: usize, field: &'static str) -> Result<String> {
        let raw = &self.buf[off..off + len];
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        decode_text(&raw[..end], field)
    }

    /// Text field kept byte for byte, padding included.
    pub fn raw_text(&self, off: usize, len: usize, field: &'static str) -> Result<String> {
        decode_text(&self.buf[off..off + len], field)
    }
}

fn decode_text(bytes: &[u8], field: &'static str) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|source| DecodeError::StringDecode { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_widths_add_up() {
        assert_eq!(header::TIMESTAMP + header::TIMESTAMP_LEN, header::LEN);
        assert_eq!(tick::TICK_TYPE + 4 + 4, tick::LEN);
        assert_eq!(entrust::ORDER_NO + 8, entrust::LEN);
        assert_eq!(transaction::TRADE_FLAG + 1, transaction::LEN);
        assert_eq!(market_data::TICKER_STATUS + market_data::TICKER_STATUS_LEN, market_data::LEN);
        assert_eq!(market_data::ASK_QTY + 8 * market_data::DEPTH, market_data::TRADES_COUNT);
        assert_eq!(level1::BID1_QTY + level1::QTY_SLOTS_LEN, level1::BID1_COUNT);
        assert_eq!(level1::ASK1_QTY + level1::QTY_SLOTS_LEN, level1::ASK1_COUNT);
        assert_eq!(level1::MAX_ASK1_COUNT + 4, level1::LEN);
        assert_eq!(snapshot::LEN, 688);
    }

    #[test]
    fn short_buffer_is_truncation() {
        let err = Fields::new(&[0u8; 10], 20, "header").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedStream { context: "header", needed: 20, got: 10, .. }
        ));
    }

    #[test]
    fn text_strips_trailing_nulls_only() {
        let buf = *b"\0AB\0C\0\0\0";
        let f = Fields::new(&buf, 8, "t").unwrap();
        assert_eq!(f.text(0, 8, "t").unwrap(), "\0AB\0C");
        assert_eq!(f.text(5, 3, "t").unwrap(), "");
        assert_eq!(f.raw_text(1, 4, "t").unwrap(), "AB\0C");
    }

    #[test]
    fn invalid_text_is_an_explicit_error() {
        let buf = [b'A', 0xff, 0xfe, 0];
        let f = Fields::new(&buf, 4, "t").unwrap();
        let err = f.text(0, 4, "ticker").unwrap_err();
        assert!(matches!(err, DecodeError::StringDecode { field: "ticker", .. }));
    }

    #[test]
    fn little_endian_reads() {
        let mut buf = vec![0u8; 16];
        buf[0..4].copy_from_slice(&(-5i32).to_le_bytes());
        buf[4..12].copy_from_slice(&2.5f64.to_le_bytes());
        buf[12..14].copy_from_slice(&0xbeefu16.to_le_bytes());
        let f = Fields::new(&buf, 16, "t").unwrap();
        assert_eq!(f.i32(0), -5);
        assert_eq!(f.f64(4), 2.5);
        assert_eq!(f.u16(12), 0xbeef);
    }
}
