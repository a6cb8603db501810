//! Snapshot payload decoding.
//!
//! A snapshot payload is the 504-byte quote block, a reserved region that is
//! skipped unread, and a 112-byte level-1 block anchored at the end of the
//! payload.
use crate::error::{DecodeError, Result};
use crate::layout::{level1 as l1, market_data as md, snapshot, Fields};
use crate::record::{MarketData, Snapshot};

/// Decode the quote block at the start of `buf`.
pub fn decode_market_data(buf: &[u8]) -> Result<MarketData> {
    let f = Fields::new(buf, md::LEN, "market data")?;
    Ok(MarketData {
        exchange_id: f.i32(md::EXCHANGE_ID),
        ticker: f.text(md::TICKER, md::TICKER_LEN, "market_data.ticker")?,
        last_price: f.f64(md::LAST_PRICE),
        pre_close_price: f.f64(md::PRE_CLOSE_PRICE),
        open_price: f.f64(md::OPEN_PRICE),
        high_price: f.f64(md::HIGH_PRICE),
        low_price: f.f64(md::LOW_PRICE),
        close_price: f.f64(md::CLOSE_PRICE),
        pre_total_long_position: f.i64(md::PRE_TOTAL_LONG_POSITION),
        total_long_position: f.i64(md::TOTAL_LONG_POSITION),
        pre_settl_price: f.f64(md::PRE_SETTL_PRICE),
        settl_price: f.f64(md::SETTL_PRICE),
        upper_limit_price: f.f64(md::UPPER_LIMIT_PRICE),
        lower_limit_price: f.f64(md::LOWER_LIMIT_PRICE),
        pre_delta: f.f64(md::PRE_DELTA),
        curr_delta: f.f64(md::CURR_DELTA),
        data_time: f.i64(md::DATA_TIME),
        qty: f.i64(md::QTY),
        turnover: f.f64(md::TURNOVER),
        avg_price: f.f64(md::AVG_PRICE),
        bid: f.f64_array(md::BID),
        ask: f.f64_array(md::ASK),
        bid_qty: f.i64_array(md::BID_QTY),
        ask_qty: f.i64_array(md::ASK_QTY),
        trades_count: f.i64(md::TRADES_COUNT),
        ticker_status: f.text(md::TICKER_STATUS, md::TICKER_STATUS_LEN, "market_data.ticker_status")?,
    })
}

/// One side of the level-1 queue: a leading 64-bit slot then nine 32-bit slots.
fn queue(f: &Fields<'_>, off: usize) -> [i64; l1::QUEUE_LEN] {
    std::array::from_fn(|i| match i {
        0 => f.i64(off),
        _ => i64::from(f.i32(off + 8 + (i - 1) * 4)),
    })
}

/// Decode a whole snapshot payload.
///
/// `buf` must hold at least [`snapshot::LEN`] bytes. Anything between the end
/// of the quote block and the final 112 bytes is treated as reserved.
pub fn decode_snapshot(buf: &[u8]) -> Result<Snapshot> {
    if buf.len() < snapshot::LEN {
        return Err(DecodeError::TruncatedStream {
            context: "snapshot payload",
            offset: 0,
            needed: snapshot::LEN,
            got: buf.len(),
        });
    }
    let market_data = decode_market_data(buf)?;
    let f = Fields::new(&buf[buf.len() - l1::LEN..], l1::LEN, "level-1 block")?;
    Ok(Snapshot {
        market_data,
        recv_time: f.i64(l1::RECV_TIME),
        bid1_qty: queue(&f, l1::BID1_QTY),
        bid1_count: f.i32(l1::BID1_COUNT),
        max_bid1_count: f.i32(l1::MAX_BID1_COUNT),
        ask1_qty: queue(&f, l1::ASK1_QTY),
        ask1_count: f.i32(l1::ASK1_COUNT),
        max_ask1_count: f.i32(l1::MAX_ASK1_COUNT),
    })
}
