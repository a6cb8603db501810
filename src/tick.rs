//! Tick-by-tick payload decoding: the envelope and its two body variants.
use crate::error::Result;
use crate::layout::{entrust as en, tick as tk, transaction as tx, Fields};
use crate::record::{Entrust, TickBody, TickByTick, Transaction};

/// Decode an order entry body.
pub fn decode_entrust(buf: &[u8]) -> Result<Entrust> {
    let f = Fields::new(buf, en::LEN, "entrust body")?;
    Ok(Entrust {
        channel_no: f.i32(en::CHANNEL_NO),
        seq: f.i64(en::SEQ),
        price: f.f64(en::PRICE),
        qty: f.i64(en::QTY),
        side: f.u8(en::SIDE),
        ord_type: f.u8(en::ORD_TYPE),
        order_no: f.i64(en::ORDER_NO),
    })
}

/// Decode a trade body.
pub fn decode_transaction(buf: &[u8]) -> Result<Transaction> {
    let f = Fields::new(buf, tx::LEN, "transaction body")?;
    Ok(Transaction {
        channel_no: f.i32(tx::CHANNEL_NO),
        seq: f.i64(tx::SEQ),
        price: f.f64(tx::PRICE),
        qty: f.i64(tx::QTY),
        money: f.f64(tx::MONEY),
        bid_no: f.i64(tx::BID_NO),
        ask_no: f.i64(tx::ASK_NO),
        trade_flag: f.u8(tx::TRADE_FLAG),
    })
}

/// Width of the body that follows the envelope for a given inner tag.
pub fn body_len(tick_type: i32) -> usize {
    match tick_type {
        TickByTick::ENTRUST_TYPE => en::LEN,
        TickByTick::TRADE_TYPE => tx::LEN,
        _ => 0,
    }
}

/// Read the inner type tag without decoding the rest of the envelope.
pub(crate) fn peek_tick_type(buf: &[u8]) -> Result<i32> {
    Ok(Fields::new(buf, tk::LEN, "tick envelope")?.i32(tk::TICK_TYPE))
}

/// Decode a tick payload: the 48-byte envelope and, for entrust and trade
/// tags, the body right behind it. Other tags decode to [`TickBody::Other`].
pub fn decode_tick_by_tick(buf: &[u8]) -> Result<TickByTick> {
    let f = Fields::new(buf, tk::LEN, "tick envelope")?;
    let tick_type = f.i32(tk::TICK_TYPE);
    let rest = &buf[tk::LEN..];
    let body = match tick_type {
        TickByTick::ENTRUST_TYPE => TickBody::Entrust(decode_entrust(rest)?),
        TickByTick::TRADE_TYPE => TickBody::Transaction(decode_transaction(rest)?),
        other => TickBody::Other { tick_type: other },
    };
    Ok(TickByTick {
        exchange_id: f.i32(tk::EXCHANGE_ID),
        ticker: f.text(tk::TICKER, tk::TICKER_LEN, "tick.ticker")?,
        seq: f.i64(tk::SEQ),
        data_time: f.i64(tk::DATA_TIME),
        tick_type,
        body,
    })
}
