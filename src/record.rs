//! Decoded record types.
//!
//! Every type here is a plain value produced by one decode call. Nothing holds
//! a reference back into the stream.
use serde::Serialize;
use std::fmt;

/// Outer record discriminant carried in the first four header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Snapshot,
    Tick,
    OrderBook,
    Static,
    /// Any tag the format does not declare.
    Unknown(u32),
}

impl DataType {
    pub const SNAPSHOT_TAG: u32 = 0x0020_2001;
    pub const TICK_TAG: u32 = 0x0020_2002;
    pub const ORDER_BOOK_TAG: u32 = 0x0020_2003;
    pub const STATIC_TAG: u32 = 0x0020_2004;

    pub fn from_tag(tag: u32) -> Self {
        match tag {
            Self::SNAPSHOT_TAG => DataType::Snapshot,
            Self::TICK_TAG => DataType::Tick,
            Self::ORDER_BOOK_TAG => DataType::OrderBook,
            Self::STATIC_TAG => DataType::Static,
            other => DataType::Unknown(other),
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            DataType::Snapshot => Self::SNAPSHOT_TAG,
            DataType::Tick => Self::TICK_TAG,
            DataType::OrderBook => Self::ORDER_BOOK_TAG,
            DataType::Static => Self::STATIC_TAG,
            DataType::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Snapshot => f.write_str("snapshot"),
            DataType::Tick => f.write_str("tick"),
            DataType::OrderBook => f.write_str("order-book"),
            DataType::Static => f.write_str("static"),
            DataType::Unknown(tag) => write!(f, "unknown({tag:#010x})"),
        }
    }
}

/// Fixed 20-byte record header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub data_type: DataType,
    /// Bytes of payload that immediately follow the header.
    pub payload_size: u16,
    pub magic: u16,
    /// Raw 12-byte timestamp text, trailing nulls included.
    pub timestamp: String,
}

impl Header {
    /// Timestamp with the null padding removed, for display.
    pub fn timestamp_trimmed(&self) -> &str {
        self.timestamp.trim_end_matches('\0')
    }
}

/// Per-instrument quote block shared by every snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketData {
    pub exchange_id: i32,
    pub ticker: String,
    pub last_price: f64,
    pub pre_close_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub pre_total_long_position: i64,
    pub total_long_position: i64,
    pub pre_settl_price: f64,
    pub settl_price: f64,
    pub upper_limit_price: f64,
    pub lower_limit_price: f64,
    pub pre_delta: f64,
    pub curr_delta: f64,
    pub data_time: i64,
    pub qty: i64,
    pub turnover: f64,
    pub avg_price: f64,
    /// Ten bid levels, best first.
    pub bid: [f64; 10],
    /// Ten ask levels, best first.
    pub ask: [f64; 10],
    pub bid_qty: [i64; 10],
    pub ask_qty: [i64; 10],
    pub trades_count: i64,
    pub ticker_status: String,
}

/// Full snapshot: quote block plus the level-1 queue histories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub market_data: MarketData,
    pub recv_time: i64,
    pub bid1_qty: [i64; 10],
    pub bid1_count: i32,
    pub max_bid1_count: i32,
    pub ask1_qty: [i64; 10],
    pub ask1_count: i32,
    pub max_ask1_count: i32,
}

/// Order entry event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entrust {
    pub channel_no: i32,
    pub seq: i64,
    pub price: f64,
    pub qty: i64,
    /// Raw side byte, e.g. `b'1'` buy / `b'2'` sell.
    pub side: u8,
    pub ord_type: u8,
    pub order_no: i64,
}

impl fmt::Display for Entrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entrust {{ channel_no: {}, seq: {}, price: {}, qty: {}, side: {:?}, ord_type: {:?}, order_no: {} }}",
            self.channel_no,
            self.seq,
            self.price,
            self.qty,
            char::from(self.side),
            char::from(self.ord_type),
            self.order_no
        )
    }
}

/// Trade event matching a bid and an ask order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub channel_no: i32,
    pub seq: i64,
    pub price: f64,
    pub qty: i64,
    pub money: f64,
    pub bid_no: i64,
    pub ask_no: i64,
    pub trade_flag: u8,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction {{ channel_no: {}, seq: {}, price: {}, qty: {}, money: {}, bid_no: {}, ask_no: {}, trade_flag: {:?} }}",
            self.channel_no,
            self.seq,
            self.price,
            self.qty,
            self.money,
            self.bid_no,
            self.ask_no,
            char::from(self.trade_flag)
        )
    }
}

/// Body selected by the tick envelope's inner type tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickBody {
    Entrust(Entrust),
    Transaction(Transaction),
    /// Inner tag with no body decoder; the tag is kept as-is.
    Other { tick_type: i32 },
}

/// Tick-by-tick event envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickByTick {
    pub exchange_id: i32,
    pub ticker: String,
    pub seq: i64,
    pub data_time: i64,
    pub tick_type: i32,
    pub body: TickBody,
}

impl fmt::Display for TickByTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TickByTick {{ exchange_id: {}, ticker: {:?}, seq: {}, data_time: {}, tick_type: {}, body: ",
            self.exchange_id, self.ticker, self.seq, self.data_time, self.tick_type
        )?;
        match &self.body {
            TickBody::Entrust(e) => write!(f, "{e}")?,
            TickBody::Transaction(t) => write!(f, "{t}")?,
            TickBody::Other { .. } => f.write_str("None")?,
        }
        f.write_str(" }")
    }
}

impl TickByTick {
    pub const ENTRUST_TYPE: i32 = 1;
    pub const TRADE_TYPE: i32 = 2;

    pub fn entrust(&self) -> Option<&Entrust> {
        match &self.body {
            TickBody::Entrust(e) => Some(e),
            _ => None,
        }
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        match &self.body {
            TickBody::Transaction(t) => Some(t),
            _ => None,
        }
    }
}

/// One decoded record payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record {
    Snapshot(Box<Snapshot>),
    TickByTick(TickByTick),
    /// Payload of a record type without a decoder, kept byte for byte.
    Unparsed { payload: Vec<u8> },
}

/// A header together with the record it introduced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub header: Header,
    pub record: Record,
}

impl Frame {
    pub fn data_type(&self) -> DataType {
        self.header.data_type
    }
}
