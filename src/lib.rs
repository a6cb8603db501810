//! Reader for XTP `.dat` market-data captures.
//!
//! A capture is a flat sequence of records, each a 20-byte header followed by
//! the payload size it declares. This crate decodes them into typed values:
//!
//! - `reader`: exact-length reads that tell a clean end of stream from a
//!   truncated one
//! - `header`, `snapshot`, `tick`: fixed-layout decoders for the header, the
//!   snapshot payload and the tick-by-tick payload (entrust / transaction)
//! - `dispatch`: [`DatReader`], which routes each payload by type tag and
//!   exposes the capture as an iterator of [`Frame`]s
//! - `layout`: the hand-written offset tables every decoder reads from
//!
//! Order book and static reference records have no decoder and are passed
//! through as raw bytes. The `xtp-dat` binary prints the records of a capture.
pub mod config;
pub mod dispatch;
pub mod error;
pub mod header;
pub mod layout;
pub mod reader;
pub mod record;
pub mod snapshot;
pub mod tick;

pub use config::{DecodeOptions, PayloadCheck};
pub use dispatch::{DatReader, IntoRecords, Records};
pub use error::{DecodeError, Result};
pub use header::decode_header;
pub use record::{
    DataType, Entrust, Frame, Header, MarketData, Record, Snapshot, TickBody, TickByTick,
    Transaction,
};
pub use snapshot::{decode_market_data, decode_snapshot};
pub use tick::{decode_entrust, decode_tick_by_tick, decode_transaction};
