//! Record-by-record reading of a `.dat` capture.
//!
//! [`DatReader`] reads one header, then exactly the payload it declares, and
//! routes that payload by type tag. Payload boundaries are only known from the
//! preceding header, so records are read strictly in order and a failed
//! record ends the sequence.
use crate::config::{DecodeOptions, PayloadCheck};
use crate::error::{DecodeError, Result};
use crate::header::decode_header;
use crate::layout::{header, snapshot, tick as tk};
use crate::reader::StreamReader;
use crate::record::{DataType, Frame, Header, Record};
use crate::snapshot::decode_snapshot;
use crate::tick::{body_len, decode_tick_by_tick, peek_tick_type};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, trace, warn};

type PayloadDecoder = fn(&[u8]) -> Result<Record>;

/// Decoder registered for an outer type tag. Tags without one are passed
/// through as [`Record::Unparsed`].
fn decoder_for(data_type: DataType) -> Option<PayloadDecoder> {
    match data_type {
        DataType::Snapshot => Some(snapshot_record as PayloadDecoder),
        DataType::Tick => Some(tick_record as PayloadDecoder),
        DataType::OrderBook | DataType::Static | DataType::Unknown(_) => None,
    }
}

fn snapshot_record(payload: &[u8]) -> Result<Record> {
    Ok(Record::Snapshot(Box::new(decode_snapshot(payload)?)))
}

fn tick_record(payload: &[u8]) -> Result<Record> {
    Ok(Record::TickByTick(decode_tick_by_tick(payload)?))
}

/// Sequential reader over a capture stream.
#[derive(Debug)]
pub struct DatReader<R> {
    stream: StreamReader<R>,
    options: DecodeOptions,
}

impl DatReader<BufReader<File>> {
    /// Open a capture file with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> DatReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_options(inner, DecodeOptions::default())
    }

    pub fn with_options(inner: R, options: DecodeOptions) -> Self {
        Self { stream: StreamReader::new(inner), options }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.stream.offset()
    }

    /// Read the next record. `Ok(None)` means the stream ended cleanly at a
    /// record boundary.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let at = self.stream.offset();
        let Some(raw) = self.stream.read_block(header::LEN, "header")? else {
            debug!(offset = at, "end of stream");
            return Ok(None);
        };
        let header = decode_header(&raw)?;
        let payload_at = self.stream.offset();
        let payload = self
            .stream
            .read_exact(usize::from(header.payload_size), "payload")?;

        let record = match decoder_for(header.data_type) {
            Some(decode) => {
                self.check_payload(&header, &payload, payload_at)?;
                decode(&payload)?
            }
            None => {
                debug!(offset = at, data_type = %header.data_type, size = payload.len(), "unparsed record");
                Record::Unparsed { payload }
            }
        };
        trace!(offset = at, data_type = %header.data_type, magic = header.magic, "decoded record");
        Ok(Some(Frame { header, record }))
    }

    /// Check the declared payload width against what the layout requires.
    fn check_payload(&self, header: &Header, payload: &[u8], offset: u64) -> Result<()> {
        let declared = payload.len();
        let (context, min, exact) = match header.data_type {
            DataType::Snapshot => ("snapshot payload", snapshot::LEN, true),
            DataType::Tick => {
                if declared < tk::LEN {
                    return Err(DecodeError::TruncatedStream {
                        context: "tick envelope",
                        offset,
                        needed: tk::LEN,
                        got: declared,
                    });
                }
                let body = body_len(peek_tick_type(payload)?);
                ("tick payload", tk::LEN + body, body > 0)
            }
            _ => return Ok(()),
        };
        if declared < min {
            return Err(DecodeError::TruncatedStream { context, offset, needed: min, got: declared });
        }
        if exact && declared != min && self.options.payload_check == PayloadCheck::Exact {
            return Err(DecodeError::PayloadSizeMismatch {
                data_type: header.data_type,
                declared,
                expected: min,
            });
        }
        Ok(())
    }

    /// Iterate over the remaining records.
    pub fn records(&mut self) -> Records<'_, R> {
        Records { reader: self, done: false }
    }
}

/// Borrowing iterator returned by [`DatReader::records`].
///
/// Yields each record in stream order and stops for good after the end of the
/// stream or the first error.
pub struct Records<'a, R> {
    reader: &'a mut DatReader<R>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                warn!(offset = self.reader.offset(), error = %e, "decode aborted");
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for Records<'_, R> {}

/// Owning iterator produced by `DatReader::into_iter`.
pub struct IntoRecords<R> {
    reader: DatReader<R>,
    done: bool,
}

impl<R: Read> Iterator for IntoRecords<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut it = Records { reader: &mut self.reader, done: false };
        let item = it.next();
        self.done = it.done;
        item
    }
}

impl<R: Read> std::iter::FusedIterator for IntoRecords<R> {}

impl<R: Read> IntoIterator for DatReader<R> {
    type Item = Result<Frame>;
    type IntoIter = IntoRecords<R>;

    fn into_iter(self) -> Self::IntoIter {
        IntoRecords { reader: self, done: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{entrust as en, level1, market_data as md, transaction as tx};
    use crate::record::TickBody;
    use std::io::Cursor;

    fn header_bytes(tag: u32, size: usize) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&tag.to_le_bytes());
        b.extend_from_slice(&(size as u16).to_le_bytes());
        b.extend_from_slice(&7u16.to_le_bytes());
        b.extend_from_slice(b"20240101\0\0\0\0");
        b
    }

    fn tick_payload(tick_type: i32, body: usize) -> Vec<u8> {
        let mut b = vec![0u8; tk::LEN + body];
        b[tk::TICKER..tk::TICKER + 3].copy_from_slice(b"ABC");
        b[tk::SEQ..tk::SEQ + 8].copy_from_slice(&31i64.to_le_bytes());
        b[tk::DATA_TIME..tk::DATA_TIME + 8].copy_from_slice(&32i64.to_le_bytes());
        b[tk::TICK_TYPE..tk::TICK_TYPE + 4].copy_from_slice(&tick_type.to_le_bytes());
        if tick_type == 1 && body >= en::LEN {
            b[tk::LEN + en::SIDE] = b'S';
        }
        if tick_type == 2 && body >= tx::LEN {
            b[tk::LEN + tx::TRADE_FLAG] = b'N';
        }
        b
    }

    fn snapshot_payload() -> Vec<u8> {
        let mut b = vec![0u8; snapshot::LEN];
        b[md::TICKER..md::TICKER + 4].copy_from_slice(b"IF01");
        for i in 0..10 {
            b[md::BID + i * 8..md::BID + i * 8 + 8].copy_from_slice(&(1.0 + i as f64).to_le_bytes());
        }
        let tail = snapshot::LEN - level1::LEN;
        b[tail..tail + 8].copy_from_slice(&99i64.to_le_bytes());
        b
    }

    fn record(tag: u32, payload: &[u8]) -> Vec<u8> {
        let mut b = header_bytes(tag, payload.len());
        b.extend_from_slice(payload);
        b
    }

    #[test]
    fn entrust_tick_scenario() {
        let bytes = record(DataType::TICK_TAG, &tick_payload(1, en::LEN));
        let mut r = DatReader::new(Cursor::new(bytes));
        let frame = r.next_frame().unwrap().unwrap();
        assert_eq!(frame.data_type(), DataType::Tick);
        assert_eq!(frame.header.payload_size, 96);
        assert_eq!(frame.header.magic, 7);
        let Record::TickByTick(t) = frame.record else { panic!("expected tick") };
        assert_eq!((t.seq, t.data_time), (31, 32));
        assert_eq!(t.entrust().map(|e| e.side), Some(b'S'));
        assert!(r.next_frame().unwrap().is_none());
    }

    #[test]
    fn mixed_stream_in_order() {
        let mut bytes = record(DataType::SNAPSHOT_TAG, &snapshot_payload());
        bytes.extend(record(DataType::ORDER_BOOK_TAG, &[1, 2, 3]));
        bytes.extend(record(DataType::TICK_TAG, &tick_payload(2, tx::LEN)));
        bytes.extend(record(DataType::TICK_TAG, &tick_payload(5, 0)));
        bytes.extend(record(0xabcd, &[]));
        let frames: Vec<Frame> = DatReader::new(Cursor::new(bytes))
            .into_iter()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames.len(), 5);

        let Record::Snapshot(s) = &frames[0].record else { panic!("expected snapshot") };
        assert_eq!(s.market_data.ticker, "IF01");
        assert_eq!(s.market_data.bid, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(s.recv_time, 99);

        assert_eq!(frames[1].data_type(), DataType::OrderBook);
        assert_eq!(frames[1].record, Record::Unparsed { payload: vec![1, 2, 3] });

        let Record::TickByTick(t) = &frames[2].record else { panic!("expected tick") };
        assert_eq!(t.transaction().map(|x| x.trade_flag), Some(b'N'));

        let Record::TickByTick(t) = &frames[3].record else { panic!("expected tick") };
        assert_eq!(t.body, TickBody::Other { tick_type: 5 });

        assert_eq!(frames[4].data_type(), DataType::Unknown(0xabcd));
        assert_eq!(frames[4].record, Record::Unparsed { payload: vec![] });
    }

    #[test]
    fn partial_header_is_truncation() {
        for n in 1..header::LEN {
            let mut bytes = record(DataType::ORDER_BOOK_TAG, &[9]);
            bytes.extend(vec![0u8; n]);
            let mut it = DatReader::new(Cursor::new(bytes)).into_iter();
            assert!(it.next().unwrap().is_ok());
            let err = it.next().unwrap().unwrap_err();
            assert!(matches!(err, DecodeError::TruncatedStream { context: "header", offset: 21, .. }));
            assert!(it.next().is_none());
        }
    }

    #[test]
    fn short_payload_in_stream_is_truncation() {
        let mut bytes = header_bytes(DataType::SNAPSHOT_TAG, snapshot::LEN);
        bytes.extend(vec![0u8; 100]);
        let err = DatReader::new(Cursor::new(bytes)).next_frame().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedStream { context: "payload", offset: 20, needed: 688, got: 100 }
        ));
    }

    #[test]
    fn exact_check_rejects_oversized_snapshot() {
        let mut payload = snapshot_payload();
        payload.extend([0u8; 8]);
        let bytes = record(DataType::SNAPSHOT_TAG, &payload);
        let err = DatReader::new(Cursor::new(bytes.clone())).next_frame().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::PayloadSizeMismatch { data_type: DataType::Snapshot, declared: 696, expected: 688 }
        ));

        let mut lenient = DatReader::with_options(Cursor::new(bytes), DecodeOptions::lenient());
        let frame = lenient.next_frame().unwrap().unwrap();
        assert!(matches!(frame.record, Record::Snapshot(_)));
    }

    #[test]
    fn undersized_declaration_is_truncation_in_any_mode() {
        let bytes = record(DataType::TICK_TAG, &tick_payload(1, 20));
        let mut r = DatReader::with_options(Cursor::new(bytes), DecodeOptions::lenient());
        let err = r.next_frame().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedStream { context: "tick payload", offset: 20, needed: 96, got: 68 }
        ));
    }

    #[test]
    fn unknown_inner_tag_accepts_trailing_bytes() {
        let bytes = record(DataType::TICK_TAG, &tick_payload(7, 16));
        let frame = DatReader::new(Cursor::new(bytes)).next_frame().unwrap().unwrap();
        let Record::TickByTick(t) = frame.record else { panic!("expected tick") };
        assert_eq!(t.body, TickBody::Other { tick_type: 7 });
    }

    #[test]
    fn records_iterator_stops_after_error() {
        let mut bytes = record(DataType::TICK_TAG, &tick_payload(1, en::LEN));
        bytes.extend(record(DataType::TICK_TAG, &tick_payload(1, 10)));
        bytes.extend(record(DataType::TICK_TAG, &tick_payload(1, en::LEN)));
        let mut r = DatReader::new(Cursor::new(bytes));
        let results: Vec<_> = r.records().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
