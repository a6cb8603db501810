//! Decoder options.

/// How strictly a header's `payload_size` is checked against the record layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadCheck {
    /// Declared size must equal the layout width: 688 for snapshots, 96 for
    /// entrust ticks and 101 for trade ticks. Ticks with other inner tags only
    /// need the envelope.
    #[default]
    Exact,
    /// Only the minimum width is required and trailing bytes are ignored.
    Lenient,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub payload_check: PayloadCheck,
}

impl DecodeOptions {
    pub fn lenient() -> Self {
        Self { payload_check: PayloadCheck::Lenient }
    }

    pub fn with_payload_check(mut self, check: PayloadCheck) -> Self {
        self.payload_check = check;
        self
    }
}
