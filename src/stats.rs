/// Counters a driver updates while it runs.
///
/// Drivers only count; rendering is up to the caller, which receives a snapshot
/// through the progress callback or from the driver itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Symbols consumed by the compressor or produced by the decompressor
    pub symbols_processed: u64,
    /// Total symbols expected, when the source knows it
    pub symbols_total: Option<u64>,
    /// Bytes taken from the input
    pub bytes_read: u64,
    /// Bytes handed to the output
    pub bytes_written: u64,
}

impl Progress {
    /// Fraction of the expected symbols processed so far, if the total is known.
    pub fn fraction(&self) -> Option<f64> {
        match self.symbols_total {
            Some(0) => Some(1.0),
            Some(total) => Some(self.symbols_processed as f64 / total as f64),
            None => None,
        }
    }
}

/// Statistics about a finished compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Number of symbols compressed
    pub symbols_in: u64,
    /// Size of the symbols at their fixed width
    pub bytes_in: u64,
    /// Size of the compressed stream
    pub bytes_out: u64,
    /// Literal tokens written
    pub literals: u64,
    /// Match tokens written, excluding the end-of-stream marker
    pub matches: u64,
    /// Highest suffix tree node count during the session
    pub peak_nodes: usize,
}

impl CompressionStats {
    /// Returns the compressed size as a percentage of the input size.
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            (self.bytes_out as f64 / self.bytes_in as f64) * 100.0
        }
    }

    /// Average compressed bits spent per input symbol.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.symbols_in == 0 {
            0.0
        } else {
            (self.bytes_out * 8) as f64 / self.symbols_in as f64
        }
    }
}

/// Statistics about a finished decompression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecompressionStats {
    /// Compressed bytes consumed, up to the end of the final group
    pub bytes_in: u64,
    /// Symbols delivered to the sink
    pub symbols_out: u64,
}
