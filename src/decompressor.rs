use crate::codec::{FrameReader, MatchCodec, Token};
use crate::config::Config;
use crate::error::Result;
use crate::stats::{DecompressionStats, Progress};
use crate::stream::{SymbolBuffer, SymbolSink};
use crate::symbol::{Symbol, SymbolWidth};
use crate::window::SlidingWindow;
use std::io::{BufReader, Read};

/// Symbols between two progress callbacks.
const PROGRESS_INTERVAL: u64 = 1 << 16;

/// Streaming decompressor for one session.
///
/// Decoded tokens are replayed into a window of the same size the compressor used.
/// A symbol is handed to the sink only when its slot is about to be overwritten,
/// and the rest of the window is drained once the stream ends.
pub struct Decompressor<T> {
    config: Config,
    window: SlidingWindow<T>,
    progress: Progress,
}

impl<T: Symbol> Decompressor<T> {
    pub fn new(config: Config) -> Self {
        log::debug!(
            "decompressor: window {} symbols, {} bytes per match, {} bytes per literal",
            config.window_size(),
            config.match_bytes(),
            T::BYTES
        );

        Self {
            config,
            window: SlidingWindow::new(config.window_size()),
            progress: Progress::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the counters.
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Decodes a whole compressed stream from `reader` into `sink`.
    pub fn decompress<R, K>(self, reader: R, sink: &mut K) -> Result<DecompressionStats>
    where
        R: Read,
        K: SymbolSink<T>,
    {
        self.decompress_with_progress(reader, sink, |_| {})
    }

    /// Like [`Decompressor::decompress`], calling `report` periodically and once at
    /// the end.
    pub fn decompress_with_progress<R, K, F>(
        mut self,
        reader: R,
        sink: &mut K,
        mut report: F,
    ) -> Result<DecompressionStats>
    where
        R: Read,
        K: SymbolSink<T>,
        F: FnMut(&Progress),
    {
        let codec = MatchCodec::new(&self.config);
        let mut frames = FrameReader::<_, T>::new(BufReader::new(reader), codec);
        let mut reported = 0;

        while let Some(token) = frames.next_token()? {
            match token {
                Token::Literal(symbol) => {
                    self.window.append(symbol);
                    self.deliver_overwritten(sink)?;
                }
                Token::Match(m) => {
                    self.window.set_replay_source(m.index);
                    for _ in 0..m.length {
                        self.window.append_replayed_symbol();
                        self.deliver_overwritten(sink)?;
                    }
                }
            }

            self.progress.bytes_read = frames.bytes_read();
            if self.progress.symbols_processed - reported >= PROGRESS_INTERVAL {
                reported = self.progress.symbols_processed;
                report(&self.progress);
            }
        }

        while !self.window.is_empty_during_replay() {
            let symbol = self.window.evict_oldest();
            self.deliver(symbol, sink)?;
        }
        self.progress.bytes_read = frames.bytes_read();
        report(&self.progress);

        let stats = DecompressionStats {
            bytes_in: self.progress.bytes_read,
            symbols_out: self.progress.symbols_processed,
        };
        log::debug!(
            "decompressed {} bytes into {} symbols",
            stats.bytes_in,
            stats.symbols_out
        );
        Ok(stats)
    }

    /// Hands the oldest symbol to the sink once the ring has wrapped onto it.
    #[inline]
    fn deliver_overwritten<K: SymbolSink<T>>(&mut self, sink: &mut K) -> Result<()> {
        if self.window.is_empty_during_replay() {
            let symbol = self.window.evict_oldest();
            self.deliver(symbol, sink)?;
        }
        Ok(())
    }

    #[inline]
    fn deliver<K: SymbolSink<T>>(&mut self, symbol: T, sink: &mut K) -> Result<()> {
        sink.write_symbol(symbol)?;
        self.progress.symbols_processed += 1;
        self.progress.bytes_written += T::BYTES as u64;
        Ok(())
    }
}

/// Decompresses a stream produced by [`compress_symbols`](crate::compress_symbols)
/// with the same alphabet size and configuration.
pub fn decompress_symbols(compressed: &[u8], alphabet_size: u64, config: &Config) -> Result<Vec<u64>> {
    let mut sink = SymbolBuffer::new(alphabet_size);
    decompress_to_sink(compressed, &mut sink, config)?;
    Ok(sink.into_symbols())
}

/// Decompresses into an integer sink, reading literals at the width the sink's
/// alphabet size calls for.
pub fn decompress_to_sink<R, K>(reader: R, sink: &mut K, config: &Config) -> Result<DecompressionStats>
where
    R: Read,
    K: SymbolSink<u64>,
{
    decompress_to_sink_with_progress(reader, sink, config, |_| {})
}

/// Like [`decompress_to_sink`], calling `report` periodically and once at the end.
pub fn decompress_to_sink_with_progress<R, K, F>(
    reader: R,
    sink: &mut K,
    config: &Config,
    report: F,
) -> Result<DecompressionStats>
where
    R: Read,
    K: SymbolSink<u64>,
    F: FnMut(&Progress),
{
    let width = SymbolWidth::for_alphabet(sink.alphabet_size());
    let mut sink = Widened(sink);
    match width {
        SymbolWidth::U8 => Decompressor::<u8>::new(*config).decompress_with_progress(reader, &mut sink, report),
        SymbolWidth::U16 => Decompressor::<u16>::new(*config).decompress_with_progress(reader, &mut sink, report),
        SymbolWidth::U32 => Decompressor::<u32>::new(*config).decompress_with_progress(reader, &mut sink, report),
        SymbolWidth::U64 => Decompressor::<u64>::new(*config).decompress_with_progress(reader, &mut sink, report),
    }
}

/// Presents an integer sink to a decompressor of any symbol width.
struct Widened<'a, K>(&'a mut K);

impl<T: Symbol, K: SymbolSink<u64>> SymbolSink<T> for Widened<'_, K> {
    fn write_symbol(&mut self, symbol: T) -> Result<()> {
        self.0.write_symbol(symbol.to_u64())
    }

    fn alphabet_size(&self) -> u64 {
        self.0.alphabet_size()
    }
}
