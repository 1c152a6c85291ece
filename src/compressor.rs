use crate::codec::{FrameWriter, MatchCodec};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::stats::{CompressionStats, Progress};
use crate::stream::{IterSource, SymbolSource};
use crate::symbol::{Symbol, SymbolWidth};
use crate::tree::SuffixTree;
use std::io::Write;

/// Symbols between two progress callbacks.
const PROGRESS_INTERVAL: u64 = 1 << 16;

/// Streaming compressor for one session.
///
/// Symbols go through the suffix tree one at a time; completed token groups are
/// written out as soon as they fill, so memory stays bounded by the window size.
///
/// # Example
///
/// ```
/// use stlz_rs::{Compressor, Config, SliceSource};
///
/// let config = Config::new(8).unwrap();
/// let input = b"abracadabra abracadabra abracadabra";
///
/// let mut compressed: Vec<u8> = Vec::new();
/// let stats = Compressor::<u8>::new(config)
///     .compress(SliceSource::new(input), &mut compressed)
///     .unwrap();
///
/// assert_eq!(stats.symbols_in, input.len() as u64);
/// assert!(stats.matches > 0);
/// ```
pub struct Compressor<T> {
    config: Config,
    tree: SuffixTree<T>,
    frames: FrameWriter<T>,
    progress: Progress,
}

impl<T: Symbol> Compressor<T> {
    pub fn new(config: Config) -> Self {
        log::debug!(
            "compressor: window {} symbols, {} match length bits, {} bytes per match, {} bytes per literal",
            config.window_size(),
            config.match_length_bits(),
            config.match_bytes(),
            T::BYTES
        );

        Self {
            config,
            tree: SuffixTree::new(&config),
            frames: FrameWriter::new(MatchCodec::new(&config)),
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

    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    pub fn peak_node_count(&self) -> usize {
        self.tree.peak_node_count()
    }

    /// Compresses one symbol, writing any group it completes.
    pub fn push_symbol<W: Write>(&mut self, symbol: T, writer: &mut W) -> Result<()> {
        self.tree.append_symbol(symbol, &mut self.frames);
        self.progress.symbols_processed += 1;
        self.progress.bytes_read += T::BYTES as u64;
        self.progress.bytes_written += self.frames.write_ready(writer)? as u64;
        Ok(())
    }

    /// Writes the pending match, the end-of-stream marker and the final group.
    pub fn finish<W: Write>(mut self, writer: &mut W) -> Result<CompressionStats> {
        self.tree.finish(&mut self.frames);
        self.frames.finish();
        self.progress.bytes_written += self.frames.write_ready(writer)? as u64;
        writer.flush()?;

        let stats = CompressionStats {
            symbols_in: self.progress.symbols_processed,
            bytes_in: self.progress.bytes_read,
            bytes_out: self.progress.bytes_written,
            literals: self.frames.literals(),
            matches: self.frames.matches(),
            peak_nodes: self.tree.peak_node_count(),
        };
        log::debug!(
            "compressed {} symbols into {} bytes ({:.2}%), {} literals, {} matches, peak {} nodes",
            stats.symbols_in,
            stats.bytes_out,
            stats.compression_ratio(),
            stats.literals,
            stats.matches,
            stats.peak_nodes
        );
        Ok(stats)
    }

    /// Compresses everything `source` yields into `writer`.
    pub fn compress<S, W>(self, source: S, writer: W) -> Result<CompressionStats>
    where
        S: SymbolSource<T>,
        W: Write,
    {
        self.compress_with_progress(source, writer, |_| {})
    }

    /// Like [`Compressor::compress`], calling `report` periodically and once at the end.
    pub fn compress_with_progress<S, W, F>(
        mut self,
        mut source: S,
        mut writer: W,
        mut report: F,
    ) -> Result<CompressionStats>
    where
        S: SymbolSource<T>,
        W: Write,
        F: FnMut(&Progress),
    {
        self.progress.symbols_total = source.total_count();

        while let Some(symbol) = source.next_symbol() {
            self.push_symbol(symbol, &mut writer)?;
            if self.progress.symbols_processed % PROGRESS_INTERVAL == 0 {
                report(&self.progress);
            }
        }

        let progress = self.progress;
        let stats = self.finish(&mut writer)?;
        report(&Progress {
            bytes_written: stats.bytes_out,
            ..progress
        });
        Ok(stats)
    }
}

/// Compresses integer symbols from an alphabet of `alphabet_size` symbols,
/// using the narrowest symbol width that holds them.
///
/// The same alphabet size must be given to [`decompress_symbols`](crate::decompress_symbols).
pub fn compress_symbols(symbols: &[u64], alphabet_size: u64, config: &Config) -> Result<Vec<u8>> {
    if let Some(&symbol) = symbols.iter().find(|&&symbol| symbol >= alphabet_size) {
        return Err(Error::SymbolOutOfRange {
            symbol,
            alphabet_size,
        });
    }

    match SymbolWidth::for_alphabet(alphabet_size) {
        SymbolWidth::U8 => compress_as::<u8>(symbols, config),
        SymbolWidth::U16 => compress_as::<u16>(symbols, config),
        SymbolWidth::U32 => compress_as::<u32>(symbols, config),
        SymbolWidth::U64 => compress_as::<u64>(symbols, config),
    }
}

fn compress_as<T: Symbol>(symbols: &[u64], config: &Config) -> Result<Vec<u8>> {
    let mut compressed: Vec<u8> = Vec::new();
    let source = IterSource::new(symbols.iter().map(|&symbol| T::from_u64(symbol)));
    Compressor::<T>::new(*config).compress(source, &mut compressed)?;
    Ok(compressed)
}
