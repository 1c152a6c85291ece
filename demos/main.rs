use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::process;
use std::time::Instant;
use stlz_rs::{
    decompress_to_sink_with_progress, Compressor, Config, IterSource, Progress, Symbol,
    SymbolBuffer, SymbolWidth, TokenDictionary, DEFAULT_WINDOW_BITS,
};

/// Compresses or decompresses a file.
///
/// Usage: cargo run --example main -- (-c | -d) [-b] [-s <bits>] [-p] <input> <output>
///
/// Text files are split into word and separator tokens; the token dictionary is
/// written to `<output>.dict` on compression and read from `<input>.dict` on
/// decompression. With `-b` every byte is a symbol and no dictionary is used.
struct Options {
    compress: bool,
    binary: bool,
    window_bits: u8,
    progress: bool,
    input: String,
    output: String,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} (-c | -d) [-b] [-s <bits>] [-p] <input> <output>",
        program
    );
    process::exit(1);
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("main");

    let mut mode = None;
    let mut binary = false;
    let mut window_bits = DEFAULT_WINDOW_BITS;
    let mut progress = false;
    let mut paths = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" => mode = Some(true),
            "-d" => mode = Some(false),
            "-b" => binary = true,
            "-p" => progress = true,
            "-s" => {
                window_bits = match iter.next().and_then(|bits| bits.parse().ok()) {
                    Some(bits) => bits,
                    None => usage(program),
                }
            }
            _ if arg.starts_with('-') => usage(program),
            _ => paths.push(arg.clone()),
        }
    }

    let (Some(compress), [input, output]) = (mode, paths.as_slice()) else {
        usage(program);
    };
    Options {
        compress,
        binary,
        window_bits,
        progress,
        input: input.clone(),
        output: output.clone(),
    }
}

fn print_progress(progress: &Progress) {
    match progress.fraction() {
        Some(fraction) => print!("\r\t{:6.2}%", fraction * 100.0),
        None => print!("\r\t{} symbols", progress.symbols_processed),
    }
    let _ = std::io::stdout().flush();
}

fn compress_as<T: Symbol>(
    config: Config,
    symbols: impl ExactSizeIterator<Item = T>,
    output: &str,
    show_progress: bool,
) -> stlz_rs::Result<()> {
    let writer = BufWriter::new(File::create(output)?);
    let compressor = Compressor::<T>::new(config);

    let stats = if show_progress {
        let stats = compressor.compress_with_progress(IterSource::new(symbols), writer, print_progress)?;
        println!();
        stats
    } else {
        compressor.compress(IterSource::new(symbols), writer)?
    };

    println!("\tSymbols: {}", stats.symbols_in);
    println!("\tLiterals: {}, matches: {}", stats.literals, stats.matches);
    println!("\tPeak tree nodes: {}", stats.peak_nodes);
    println!(
        "\tCompressed size: {} bytes ({:.2}% of {} bytes, {:.3} bits per symbol)",
        stats.bytes_out,
        stats.compression_ratio(),
        stats.bytes_in,
        stats.bits_per_symbol()
    );
    Ok(())
}

/// Decodes `compressed` into symbols of an alphabet of `alphabet_size` IDs.
fn decompress_ids(config: Config, compressed: &[u8], alphabet_size: u64, show_progress: bool) -> stlz_rs::Result<Vec<u64>> {
    let mut sink = SymbolBuffer::new(alphabet_size);
    let report = |progress: &Progress| {
        if show_progress {
            print_progress(progress);
        }
    };

    let stats = decompress_to_sink_with_progress(compressed, &mut sink, &config, report)?;
    if show_progress {
        println!();
    }
    println!("\tSymbols: {}", stats.symbols_out);
    Ok(sink.into_symbols())
}

fn compress_ids(config: Config, ids: &[u64], alphabet_size: u64, options: &Options) -> stlz_rs::Result<()> {
    let output = options.output.as_str();
    let progress = options.progress;
    match SymbolWidth::for_alphabet(alphabet_size) {
        SymbolWidth::U8 => compress_as(config, ids.iter().map(|&id| u8::from_u64(id)), output, progress),
        SymbolWidth::U16 => compress_as(config, ids.iter().map(|&id| u16::from_u64(id)), output, progress),
        SymbolWidth::U32 => compress_as(config, ids.iter().map(|&id| u32::from_u64(id)), output, progress),
        SymbolWidth::U64 => compress_as(config, ids.iter().copied(), output, progress),
    }
}

fn run(options: &Options) -> stlz_rs::Result<()> {
    let config = Config::new(options.window_bits)?.with_binary_mode(options.binary);
    let dictionary_path = |path: &str| format!("{}.dict", path);

    println!(
        "\t{}",
        if options.compress { "Compression" } else { "Decompression" }
    );
    println!(
        "\tSliding window size: {} (2^{}) symbols",
        config.window_size(),
        config.window_bits()
    );
    println!(
        "\tInput is a {} file",
        if config.binary_mode() { "binary" } else { "text" }
    );

    let mut input = Vec::new();
    BufReader::new(File::open(&options.input)?).read_to_end(&mut input)?;
    println!("\tInput file: {} ({} bytes)", options.input, input.len());

    let start = Instant::now();
    match (options.compress, config.binary_mode()) {
        (true, true) => {
            compress_as(config, input.iter().copied(), &options.output, options.progress)?;
        }
        (true, false) => {
            let mut dictionary = TokenDictionary::new();
            let ids = dictionary.encode(&input);
            println!("\tTokens: {}, unique: {}", ids.len(), dictionary.len());

            compress_ids(config, &ids, dictionary.alphabet_size(), options)?;
            fs::write(dictionary_path(&options.output), dictionary.to_bytes())?;
        }
        (false, true) => {
            let symbols = decompress_ids(config, &input, 1 << 8, options.progress)?;
            let bytes: Vec<u8> = symbols.into_iter().map(u8::from_u64).collect();
            fs::write(&options.output, bytes)?;
        }
        (false, false) => {
            let dictionary = TokenDictionary::from_bytes(&fs::read(dictionary_path(&options.input))?)?;
            println!("\tDictionary loaded: {} tokens", dictionary.len());

            let ids = decompress_ids(config, &input, dictionary.alphabet_size(), options.progress)?;
            fs::write(&options.output, dictionary.decode(&ids)?)?;
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    println!("\tOutput file: {}", options.output);
    println!(
        "\tTime elapsed: {:.3} ms ({:.1} KB/s)",
        elapsed * 1000.0,
        input.len() as f64 / 1000.0 / elapsed.max(f64::EPSILON)
    );
    Ok(())
}

fn main() {
    let options = parse_args();
    if let Err(err) = run(&options) {
        eprintln!("FATAL: {}", err);
        process::exit(1);
    }
}
