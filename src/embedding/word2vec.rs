//! Reader and writer for the word2vec binary format.
//!
//! Layout:
//!
//! ```text
//! <count> <dimension>\n
//! <word> <dimension x f32 little-endian>[\n]
//! ...
//! ```
//!
//! Words are UTF-8 and end at the first space. The newline after each
//! vector is optional; readers skip it when present.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::time::Instant;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info};
use memmap2::MmapOptions;

use crate::embedding::{EmbeddingStore, KeyedVectors};
use crate::error::{RemarkaError, Result};

/// Upper bound on the number of rows reserved from the header count.
/// Larger tables grow as entries are read.
const MAX_PREALLOCATED_ROWS: usize = 1 << 16;

/// Largest vector width accepted from a header.
const MAX_DIMENSION: usize = 1 << 16;

/// Read a word2vec binary table from any reader.
pub fn read_word2vec<R: Read>(reader: R) -> Result<KeyedVectors> {
    let mut reader = BufReader::new(reader);
    let (count, dimension) = read_header(&mut reader)?;
    debug!("word2vec header: {count} tokens, dimension {dimension}");

    let mut store = KeyedVectors::with_capacity(dimension, count.min(MAX_PREALLOCATED_ROWS))?;
    let mut vector = vec![0.0_f32; dimension];

    for entry in 0..count {
        let word = read_word(&mut reader, entry)?;
        reader
            .read_f32_into::<LittleEndian>(&mut vector)
            .map_err(|e| {
                RemarkaError::embedding(format!("truncated vector for entry {entry} ('{word}'): {e}"))
            })?;
        store.insert(word, &vector)?;
    }

    Ok(store)
}

/// Memory-map and read a word2vec binary file.
pub fn load_word2vec<P: AsRef<Path>>(path: P) -> Result<KeyedVectors> {
    let path = path.as_ref();
    info!("Loading word2vec model from {}", path.display());
    let started = Instant::now();

    let file = File::open(path).map_err(|e| {
        RemarkaError::embedding(format!("Failed to open {}: {e}", path.display()))
    })?;
    let mmap = unsafe {
        MmapOptions::new().map(&file).map_err(|e| {
            RemarkaError::embedding(format!("Failed to mmap {}: {e}", path.display()))
        })?
    };

    let store = read_word2vec(&mmap[..])?;
    info!(
        "Loaded {} vectors of dimension {} in {:.2?}",
        store.len(),
        store.dimension(),
        started.elapsed()
    );
    Ok(store)
}

/// Read a word2vec binary stored as `entry` inside a zip archive.
pub fn load_word2vec_zip<P: AsRef<Path>>(path: P, entry: &str) -> Result<KeyedVectors> {
    let path = path.as_ref();
    info!("Loading word2vec model {entry} from archive {}", path.display());
    let started = Instant::now();

    let file = File::open(path).map_err(|e| {
        RemarkaError::embedding(format!("Failed to open {}: {e}", path.display()))
    })?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
    let stream = archive.by_name(entry)?;

    let store = read_word2vec(stream)?;
    info!(
        "Loaded {} vectors of dimension {} in {:.2?}",
        store.len(),
        store.dimension(),
        started.elapsed()
    );
    Ok(store)
}

/// Write a table in word2vec binary format.
pub fn write_word2vec<W: Write>(store: &KeyedVectors, writer: W) -> Result<()> {
    let mut writer = std::io::BufWriter::new(writer);
    writeln!(writer, "{} {}", store.len(), store.dimension())?;
    for (token, vector) in store.iter() {
        writer.write_all(token.as_bytes())?;
        writer.write_u8(b' ')?;
        for value in vector {
            writer.write_f32::<LittleEndian>(*value)?;
        }
        writer.write_u8(b'\n')?;
    }
    writer.flush()?;
    Ok(())
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<(usize, usize)> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| RemarkaError::embedding(format!("unreadable header: {e}")))?;

    let mut parts = line.split_whitespace();
    let mut next_number = |name: &str| -> Result<usize> {
        parts
            .next()
            .ok_or_else(|| RemarkaError::embedding(format!("header is missing the {name}")))?
            .parse::<usize>()
            .map_err(|e| RemarkaError::embedding(format!("invalid {name} in header: {e}")))
    };

    let count = next_number("token count")?;
    let dimension = next_number("dimension")?;
    if dimension == 0 {
        return Err(RemarkaError::embedding("header declares dimension 0"));
    }
    if dimension > MAX_DIMENSION {
        return Err(RemarkaError::embedding(format!(
            "header declares dimension {dimension}, above the limit of {MAX_DIMENSION}"
        )));
    }

    Ok((count, dimension))
}

fn read_word<R: BufRead>(reader: &mut R, entry: usize) -> Result<String> {
    let mut bytes = Vec::new();
    reader.read_until(b' ', &mut bytes)?;

    if bytes.pop() != Some(b' ') {
        return Err(RemarkaError::embedding(format!(
            "truncated input: missing word for entry {entry}"
        )));
    }

    // Drop the separator left over from the previous vector.
    let start = bytes.iter().take_while(|&&b| b == b'\n').count();
    String::from_utf8(bytes.split_off(start))
        .map_err(|e| RemarkaError::embedding(format!("word for entry {entry} is not UTF-8: {e}")))
}
