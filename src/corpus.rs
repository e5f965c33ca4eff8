//! Plain-text persistence of stage directions.
//!
//! Each play is stored as `<folder>/<play_id>.txt` with one direction per
//! line. Raw directions are stored verbatim; processed directions store
//! their tokens separated by single spaces.

pub mod dataset;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::debug;

use crate::direction::Direction;
use crate::error::Result;

fn play_path(folder: &Path, play_id: &str) -> PathBuf {
    folder.join(format!("{play_id}.txt"))
}

/// Write the directions of one play, creating `folder` if needed.
pub fn save_directions<P, S>(folder: P, play_id: &str, directions: &[S]) -> Result<PathBuf>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let folder = folder.as_ref();
    fs::create_dir_all(folder)?;

    let path = play_path(folder, play_id);
    let lines: Vec<&str> = directions.iter().map(AsRef::<str>::as_ref).collect();
    fs::write(&path, lines.join("\n"))?;

    debug!("Saved {} directions to {}", directions.len(), path.display());
    Ok(path)
}

/// Read the directions of one play back.
///
/// The file is split on `\n`, so an empty file yields a single empty
/// direction. A missing or unreadable file names the play in the error.
pub fn load_directions<P: AsRef<Path>>(folder: P, play_id: &str) -> Result<Vec<String>> {
    let path = play_path(folder.as_ref(), play_id);
    let content = fs::read_to_string(&path).with_context(|| {
        format!(
            "cannot read directions of play '{play_id}' from {}",
            path.display()
        )
    })?;
    Ok(content.split('\n').map(str::to_string).collect())
}

/// Write tokenized directions, one per line, tokens joined by spaces.
pub fn save_token_directions<P: AsRef<Path>>(
    folder: P,
    play_id: &str,
    directions: &[Direction],
) -> Result<PathBuf> {
    let lines: Vec<String> = directions
        .iter()
        .map(|direction| direction.tokens().join(" "))
        .collect();
    save_directions(folder, play_id, &lines)
}

/// Read tokenized directions written by [`save_token_directions`].
pub fn load_token_directions<P: AsRef<Path>>(folder: P, play_id: &str) -> Result<Vec<Direction>> {
    Ok(load_directions(folder, play_id)?
        .iter()
        .map(|line| line.split_whitespace().collect())
        .collect())
}
