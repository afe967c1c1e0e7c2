use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mineboard_core::GameConfig;

const FILE_PREFIX: &str = "LegendList_";
const TEST_PREFIX: &str = "[TEST]";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub secs: u32,
}

/// Append-only best-time lists, one text file per board configuration.
#[derive(Clone, Debug)]
pub struct Leaderboard {
    dir: PathBuf,
}

impl Leaderboard {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, config: &GameConfig) -> PathBuf {
        self.dir.join(format!(
            "{}{}x{}_{}.txt",
            FILE_PREFIX,
            config.rows(),
            config.cols(),
            config.mines()
        ))
    }

    pub fn add_record(&self, config: &GameConfig, name: &str, secs: u32) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating records directory {}", self.dir.display()))?;

        let path = self.path_for(config);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        writeln!(file, "{},{}", name, secs).with_context(|| format!("writing {}", path.display()))?;

        log::info!("Recorded {} in {}s to {}", name, secs, path.display());
        Ok(())
    }

    /// Records sorted by time, fastest first. A missing file is an empty list.
    pub fn records(&self, config: &GameConfig) -> Result<Vec<Record>> {
        let path = self.path_for(config);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
        };

        let mut records: Vec<_> = contents
            .lines()
            .filter_map(|line| {
                let record = parse_record(line);
                if record.is_none() && !line.trim().is_empty() {
                    log::warn!("Skipping malformed record {:?} in {}", line, path.display());
                }
                record
            })
            .collect();
        records.sort_by_key(|record| record.secs);
        Ok(records)
    }
}

fn parse_record(line: &str) -> Option<Record> {
    let mut parts = line.split(',');
    let (Some(name), Some(secs), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    Some(Record {
        name: name.to_string(),
        secs: secs.trim().parse().ok()?,
    })
}

/// Name as stored: trimmed, separators replaced, forced wins tagged.
/// Empty names are not recorded.
pub fn record_name(name: &str, forced: bool) -> Option<String> {
    let name: String = name
        .trim()
        .chars()
        .map(|c| if c == ',' || c.is_control() { ' ' } else { c })
        .collect();
    if name.is_empty() {
        return None;
    }
    Some(if forced {
        format!("{}{}", TEST_PREFIX, name)
    } else {
        name
    })
}
