use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use mmr_core::errors::{codes, ErrorInfo, MmrError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Public source of the numbered asteroid catalog.
pub const ASTDYS_CATALOG_URL: &str = "http://hamilton.dm.unipi.it/~astdys2/catalogs/allnum.cat";

const MIN_NUMERIC_FIELDS: usize = 7;

fn io_error(code: &str, path: &Path, err: impl ToString) -> MmrError {
    MmrError::Catalog(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

fn malformed(number: usize, message: impl Into<String>) -> MmrError {
    MmrError::Catalog(
        ErrorInfo::new(codes::MALFORMED_CATALOG_ENTRY, message)
            .with_context("number", number.to_string()),
    )
}

/// Osculating elements of a catalog entry.
///
/// The catalog stores the ascending node before the argument of perihelion;
/// the two columns are swapped on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogElements {
    /// Epoch of osculation (MJD).
    pub epoch: f64,
    /// Semi-major axis (AU).
    pub axis: f64,
    /// Eccentricity.
    pub eccentricity: f64,
    /// Inclination (degrees).
    pub inclination: f64,
    /// Argument of perihelion (degrees).
    pub perihelion_argument: f64,
    /// Longitude of the ascending node (degrees).
    pub ascending_node: f64,
    /// Mean anomaly (degrees).
    pub mean_anomaly: f64,
    /// Remaining numeric columns, kept in file order.
    #[serde(default)]
    pub extra: Vec<f64>,
}

impl CatalogElements {
    fn from_values(mut values: Vec<f64>) -> Self {
        values.swap(4, 5);
        let extra = values.split_off(MIN_NUMERIC_FIELDS);
        Self {
            epoch: values[0],
            axis: values[1],
            eccentricity: values[2],
            inclination: values[3],
            perihelion_argument: values[4],
            ascending_node: values[5],
            mean_anomaly: values[6],
            extra,
        }
    }
}

/// One asteroid of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Sequential number, the first data line being 1.
    pub number: usize,
    /// Name as written between apostrophes.
    pub name: String,
    /// Orbital elements.
    pub elements: CatalogElements,
}

impl CatalogEntry {
    /// Name used for integrator output files and resonance participants.
    pub fn body_name(&self) -> String {
        format!("A{}", self.name)
    }

    /// Semi-major axis from the catalog.
    pub fn axis(&self) -> f64 {
        self.elements.axis
    }
}

/// Parses a single catalog line.
pub fn parse_entry(line: &str, number: usize) -> Result<CatalogEntry, MmrError> {
    let line = line.trim_end();
    let close = line
        .get(1..)
        .and_then(|rest| rest.find('\''))
        .map(|pos| pos + 1)
        .ok_or_else(|| malformed(number, format!("no apostrophe in {line}")))?;
    let name = &line[1..close];
    if name.chars().any(char::is_whitespace) {
        return Err(malformed(
            number,
            format!("asteroid's name contains spaces {name}"),
        ));
    }
    let values = line[close + 1..]
        .split_whitespace()
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|err| malformed(number, format!("bad value {field}: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() < MIN_NUMERIC_FIELDS {
        return Err(malformed(
            number,
            format!(
                "expected at least {MIN_NUMERIC_FIELDS} numeric fields, found {}",
                values.len()
            ),
        ));
    }
    Ok(CatalogEntry {
        number,
        name: name.to_string(),
        elements: CatalogElements::from_values(values),
    })
}

/// Sequential reader over the numbered asteroid catalog.
#[derive(Debug, Clone)]
pub struct CatalogReader {
    path: PathBuf,
    skip_lines: usize,
}

impl CatalogReader {
    /// Opens the catalog, failing when the file does not exist.
    pub fn open(path: impl Into<PathBuf>, skip_lines: usize) -> Result<Self, MmrError> {
        let path = path.into();
        if !path.is_file() {
            return Err(MmrError::Catalog(
                ErrorInfo::new(codes::MISSING_INPUT_FILE, "asteroid catalog not found")
                    .with_context("path", path.display().to_string())
                    .with_hint(format!("download it from {ASTDYS_CATALOG_URL}")),
            ));
        }
        Ok(Self { path, skip_lines })
    }

    fn lines(&self) -> Result<Lines<BufReader<File>>, MmrError> {
        let file =
            File::open(&self.path).map_err(|err| io_error("catalog-open", &self.path, err))?;
        Ok(BufReader::new(file).lines())
    }

    /// Returns the header lines preceding the data.
    pub fn header(&self) -> Result<Vec<String>, MmrError> {
        self.lines()?
            .take(self.skip_lines)
            .map(|line| line.map_err(|err| io_error("catalog-read", &self.path, err)))
            .collect()
    }

    /// Iterates over entries with numbers in `[start, stop)`.
    pub fn entries(
        &self,
        start: Option<usize>,
        stop: Option<usize>,
    ) -> Result<CatalogEntries, MmrError> {
        Ok(CatalogEntries {
            lines: self.lines()?,
            path: self.path.clone(),
            index: 0,
            skip_lines: self.skip_lines,
            start: start.unwrap_or(1),
            stop,
        })
    }

    /// Looks an asteroid up by its sequential number.
    pub fn find_by_number(&self, number: usize) -> Result<CatalogEntry, MmrError> {
        self.entries(Some(number), Some(number + 1))?
            .next()
            .unwrap_or_else(|| {
                Err(MmrError::Catalog(
                    ErrorInfo::new("catalog-lookup", "asteroid number beyond catalog end")
                        .with_context("number", number.to_string())
                        .with_context("path", self.path.display().to_string()),
                ))
            })
    }

    /// Groups well formed entries of `[start, stop)` into number ranges of `size`.
    ///
    /// Malformed entries are logged and skipped.
    pub fn batches(
        &self,
        size: usize,
        start: Option<usize>,
        stop: Option<usize>,
    ) -> Result<CatalogBatches, MmrError> {
        let start = start.unwrap_or(1);
        Ok(CatalogBatches {
            entries: self.entries(Some(start), stop)?,
            size: size.max(1),
            start,
            stop,
            carry: None,
            done: false,
        })
    }
}

/// Iterator returned by [`CatalogReader::entries`].
pub struct CatalogEntries {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    index: usize,
    skip_lines: usize,
    start: usize,
    stop: Option<usize>,
}

impl Iterator for CatalogEntries {
    type Item = Result<CatalogEntry, MmrError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(io_error("catalog-read", &self.path, err))),
            };
            let index = self.index;
            self.index += 1;
            if index < self.skip_lines {
                continue;
            }
            let number = index - self.skip_lines + 1;
            if number < self.start {
                continue;
            }
            if self.stop.is_some_and(|stop| number >= stop) {
                return None;
            }
            return Some(parse_entry(&line, number));
        }
    }
}

/// Entries of one contiguous number range.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogBatch {
    /// Zero based batch index.
    pub index: usize,
    /// First asteroid number of the range.
    pub start: usize,
    /// Exclusive upper bound of the range.
    pub stop: usize,
    /// Well formed entries inside the range.
    pub entries: Vec<CatalogEntry>,
}

/// Iterator returned by [`CatalogReader::batches`].
pub struct CatalogBatches {
    entries: CatalogEntries,
    size: usize,
    start: usize,
    stop: Option<usize>,
    carry: Option<CatalogEntry>,
    done: bool,
}

impl CatalogBatches {
    fn batch_index(&self, number: usize) -> usize {
        (number - self.start) / self.size
    }

    fn finish(&self, index: usize, entries: Vec<CatalogEntry>) -> CatalogBatch {
        let start = self.start + index * self.size;
        let mut stop = start + self.size;
        if let Some(limit) = self.stop {
            stop = stop.min(limit);
        }
        CatalogBatch {
            index,
            start,
            stop,
            entries,
        }
    }
}

impl Iterator for CatalogBatches {
    type Item = Result<CatalogBatch, MmrError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut current: Option<(usize, Vec<CatalogEntry>)> = self
            .carry
            .take()
            .map(|entry| (self.batch_index(entry.number), vec![entry]));
        loop {
            match self.entries.next() {
                None => {
                    self.done = true;
                    return current.map(|(index, entries)| Ok(self.finish(index, entries)));
                }
                Some(Err(err)) if err.code() == codes::MALFORMED_CATALOG_ENTRY => {
                    warn!("skipping catalog entry: {err}");
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                Some(Ok(entry)) => {
                    let index = self.batch_index(entry.number);
                    match current.as_mut() {
                        None => current = Some((index, vec![entry])),
                        Some((current_index, entries)) if *current_index == index => {
                            entries.push(entry)
                        }
                        Some(_) => {
                            self.carry = Some(entry);
                            return current.map(|(index, entries)| Ok(self.finish(index, entries)));
                        }
                    }
                }
            }
        }
    }
}
