//! Reference genome loading and slicing
//!
//! The genome is a multi-FASTA file held fully in memory: each record
//! header's first whitespace-delimited token (after `>`) becomes the
//! chromosome key, and sequence lines are concatenated verbatim with their
//! case preserved. The loaded genome is read-only for the rest of the run.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;

use crate::error::{CandidateError, ProbeError};
use crate::range::SequenceRange;

/// An in-memory reference genome: chromosome name to base-pair sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genome {
    chromosomes: HashMap<String, String>,
}

impl Genome {
    /// Parse a multi-FASTA stream.
    ///
    /// Fails with [`ProbeError::InvalidGenomeFile`] when sequence content
    /// appears before the first header or when the stream holds no records
    /// at all.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ProbeError> {
        let mut chromosomes: HashMap<String, String> = HashMap::new();
        let mut current: Option<String> = None;
        for line in reader.lines() {
            let line = line?;
            if let Some(header) = line.strip_prefix('>') {
                let name = header
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| ProbeError::InvalidGenomeFile {
                        msg: "record header carries no sequence name".to_string(),
                    })?
                    .to_string();
                debug!("reading chromosome {name:?}");
                chromosomes.entry(name.clone()).or_default();
                current = Some(name);
            } else {
                match &current {
                    Some(name) => chromosomes
                        .get_mut(name)
                        .expect("current chromosome is present")
                        .push_str(line.trim_end()),
                    None => {
                        return Err(ProbeError::InvalidGenomeFile {
                            msg: format!("could not parse input: {line:?}"),
                        })
                    }
                }
            }
        }
        if chromosomes.is_empty() {
            return Err(ProbeError::InvalidGenomeFile {
                msg: "genome file is empty".to_string(),
            });
        }
        Ok(Self { chromosomes })
    }

    /// Load a genome from a FASTA file, transparently decompressing
    /// gzipped input by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProbeError> {
        Self::from_reader(open_text(path.as_ref())?)
    }

    /// Build a genome directly from chromosome/sequence pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            chromosomes: pairs
                .into_iter()
                .map(|(name, bases)| (name.into(), bases.into()))
                .collect(),
        }
    }

    /// The bases of `chromosome` over the 0-based half-open interval
    /// `[start, end)`.
    pub fn bases(&self, chromosome: &str, start: u64, end: u64) -> Result<&str, CandidateError> {
        let sequence =
            self.chromosomes
                .get(chromosome)
                .ok_or_else(|| CandidateError::MissingChromosome {
                    chromosome: chromosome.to_string(),
                })?;
        if start > end {
            return Err(CandidateError::NonContainedRange {
                chromosome: chromosome.to_string(),
                start,
                end,
            });
        }
        sequence
            .get(start as usize..end as usize)
            .ok_or(CandidateError::NonContainedRange {
                chromosome: chromosome.to_string(),
                start,
                end,
            })
    }

    /// The bases covered by a [`SequenceRange`], ignoring its tags.
    pub fn range_bases(&self, range: &SequenceRange) -> Result<&str, CandidateError> {
        self.bases(&range.chromosome, range.start, range.end)
    }
}

/// Open a text file for buffered reading, decompressing `.gz` paths.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>, ProbeError> {
    let file = File::open(path).map_err(|err| ProbeError::Io {
        msg: format!("cannot open {}: {err}", path.display()),
    })?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}
