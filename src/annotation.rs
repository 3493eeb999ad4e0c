//! UCSC annotation tables
//!
//! Annotation files can be downloaded from the UCSC table browser using
//! the output format "all fields from selected table". The parser is
//! header-driven: the first line must be a `#`-prefixed, tab-delimited
//! list of column names, and every subsequent row is keyed by it.
//!
//! Currently supported tables are RefSeq Genes (`name2` gene ids) and
//! UCSC Genes (`proteinID` gene ids).

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use log::debug;

use crate::error::ProbeError;
use crate::genome::open_text;
use crate::transcript::Transcript;

/// The combined, read-only set of transcripts from one or more annotation
/// files, in input order.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    transcripts: Vec<Transcript>,
}

impl Annotation {
    /// Parse one UCSC gene table from a stream and append its rows.
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<(), ProbeError> {
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(ProbeError::InvalidAnnotationFile {
                    msg: "annotation file is empty".to_string(),
                })
            }
        };
        let header = header
            .strip_prefix('#')
            .ok_or_else(|| ProbeError::InvalidAnnotationFile {
                msg: "annotation file does not start with a '#' header line".to_string(),
            })?;
        let columns: Vec<&str> = header.split('\t').collect();

        for (number, line) in lines.enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != columns.len() {
                return Err(ProbeError::InvalidAnnotationFile {
                    msg: format!(
                        "row {} has {} fields, header names {}",
                        number + 2,
                        fields.len(),
                        columns.len()
                    ),
                });
            }
            let row: HashMap<String, String> = columns
                .iter()
                .zip(&fields)
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect();
            self.transcripts.push(Transcript::from_row(&row)?);
        }
        debug!("annotation now holds {} transcripts", self.transcripts.len());
        Ok(())
    }

    /// Parse a single annotation table from a stream.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ProbeError> {
        let mut annotation = Self::default();
        annotation.extend_from_reader(reader)?;
        Ok(annotation)
    }

    /// Load and concatenate annotation files, transparently decompressing
    /// gzipped input by extension.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ProbeError> {
        let mut annotation = Self::default();
        for path in paths {
            annotation.extend_from_reader(open_text(path.as_ref())?)?;
        }
        Ok(annotation)
    }

    /// All transcripts whose gene id matches, preserving input order.
    pub fn lookup_gene<'a>(&'a self, gene: &'a str) -> impl Iterator<Item = &'a Transcript> {
        self.transcripts
            .iter()
            .filter(move |transcript| transcript.gene_id == gene)
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }
}
