// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! probegen: probe statements to synthesis-ready sequences
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Resolves compact, human-authored "probe statements" (point mutations,
//! indels, amino-acid substitutions, exon fusions, raw coordinate pairs)
//! against a UCSC gene-annotation table and an in-memory reference genome,
//! producing one nucleotide sequence per surviving candidate.
//!
//! # Example
//!
//! ```
//! use probegen::{probe, Annotation, Genome};
//!
//! let genome = Genome::from_pairs([("1", "acgtacgt")]);
//! let annotation = Annotation::from_reader(std::io::Cursor::new(
//!     "#name\tchrom\tstrand\tcdsStart\tcdsEnd\texonStarts\texonEnds\tname2\n\
//!      FOO\tchr1\t+\t1\t2\t1,\t2,\tABC\n",
//! ))
//! .unwrap();
//!
//! // Expand a transcript-relative point mutation into concrete probes.
//! let mut warnings = Vec::new();
//! let probes = probe::explode("ABC:c.1c>t/4", &annotation, &mut warnings).unwrap();
//!
//! assert_eq!(probes[0].to_string(), "ABC:c.1c>t/4_FOO_1:2");
//! assert_eq!(probes[0].sequence(&genome).unwrap(), "atgt");
//! ```

pub mod annotation;
pub mod error;
pub mod genome;
pub mod probe;
pub mod range;
pub mod run;
pub mod sequence;
pub mod transcript;
pub mod variant;

// Re-export commonly used types
pub use annotation::Annotation;
pub use error::{CandidateError, ProbeError, Warning};
pub use genome::Genome;
pub use probe::Probe;
pub use range::SequenceRange;
pub use transcript::{Strand, Transcript};
pub use variant::{Buffer, Variant};

/// Result type alias for probegen operations
pub type Result<T> = std::result::Result<T, ProbeError>;
