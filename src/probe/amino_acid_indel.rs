//! Amino-acid range indel probes
//!
//! ```text
//! <gene>:[del]<aa><codon>-<aa><codon>[ins<aa...>][ [trans]]/<length>
//! ```
//!
//! The two amino acids name the 1-based codons bounding the affected
//! region. With `del`, the whole region (endpoints included) is deleted
//! and any `ins` peptide replaces it; without `del`, the `ins` peptide is
//! inserted between the endpoints, which are kept. Interior positions of
//! the reference region are the `X` wildcard, so both peptides expand
//! over their full degenerate codon sets.

use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{all_consuming, opt};
use nom::IResult;
use nom::Parser;

use crate::annotation::Annotation;
use crate::error::{CandidateError, ProbeError, Warning};
use crate::probe::parse::{
    amino_acid_code, comment_tail, gene_name, peptide, position, trans_marker, ws,
};
use crate::probe::Probe;
use crate::range::SequenceRange;
use crate::sequence::reverse_translate;
use crate::transcript::Transcript;
use crate::variant::{Buffer, Variant};

/// The parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AminoAcidIndelSpec {
    gene: String,
    deletion: bool,
    left_aa: char,
    /// 1-based codon number of the left endpoint.
    left_codon: u64,
    right_aa: char,
    right_codon: u64,
    /// Inserted peptide; empty for pure deletions.
    insertion: String,
    trans: bool,
    length: u64,
    comment: String,
}

/// A probe for one (reference sequence, mutation sequence) candidate of an
/// amino-acid range indel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AminoAcidIndelProbe {
    ranges: Vec<SequenceRange>,
    gene: String,
    deletion: bool,
    left_aa: char,
    left_codon: u64,
    right_aa: char,
    right_codon: u64,
    insertion: String,
    reference_dna: String,
    mutation_dna: String,
    trans: bool,
    length: u64,
    transcript: String,
    chromosome: String,
    coordinate: u64,
    comment: String,
}

impl AminoAcidIndelProbe {
    pub fn ranges(&self) -> &[SequenceRange] {
        &self.ranges
    }

    /// The reference DNA this candidate expects in the genome.
    pub fn reference_dna(&self) -> &str {
        &self.reference_dna
    }
}

impl std::fmt::Display for AminoAcidIndelProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.gene)?;
        if self.deletion {
            write!(f, "del")?;
        }
        write!(
            f,
            "{}{}-{}{}",
            self.left_aa, self.left_codon, self.right_aa, self.right_codon
        )?;
        if !self.insertion.is_empty() {
            write!(f, "ins{}", self.insertion)?;
        }
        write!(
            f,
            "({}>{}){}/{}_{}_{}:{}{}",
            self.reference_dna,
            self.mutation_dna,
            if self.trans { "[trans]" } else { "" },
            self.length,
            self.transcript,
            self.chromosome,
            self.coordinate,
            self.comment
        )
    }
}

fn statement(input: &str) -> IResult<&str, AminoAcidIndelSpec> {
    let (input, _) = ws(input)?;
    let (input, gene) = gene_name(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, deletion) = opt(tag("del")).parse(input)?;
    let (input, _) = ws(input)?;
    let (input, left_aa) = amino_acid_code(input)?;
    let (input, _) = ws(input)?;
    let (input, left_codon) = position(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('-').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, right_aa) = amino_acid_code(input)?;
    let (input, _) = ws(input)?;
    let (input, right_codon) = position(input)?;
    let (input, _) = ws(input)?;
    let (input, insertion) = opt(|input| {
        let (input, _) = tag("ins").parse(input)?;
        let (input, _) = ws(input)?;
        peptide(input)
    })
    .parse(input)?;
    let (input, trans) = trans_marker(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('/').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, length) = position(input)?;
    let (input, comment) = comment_tail(input)?;
    if deletion.is_none() && insertion.is_none() {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alt,
        )));
    }
    if right_codon <= left_codon {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((
        input,
        AminoAcidIndelSpec {
            gene: gene.to_string(),
            deletion: deletion.is_some(),
            left_aa,
            left_codon,
            right_aa,
            right_codon,
            insertion: insertion.unwrap_or_default().to_string(),
            trans,
            length,
            comment,
        },
    ))
}

/// Parse an amino-acid range indel statement.
pub fn parse(text: &str) -> Result<AminoAcidIndelSpec, ProbeError> {
    match all_consuming(statement).parse(text) {
        Ok((_, spec)) => Ok(spec),
        Err(_) => Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        }),
    }
}

/// The peptide spanning the region: the endpoints joined by one `X`
/// wildcard per interior codon.
fn reference_peptide(spec: &AminoAcidIndelSpec) -> String {
    let gap = (spec.right_codon - spec.left_codon - 1) as usize;
    let mut peptide = String::with_capacity(gap + 2);
    peptide.push(spec.left_aa);
    for _ in 0..gap {
        peptide.push('X');
    }
    peptide.push(spec.right_aa);
    peptide
}

fn mutation_peptide(spec: &AminoAcidIndelSpec) -> String {
    if spec.deletion {
        spec.insertion.clone()
    } else {
        format!("{}{}{}", spec.left_aa, spec.insertion, spec.right_aa)
    }
}

/// The single condensed genomic range covering codons
/// `left_codon..=right_codon` of one transcript.
fn region_index(
    transcript: &Transcript,
    left_codon: u64,
    right_codon: u64,
) -> Result<SequenceRange, CandidateError> {
    let first = 3 * left_codon - 2;
    let end = 3 * right_codon + 1;
    let ranges = transcript.transcript_range(first, end)?;
    match <[SequenceRange; 1]>::try_from(ranges) {
        Ok([range]) => Ok(range),
        Err(_) => Err(CandidateError::DiscontinuousIndelRegion {
            start: first,
            end: end - 1,
            transcript: transcript.name.clone(),
        }),
    }
}

/// Expand an amino-acid range indel statement: the Cartesian product of
/// matching transcripts and the reverse translations of the reference and
/// mutation peptides.
pub fn explode(
    text: &str,
    annotation: &Annotation,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Probe>, ProbeError> {
    let spec = parse(text)?;
    let mutation_pep = mutation_peptide(&spec);
    if spec.length < 3 * mutation_pep.len() as u64 {
        return Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        });
    }
    let reference_dnas = reverse_translate(&reference_peptide(&spec));
    let mutation_dnas = reverse_translate(&mutation_pep);
    let buffer = if spec.trans {
        Buffer::Transcript
    } else {
        Buffer::Genome
    };

    let mut seen: Vec<(SequenceRange, String, String)> = Vec::new();
    let mut probes = Vec::new();
    for transcript in annotation.lookup_gene(&spec.gene) {
        let index = match region_index(transcript, spec.left_codon, spec.right_codon) {
            Ok(index) => index,
            Err(error) => {
                warnings.push(Warning::new(text, Some(&transcript.name), error));
                continue;
            }
        };
        for reference_dna in &reference_dnas {
            for mutation_dna in &mutation_dnas {
                let key = (index.clone(), reference_dna.clone(), mutation_dna.clone());
                if seen.contains(&key) {
                    continue;
                }
                let variant = Variant::new(
                    transcript,
                    index.clone(),
                    reference_dna.clone(),
                    mutation_dna.clone(),
                    spec.length,
                    buffer,
                );
                let ranges = match variant.sequence_ranges() {
                    Ok(ranges) => ranges,
                    Err(error) => {
                        warnings.push(Warning::new(text, Some(&transcript.name), error));
                        continue;
                    }
                };
                seen.push(key);
                probes.push(Probe::AminoAcidIndel(AminoAcidIndelProbe {
                    ranges,
                    gene: spec.gene.clone(),
                    deletion: spec.deletion,
                    left_aa: spec.left_aa,
                    left_codon: spec.left_codon,
                    right_aa: spec.right_aa,
                    right_codon: spec.right_codon,
                    insertion: spec.insertion.clone(),
                    reference_dna: reference_dna.clone(),
                    mutation_dna: mutation_dna.clone(),
                    trans: spec.trans,
                    length: spec.length,
                    transcript: transcript.name.clone(),
                    chromosome: transcript.chromosome.clone(),
                    coordinate: variant.coordinate(),
                    comment: spec.comment.clone(),
                }));
            }
        }
    }
    Ok(probes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::Genome;
    use std::io::Cursor;

    // FROB codons: 1 = "aaa" (K), 2 = "ggg" (G), 3 = "aaa" (K), split
    // across three exons.
    const TABLE: &str = "#name\tchrom\tstrand\tcdsStart\tcdsEnd\texonStarts\texonEnds\tname2\n\
                         FROB\tchr3\t+\t3\t21\t3,12,18,\t6,15,21,\tMNO\n\
                         SOLID\tchr3\t+\t9\t18\t9,\t18,\tPQR\n";

    fn annotation() -> Annotation {
        Annotation::from_reader(Cursor::new(TABLE)).unwrap()
    }

    fn genome() -> Genome {
        Genome::from_pairs([("3", "aaaaaaaaacccgggcccaaaggg")])
    }

    fn select<'a>(probes: &'a [Probe], reference_dna: &str) -> &'a Probe {
        probes
            .iter()
            .find(|probe| match probe {
                Probe::AminoAcidIndel(probe) => probe.reference_dna() == reference_dna,
                _ => false,
            })
            .expect("no probe with that reference sequence")
    }

    #[test]
    fn test_parse_deletion_with_insertion() {
        let spec = parse("EGFR:delE746-A750insP/100").unwrap();
        assert!(spec.deletion);
        assert_eq!(spec.left_aa, 'E');
        assert_eq!(spec.left_codon, 746);
        assert_eq!(spec.right_aa, 'A');
        assert_eq!(spec.right_codon, 750);
        assert_eq!(spec.insertion, "P");
        assert_eq!(spec.length, 100);
    }

    #[test]
    fn test_parse_insertion_only() {
        let spec = parse("MNO:K1-G2insW [trans]/40").unwrap();
        assert!(!spec.deletion);
        assert_eq!(spec.insertion, "W");
        assert!(spec.trans);
    }

    #[test]
    fn test_parse_requires_del_or_ins() {
        assert!(parse("MNO:K1-G2/40").is_err());
    }

    #[test]
    fn test_parse_requires_ascending_codons() {
        assert!(parse("MNO:delG2-K1/40").is_err());
        assert!(parse("MNO:delG2-K2/40").is_err());
    }

    #[test]
    fn test_peptide_construction() {
        let spec = parse("EGFR:delE746-A750insP/100").unwrap();
        assert_eq!(reference_peptide(&spec), "EXXXA");
        assert_eq!(mutation_peptide(&spec), "P");

        let spec = parse("MNO:K1-G2insW/40").unwrap();
        assert_eq!(reference_peptide(&spec), "KG");
        assert_eq!(mutation_peptide(&spec), "KWG");
    }

    #[test]
    fn test_deletion_sequence_on_contiguous_transcript() {
        // SOLID's single exon holds codons "ccc", "ggg", "ccc" at [9, 18).
        let mut warnings = Vec::new();
        let probes = explode("PQR:delP1-G2/8", &annotation(), &mut warnings).unwrap();
        // Select the candidate spelled the way the genome spells it.
        let probe = select(&probes, "CCCGGG");
        assert_eq!(probe.to_string(), "PQR:delP1-G2(CCCGGG>)/8_SOLID_3:10");
        assert_eq!(probe.sequence(&genome()).unwrap(), "aaaaccca");
    }

    #[test]
    fn test_insertion_between_codons() {
        let mut warnings = Vec::new();
        let probes = explode("PQR:P1-G2insM/12", &annotation(), &mut warnings).unwrap();
        // Endpoints are kept: the region is replaced by P + M + G codons.
        let probe = select(&probes, "CCCGGG");
        let sequence = probe.sequence(&genome()).unwrap();
        assert_eq!(sequence.len(), 12);
        assert!(probe.to_string().starts_with("PQR:P1-G2insM(CCCGGG>"));
    }

    #[test]
    fn test_region_split_across_junction_warns() {
        let mut warnings = Vec::new();
        let probes = explode("MNO:delK1-G2/8", &annotation(), &mut warnings).unwrap();
        assert!(probes.is_empty());
        assert!(warnings
            .iter()
            .any(|warning| matches!(warning.error, CandidateError::DiscontinuousIndelRegion { .. })));
    }

    #[test]
    fn test_expansion_cardinality() {
        // Reference KG: 2 x 4 codons; mutation empty: 1.
        let mut warnings = Vec::new();
        let probes = explode("PQR:delP1-G2/8", &annotation(), &mut warnings).unwrap();
        assert_eq!(probes.len(), 16);
    }

    #[test]
    fn test_length_shorter_than_mutation_is_invalid() {
        let mut warnings = Vec::new();
        assert!(matches!(
            explode("PQR:P1-G2insM/6", &annotation(), &mut warnings),
            Err(ProbeError::InvalidStatement { .. })
        ));
    }
}
