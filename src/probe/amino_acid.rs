//! Amino-acid substitution probes
//!
//! ```text
//! <gene>:<aa><codon><aa>[ [trans]]/<length>
//! ```
//!
//! Both amino acids expand to their full degenerate codon sets; the
//! mutation position additionally accepts the `X` wildcard ("any codon").
//! Mutation codons that still encode the reference amino acid are
//! excluded: a mutation must change the protein.

use nom::character::complete::char;
use nom::combinator::all_consuming;
use nom::IResult;
use nom::Parser;

use crate::annotation::Annotation;
use crate::error::{ProbeError, Warning};
use crate::probe::parse::{
    amino_acid_code, comment_tail, gene_name, mutation_amino_acid_code, position, trans_marker, ws,
};
use crate::probe::Probe;
use crate::range::SequenceRange;
use crate::sequence::{amino_acid, codons_for};
use crate::variant::{Buffer, Variant};

/// The parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AminoAcidSpec {
    gene: String,
    reference: char,
    /// 1-based codon number.
    codon: u64,
    mutation: char,
    trans: bool,
    length: u64,
    comment: String,
}

/// A probe for one (reference codon, mutation codon) candidate of an
/// amino-acid substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AminoAcidProbe {
    ranges: Vec<SequenceRange>,
    gene: String,
    reference: char,
    codon: u64,
    mutation: char,
    reference_codon: &'static str,
    mutation_codon: &'static str,
    trans: bool,
    length: u64,
    transcript: String,
    chromosome: String,
    coordinate: u64,
    comment: String,
}

impl AminoAcidProbe {
    pub fn ranges(&self) -> &[SequenceRange] {
        &self.ranges
    }

    /// The reference codon this candidate expects in the genome.
    pub fn reference_codon(&self) -> &str {
        self.reference_codon
    }
}

impl std::fmt::Display for AminoAcidProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}{}{}({}>{}){}/{}_{}_{}:{}{}",
            self.gene,
            self.reference,
            self.codon,
            self.mutation,
            self.reference_codon,
            self.mutation_codon,
            if self.trans { "[trans]" } else { "" },
            self.length,
            self.transcript,
            self.chromosome,
            self.coordinate,
            self.comment
        )
    }
}

fn statement(input: &str) -> IResult<&str, AminoAcidSpec> {
    let (input, _) = ws(input)?;
    let (input, gene) = gene_name(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, reference) = amino_acid_code(input)?;
    let (input, _) = ws(input)?;
    let (input, codon) = position(input)?;
    let (input, _) = ws(input)?;
    let (input, mutation) = mutation_amino_acid_code(input)?;
    let (input, trans) = trans_marker(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('/').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, length) = position(input)?;
    let (input, comment) = comment_tail(input)?;
    Ok((
        input,
        AminoAcidSpec {
            gene: gene.to_string(),
            reference,
            codon,
            mutation,
            trans,
            length,
            comment,
        },
    ))
}

/// Parse an amino-acid substitution statement.
pub fn parse(text: &str) -> Result<AminoAcidSpec, ProbeError> {
    match all_consuming(statement).parse(text) {
        Ok((_, spec)) => Ok(spec),
        Err(_) => Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        }),
    }
}

/// Expand an amino-acid substitution statement: the Cartesian product of
/// matching transcripts, reference codons, and non-synonymous mutation
/// codons, deduplicated first-wins on (codon location, reference codon,
/// mutation codon).
pub fn explode(
    text: &str,
    annotation: &Annotation,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Probe>, ProbeError> {
    let spec = parse(text)?;
    if spec.length < 3 {
        return Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        });
    }
    let reference_aa = spec.reference.to_ascii_uppercase();
    let reference_codons = codons_for(spec.reference).expect("grammar admits known amino acids");
    let mutation_codons: Vec<&'static str> = codons_for(spec.mutation)
        .expect("grammar admits known amino acids")
        .iter()
        .filter(|codon| amino_acid(codon) != Some(reference_aa))
        .copied()
        .collect();

    let buffer = if spec.trans {
        Buffer::Transcript
    } else {
        Buffer::Genome
    };

    let mut seen: Vec<(SequenceRange, &str, &str)> = Vec::new();
    let mut probes = Vec::new();
    for transcript in annotation.lookup_gene(&spec.gene) {
        let index = match transcript.codon_index(spec.codon, None, None) {
            Ok(index) => index,
            Err(error) => {
                warnings.push(Warning::new(text, Some(&transcript.name), error));
                continue;
            }
        };
        for &reference_codon in reference_codons {
            for &mutation_codon in &mutation_codons {
                let key = (index.clone(), reference_codon, mutation_codon);
                if seen.contains(&key) {
                    continue;
                }
                let variant = Variant::new(
                    transcript,
                    index.clone(),
                    reference_codon,
                    mutation_codon,
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
                probes.push(Probe::AminoAcid(AminoAcidProbe {
                    ranges,
                    gene: spec.gene.clone(),
                    reference: spec.reference,
                    codon: spec.codon,
                    mutation: spec.mutation,
                    reference_codon,
                    mutation_codon,
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

    const TABLE: &str = "#name\tchrom\tstrand\tcdsStart\tcdsEnd\texonStarts\texonEnds\tname2\n\
                         BAZ\tchr3\t-\t10\t24\t10,21,\t15,24,\tGHI\n\
                         FROB\tchr3\t+\t3\t21\t3,12,18,\t6,15,21,\tMNO\n";

    fn annotation() -> Annotation {
        Annotation::from_reader(Cursor::new(TABLE)).unwrap()
    }

    fn genome() -> Genome {
        Genome::from_pairs([("3", "aaaaaaaaacccgggcccaaaggg")])
    }

    fn select<'a>(probes: &'a [Probe], reference_codon: &str) -> &'a Probe {
        probes
            .iter()
            .find(|probe| match probe {
                Probe::AminoAcid(probe) => probe.reference_codon() == reference_codon,
                _ => false,
            })
            .expect("no probe with that reference codon")
    }

    #[test]
    fn test_parse_statement() {
        let spec = parse("GHI: P2M /9").unwrap();
        assert_eq!(spec.gene, "GHI");
        assert_eq!(spec.reference, 'P');
        assert_eq!(spec.codon, 2);
        assert_eq!(spec.mutation, 'M');
        assert!(!spec.trans);
        assert_eq!(spec.length, 9);
    }

    #[test]
    fn test_parse_rejects_wildcard_reference() {
        assert!(parse("GHI:X2M/9").is_err());
        assert!(parse("GHI:M2X/9").is_ok());
    }

    #[test]
    fn test_parse_rejects_other_grammars() {
        assert!(parse("GHI:c.1c>t/4").is_err());
        assert!(parse("GHI:delE7-A7insP/9").is_err());
    }

    #[test]
    fn test_minus_strand_sequence() {
        let mut warnings = Vec::new();
        let probes = explode("GHI: P2M /9", &annotation(), &mut warnings).unwrap();
        let probe = select(&probes, "CCC");
        assert_eq!(probe.sequence(&genome()).unwrap(), "cccCATccc");
        assert_eq!(probe.to_string(), "GHI:P2M(CCC>ATG)/9_BAZ_3:13");
    }

    #[test]
    fn test_minus_strand_even_length() {
        let mut warnings = Vec::new();
        let probes = explode("GHI: P2M /8", &annotation(), &mut warnings).unwrap();
        let probe = select(&probes, "CCC");
        assert_eq!(probe.sequence(&genome()).unwrap(), "ccCATccc");
    }

    #[test]
    fn test_transcript_buffered_plus_strand_sequence() {
        let mut warnings = Vec::new();
        let probes = explode("MNO: G2M [trans]/9", &annotation(), &mut warnings).unwrap();
        let probe = select(&probes, "GGG");
        // Flanks come from the neighboring exons across the introns.
        assert_eq!(probe.sequence(&genome()).unwrap(), "aaaATGaaa");
        assert_eq!(probe.to_string(), "MNO:G2M(GGG>ATG)[trans]/9_FROB_3:13");
    }

    #[test]
    fn test_expansion_counts() {
        let annotation = annotation();
        let mut warnings = Vec::new();
        let count = |statement: &str, warnings: &mut Vec<Warning>| {
            explode(statement, &annotation, warnings).unwrap().len()
        };
        assert_eq!(count("GHI: M2W /9", &mut warnings), 1);
        assert_eq!(count("GHI: M2* /9", &mut warnings), 3);
        assert_eq!(count("GHI: L2* /9", &mut warnings), 18);
        // X is every codon except the one still encoding methionine.
        assert_eq!(count("GHI: M2X /9", &mut warnings), 63);
    }

    #[test]
    fn test_synonymous_mutation_yields_no_probes() {
        let mut warnings = Vec::new();
        let probes = explode("GHI: M2M /9", &annotation(), &mut warnings).unwrap();
        assert!(probes.is_empty());
    }

    #[test]
    fn test_codon_out_of_range_warns_once_per_transcript() {
        let mut warnings = Vec::new();
        let probes = explode("GHI: M9W /9", &annotation(), &mut warnings).unwrap();
        assert!(probes.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_mismatched_reference_codons_fail_at_resolution() {
        let mut warnings = Vec::new();
        let probes = explode("GHI: M2W /9", &annotation(), &mut warnings).unwrap();
        // The genome holds a proline codon at position 2, not ATG.
        assert!(probes[0].sequence(&genome()).is_err());
    }
}
