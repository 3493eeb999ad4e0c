//! Genome-coordinate point-mutation probes
//!
//! ```text
//! <chr>:<pos><ref>><mut>/<length>
//! ```
//!
//! `<pos>` is 1-based. Either base may be the `*` wildcard: a wildcard
//! reference disables reference checking; a wildcard mutation expands to
//! each base other than the stated reference.

use nom::character::complete::{char, one_of};
use nom::combinator::all_consuming;
use nom::IResult;
use nom::Parser;

use crate::error::{CandidateError, ProbeError, Warning};
use crate::probe::parse::{chromosome_name, comment_tail, position, ws};
use crate::probe::Probe;
use crate::range::SequenceRange;

/// The parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeSnpSpec {
    chromosome: String,
    /// 1-based position of the mutated base.
    position: u64,
    /// `None` for the `*` wildcard.
    reference: Option<char>,
    /// `None` for the `*` wildcard.
    mutation: Option<char>,
    length: u64,
    comment: String,
}

/// A probe for a single-nucleotide mutation at an absolute coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeSnpProbe {
    ranges: Vec<SequenceRange>,
    chromosome: String,
    position: u64,
    /// The reference as written, `*` included.
    reference: char,
    /// The concrete mutation base of this candidate.
    mutation: char,
    length: u64,
    comment: String,
}

impl GenomeSnpProbe {
    pub fn ranges(&self) -> &[SequenceRange] {
        &self.ranges
    }
}

impl std::fmt::Display for GenomeSnpProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}{}>{}/{}{}",
            self.chromosome, self.position, self.reference, self.mutation, self.length,
            self.comment
        )
    }
}

fn base_or_glob(input: &str) -> IResult<&str, Option<char>> {
    let (input, c) = one_of("ACGTacgt*").parse(input)?;
    Ok((input, (c != '*').then_some(c)))
}

fn statement(input: &str) -> IResult<&str, GenomeSnpSpec> {
    let (input, _) = ws(input)?;
    let (input, chromosome) = chromosome_name(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, pos) = position(input)?;
    let (input, _) = ws(input)?;
    let (input, reference) = base_or_glob(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('>').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, mutation) = base_or_glob(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('/').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, length) = position(input)?;
    let (input, comment) = comment_tail(input)?;
    Ok((
        input,
        GenomeSnpSpec {
            chromosome: chromosome.to_string(),
            position: pos,
            reference,
            mutation,
            length,
            comment,
        },
    ))
}

/// Parse a genome point-mutation statement.
pub fn parse(text: &str) -> Result<GenomeSnpSpec, ProbeError> {
    match all_consuming(statement).parse(text) {
        Ok((_, spec)) => Ok(spec),
        Err(_) => Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        }),
    }
}

/// Expand a genome point-mutation statement.
///
/// A concrete mutation yields one candidate; the `*` wildcard yields one
/// candidate per base other than the stated reference.
pub fn explode(text: &str, warnings: &mut Vec<Warning>) -> Result<Vec<Probe>, ProbeError> {
    let spec = parse(text)?;
    let candidates: Vec<char> = match spec.mutation {
        Some(base) => vec![base],
        None => ['A', 'C', 'G', 'T']
            .into_iter()
            .filter(|base| {
                spec.reference
                    .is_none_or(|reference| !reference.eq_ignore_ascii_case(base))
            })
            .collect(),
    };

    let mut probes = Vec::with_capacity(candidates.len());
    for mutation in candidates {
        match build(&spec, mutation) {
            Ok(probe) => probes.push(Probe::GenomeSnp(probe)),
            Err(error) => warnings.push(Warning::new(text, None, error)),
        }
    }
    Ok(probes)
}

fn build(spec: &GenomeSnpSpec, mutation: char) -> Result<GenomeSnpProbe, CandidateError> {
    let site = spec.position - 1;
    let budget = spec.length - 1;
    let left = budget / 2;
    let right = budget - left;
    let left_start = site
        .checked_sub(left)
        .ok_or(CandidateError::NonContainedRange {
            chromosome: spec.chromosome.clone(),
            start: 0,
            end: site,
        })?;
    let ranges = vec![
        SequenceRange::new(&spec.chromosome, left_start, site),
        SequenceRange::with_tags(
            &spec.chromosome,
            site,
            site + 1,
            false,
            spec.reference.map(String::from),
            Some(mutation.to_string()),
        ),
        SequenceRange::new(&spec.chromosome, site + 1, site + 1 + right),
    ];
    Ok(GenomeSnpProbe {
        ranges,
        chromosome: spec.chromosome.clone(),
        position: spec.position,
        reference: spec.reference.unwrap_or('*'),
        mutation,
        length: spec.length,
        comment: spec.comment.clone(),
    })
}
