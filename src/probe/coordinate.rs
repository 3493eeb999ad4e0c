//! Coordinate-pair fusion probes
//!
//! Statements name two breakpoints directly, with no annotation lookup:
//!
//! ```text
//! <chr>:<pos>(+|-)<n>/<chr>:<pos>(+|-)<n>
//! ```
//!
//! `<pos>` is 1-based; `+` keeps the `n` bases starting at the position
//! (the junction precedes them), `-` keeps the `n` bases ending at it.

use nom::character::complete::{char, one_of};
use nom::combinator::all_consuming;
use nom::IResult;
use nom::Parser;

use crate::error::ProbeError;
use crate::probe::parse::{chromosome_name, comment_tail, position, ws};
use crate::probe::{breakpoint, flip, Probe, Side};
use crate::range::SequenceRange;
use crate::transcript::Strand;

/// One parsed half of a coordinate statement.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HalfSpec {
    chromosome: String,
    /// 1-based anchor position.
    position: u64,
    side: Side,
    bases: u64,
}

/// The parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateSpec {
    first: HalfSpec,
    second: HalfSpec,
    comment: String,
}

/// A probe fusing two directly-specified genomic ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateProbe {
    ranges: Vec<SequenceRange>,
    breakpoint1: (String, u64),
    breakpoint2: (String, u64),
    comment: String,
}

impl CoordinateProbe {
    pub fn ranges(&self) -> &[SequenceRange] {
        &self.ranges
    }
}

impl std::fmt::Display for CoordinateProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}/{}:{}{}",
            self.breakpoint1.0, self.breakpoint1.1, self.breakpoint2.0, self.breakpoint2.1,
            self.comment
        )
    }
}

fn half(input: &str) -> IResult<&str, HalfSpec> {
    let (input, _) = ws(input)?;
    let (input, chromosome) = chromosome_name(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, _) = ws(input)?;
    let (input, pos) = position(input)?;
    let (input, _) = ws(input)?;
    let (input, side) = one_of("+-").parse(input)?;
    let (input, _) = ws(input)?;
    let (input, bases) = position(input)?;
    Ok((
        input,
        HalfSpec {
            chromosome: chromosome.to_string(),
            position: pos,
            side: Side::from_char(side).expect("one_of limits to +/-"),
            bases,
        },
    ))
}

fn statement(input: &str) -> IResult<&str, CoordinateSpec> {
    let (input, first) = half(input)?;
    let (input, _) = char('/').parse(input)?;
    let (input, second) = half(input)?;
    let (input, comment) = comment_tail(input)?;
    Ok((
        input,
        CoordinateSpec {
            first,
            second,
            comment,
        },
    ))
}

/// Parse a coordinate statement.
pub fn parse(text: &str) -> Result<CoordinateSpec, ProbeError> {
    match all_consuming(statement).parse(text) {
        Ok((_, spec)) => Ok(spec),
        Err(_) => Err(ProbeError::InvalidStatement {
            statement: text.to_string(),
        }),
    }
}

impl HalfSpec {
    /// The kept genomic range, 0-based half-open.
    fn range(&self, first_half: bool) -> Result<SequenceRange, ProbeError> {
        let anchor = self.position - 1;
        let (start, end) = match self.side {
            Side::Start => (anchor, anchor + self.bases),
            Side::End => {
                let start = (anchor + 1).checked_sub(self.bases).ok_or_else(|| {
                    ProbeError::InvalidStatement {
                        statement: format!(
                            "{}:{}-{} extends before the chromosome start",
                            self.chromosome, self.position, self.bases
                        ),
                    }
                })?;
                (start, anchor + 1)
            }
        };
        // Coordinate halves have no annotated strand; they read as plus.
        Ok(if flip(self.side, Strand::Plus, first_half) {
            SequenceRange::reversed(&self.chromosome, start, end)
        } else {
            SequenceRange::new(&self.chromosome, start, end)
        })
    }
}

/// Expand a coordinate statement: one statement, one probe.
pub fn explode(text: &str) -> Result<Vec<Probe>, ProbeError> {
    let spec = parse(text)?;
    let range1 = spec.first.range(true)?;
    let range2 = spec.second.range(false)?;
    let breakpoint1 = (
        spec.first.chromosome.clone(),
        breakpoint(&range1, spec.first.side, Strand::Plus),
    );
    let breakpoint2 = (
        spec.second.chromosome.clone(),
        breakpoint(&range2, spec.second.side, Strand::Plus),
    );
    Ok(vec![Probe::Coordinate(CoordinateProbe {
        ranges: vec![range1, range2],
        breakpoint1,
        breakpoint2,
        comment: spec.comment,
    })])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::Genome;

    fn genome() -> Genome {
        Genome::from_pairs([("1", "acgtacgt"), ("2", "aaaagggg")])
    }

    fn single(text: &str) -> Probe {
        let mut probes = explode(text).unwrap();
        assert_eq!(probes.len(), 1);
        probes.remove(0)
    }

    #[test]
    fn test_parse_simple_statement() {
        let spec = parse("1:4-2/2:3+3").unwrap();
        assert_eq!(spec.first.chromosome, "1");
        assert_eq!(spec.first.position, 4);
        assert_eq!(spec.first.side, Side::End);
        assert_eq!(spec.first.bases, 2);
        assert_eq!(spec.second.side, Side::Start);
        assert_eq!(spec.comment, "");
    }

    #[test]
    fn test_parse_is_whitespace_insensitive() {
        let probe = single(" 1:4\t- 2    /2 : 3+\t\t\t3");
        assert_eq!(probe.sequence(&genome()).unwrap(), "gtaag");
    }

    #[test]
    fn test_parse_with_comment() {
        let spec = parse("1:4-2/2:3+3 -- I'm a comment!").unwrap();
        assert_eq!(spec.comment, "-- I'm a comment!");
    }

    #[test]
    fn test_parse_rejects_nonsense() {
        assert!(matches!(
            parse("banana"),
            Err(ProbeError::InvalidStatement { .. })
        ));
        assert!(parse("1:4-2/2:3+3 junk").is_err());
    }

    #[test]
    fn test_parse_accepts_unmapped_contigs() {
        assert!(parse("GL0021.1:1-25 / GL001234.1:2+25").is_ok());
    }

    #[test]
    fn test_fixture_sequence_and_label() {
        let probe = single("1:4-2/2:3+3");
        assert_eq!(probe.sequence(&genome()).unwrap(), "gtaag");
        assert_eq!(probe.to_string(), "1:4/2:3");
    }

    #[test]
    fn test_label_keeps_comment() {
        let probe = single("1:4-2/2:3+3 -- I'm a comment!");
        assert_eq!(probe.to_string(), "1:4/2:3-- I'm a comment!");
    }

    #[test]
    fn test_first_half_flipped_when_side_is_start() {
        let probe = single("1:3+2/2:3+3");
        // [2, 4) read reversed: rc("gt") followed by "aag".
        assert_eq!(probe.sequence(&genome()).unwrap(), "acaag");
    }

    #[test]
    fn test_second_half_flipped_when_side_is_end() {
        let probe = single("1:4-2/2:4-3");
        // "gt" then the reverse complement of bases [1, 4) = "aaa".
        assert_eq!(probe.sequence(&genome()).unwrap(), "gtttt");
    }

    #[test]
    fn test_breakpoints_name_junction_adjacent_bases() {
        assert_eq!(single("1:3+2/2:4-3").to_string(), "1:3/2:4");
    }

    #[test]
    fn test_range_past_chromosome_start_is_invalid() {
        assert!(explode("1:2-5/2:3+3").is_err());
    }
}
