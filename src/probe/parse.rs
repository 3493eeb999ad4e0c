//! Shared parsing primitives for the statement grammars
//!
//! Each statement kind owns its grammar in its own module; the small
//! building blocks they share (token classes, numbers, the `[trans]`
//! marker, the trailing `--` comment) live here. All grammars are
//! whitespace-insensitive between tokens.

use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{digit1, multispace0, one_of};
use nom::combinator::opt;
use nom::IResult;
use nom::Parser;

/// Optional whitespace between tokens.
pub(crate) fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

/// An unsigned integer.
pub(crate) fn integer(input: &str) -> IResult<&str, u64> {
    let (rest, digits) = digit1(input)?;
    let value = digits.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((rest, value))
}

/// A 1-based position or index: an integer that must not be zero.
pub(crate) fn position(input: &str) -> IResult<&str, u64> {
    let (rest, value) = integer(input)?;
    if value == 0 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    Ok((rest, value))
}

/// A gene name token.
pub(crate) fn gene_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-'))
        .parse(input)
}

/// A chromosome token (unmapped contigs like `GL0021.1` included).
pub(crate) fn chromosome_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '.').parse(input)
}

/// A single nucleotide, either case.
pub(crate) fn nucleotide(input: &str) -> IResult<&str, char> {
    one_of("ACGTacgt").parse(input)
}

/// A run of nucleotides, either case.
pub(crate) fn nucleotide_sequence(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| matches!(c, 'A' | 'C' | 'G' | 'T' | 'a' | 'c' | 'g' | 't')).parse(input)
}

/// The IUPAC one-letter amino-acid alphabet, stop included.
const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWYacdefghiklmnpqrstvwy*";

/// A single amino-acid code.
pub(crate) fn amino_acid_code(input: &str) -> IResult<&str, char> {
    one_of(AMINO_ACIDS).parse(input)
}

/// An amino-acid code in mutation position, where the `X` wildcard ("any
/// codon") is also accepted.
pub(crate) fn mutation_amino_acid_code(input: &str) -> IResult<&str, char> {
    one_of("ACDEFGHIKLMNPQRSTVWXYacdefghiklmnpqrstvwxy*").parse(input)
}

/// A run of amino-acid codes (insertion peptides).
pub(crate) fn peptide(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| AMINO_ACIDS.contains(c)).parse(input)
}

/// The optional `[trans]` marker selecting transcript-buffered flanks.
pub(crate) fn trans_marker(input: &str) -> IResult<&str, bool> {
    let (input, _) = ws(input)?;
    let (input, marker) = opt(tag("[trans]")).parse(input)?;
    Ok((input, marker.is_some()))
}

/// The optional free-text comment ending a statement: `--` to end of line,
/// stored verbatim (dashes included). Consumes trailing whitespace either
/// way.
pub(crate) fn comment_tail(input: &str) -> IResult<&str, String> {
    let (input, _) = ws(input)?;
    match input.strip_prefix("--") {
        Some(rest) => Ok(("", format!("--{rest}"))),
        None => Ok((input, String::new())),
    }
}
