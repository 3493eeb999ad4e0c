//! Batch driver: statements in, FASTA out
//!
//! One statement per line. Malformed statements abort only themselves;
//! per-candidate failures become warning lines on the error stream; every
//! surviving probe becomes one FASTA record on the output stream, in input
//! order.

use std::io::{BufRead, Write};

use log::debug;

use crate::annotation::Annotation;
use crate::error::ProbeError;
use crate::genome::Genome;
use crate::probe;

/// Resolve every statement in `statements` against the genome and
/// annotation, writing FASTA records to `output` and warnings to
/// `errors`.
///
/// Blank lines and lines holding only a `--` comment are skipped. Only
/// file-level failures (I/O) abort the run.
pub fn run<R, W, E>(
    statements: R,
    genome: &Genome,
    annotation: &Annotation,
    output: &mut W,
    errors: &mut E,
) -> Result<(), ProbeError>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    for line in statements.lines() {
        let line = line?;
        let statement = line.trim();
        if statement.is_empty() || statement.starts_with("--") {
            continue;
        }
        debug!("processing statement {statement:?}");

        let mut warnings = Vec::new();
        let probes = match probe::explode(statement, annotation, &mut warnings) {
            Ok(probes) => probes,
            Err(error @ ProbeError::InvalidStatement { .. }) => {
                writeln!(errors, "error: {error}")?;
                continue;
            }
            Err(error) => return Err(error),
        };
        for warning in &warnings {
            writeln!(errors, "warning: {warning}")?;
        }

        let mut emitted = 0usize;
        for probe in &probes {
            match probe.sequence(genome) {
                Ok(sequence) => {
                    writeln!(output, ">{probe}\n{sequence}")?;
                    emitted += 1;
                }
                Err(error) => {
                    writeln!(errors, "warning: {error} in statement {statement:?}")?;
                }
            }
        }
        if emitted == 0 {
            writeln!(errors, "warning: no probes generated for statement {statement:?}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TABLE: &str = "#name\tchrom\tstrand\tcdsStart\tcdsEnd\texonStarts\texonEnds\tname2\n\
                         FOO\tchr1\t+\t1\t2\t1,\t2,\tABC\n";

    fn fixtures() -> (Genome, Annotation) {
        let genome = Genome::from_pairs([("1", "acgtacgt"), ("2", "aaaagggg")]);
        let annotation = Annotation::from_reader(Cursor::new(TABLE)).unwrap();
        (genome, annotation)
    }

    fn run_to_strings(statements: &str) -> (String, String) {
        let (genome, annotation) = fixtures();
        let mut output = Vec::new();
        let mut errors = Vec::new();
        run(
            Cursor::new(statements),
            &genome,
            &annotation,
            &mut output,
            &mut errors,
        )
        .unwrap();
        (
            String::from_utf8(output).unwrap(),
            String::from_utf8(errors).unwrap(),
        )
    }

    #[test]
    fn test_fasta_output_in_input_order() {
        let (output, errors) = run_to_strings("1:4-2/2:3+3\nABC:c.1c>t/4\n");
        assert_eq!(output, ">1:4/2:3\ngtaag\n>ABC:c.1c>t/4_FOO_1:2\natgt\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        let (output, errors) = run_to_strings("\n   \n-- a whole-line comment\n1:4-2/2:3+3\n");
        assert_eq!(output, ">1:4/2:3\ngtaag\n");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_malformed_statement_aborts_only_itself() {
        let (output, errors) = run_to_strings("banana\n1:4-2/2:3+3\n");
        assert_eq!(output, ">1:4/2:3\ngtaag\n");
        assert!(errors.contains("error: could not parse statement \"banana\""));
    }

    #[test]
    fn test_exhausted_candidates_warn_once() {
        let (output, errors) = run_to_strings("ABC:c.9a>t/4\n");
        assert!(output.is_empty());
        assert!(errors.contains("base 9 is outside the range"));
        assert!(errors.contains("no probes generated for statement \"ABC:c.9a>t/4\""));
    }

    #[test]
    fn test_reference_mismatch_is_reported_per_probe() {
        let (output, errors) = run_to_strings("ABC:c.1a>t/4\n");
        assert!(output.is_empty());
        assert!(errors.contains("does not match genome bases"));
        assert!(errors.contains("no probes generated"));
    }
}
