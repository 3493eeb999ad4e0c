//! Nucleotide and codon utilities
//!
//! Base complementing, translation, and the degenerate codon tables used by
//! amino-acid-level statements. The lookup tables are built once at first
//! use and shared for the lifetime of the process.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The standard DNA codon table, amino acid to codons.
///
/// One-letter IUPAC amino acid codes; `*` is the stop codon set. The order
/// of codons within an entry is the expansion order used everywhere, so
/// candidate generation is deterministic.
const DNA_CODON_TABLE: &[(char, &[&str])] = &[
    ('A', &["GCT", "GCC", "GCA", "GCG"]),
    ('C', &["TGT", "TGC"]),
    ('D', &["GAT", "GAC"]),
    ('E', &["GAA", "GAG"]),
    ('F', &["TTT", "TTC"]),
    ('G', &["GGT", "GGC", "GGA", "GGG"]),
    ('H', &["CAT", "CAC"]),
    ('I', &["ATT", "ATC", "ATA"]),
    ('K', &["AAA", "AAG"]),
    ('L', &["CTT", "CTC", "CTA", "CTG", "TTA", "TTG"]),
    ('M', &["ATG"]),
    ('N', &["AAT", "AAC"]),
    ('P', &["CCT", "CCC", "CCA", "CCG"]),
    ('Q', &["CAA", "CAG"]),
    ('R', &["CGT", "CGC", "CGA", "CGG", "AGA", "AGG"]),
    ('S', &["TCT", "TCC", "TCA", "TCG", "AGT", "AGC"]),
    ('T', &["ACT", "ACC", "ACA", "ACG"]),
    ('V', &["GTT", "GTC", "GTA", "GTG"]),
    ('W', &["TGG"]),
    ('Y', &["TAT", "TAC"]),
    ('*', &["TAA", "TAG", "TGA"]),
];

/// All 64 codons, in table order; the expansion of the `X` wildcard.
static ALL_CODONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    DNA_CODON_TABLE
        .iter()
        .flat_map(|(_, codons)| codons.iter().copied())
        .collect()
});

/// Forward table: codon (uppercase) to one-letter amino acid.
static AMINO_ACID_BY_CODON: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(64);
    for (aa, codons) in DNA_CODON_TABLE {
        for codon in *codons {
            map.insert(*codon, *aa);
        }
    }
    map
});

/// Complement a single base, preserving case.
///
/// `N`/`n` are their own complement; bytes outside the nucleotide alphabet
/// pass through unchanged.
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'a' => b't',
        b't' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        other => other,
    }
}

/// Reverse-complement a base string, preserving case.
pub fn reverse_complement(bases: &str) -> String {
    bases
        .bytes()
        .rev()
        .map(complement)
        .map(char::from)
        .collect()
}

/// The degenerate DNA codons encoding `amino_acid`.
///
/// `X`/`x` expands to all 64 codons. Returns `None` for characters outside
/// the amino-acid alphabet; the statement grammars reject those upstream.
pub fn codons_for(amino_acid: char) -> Option<&'static [&'static str]> {
    let aa = amino_acid.to_ascii_uppercase();
    if aa == 'X' {
        return Some(ALL_CODONS.as_slice());
    }
    DNA_CODON_TABLE
        .iter()
        .find(|(entry, _)| *entry == aa)
        .map(|(_, codons)| *codons)
}

/// The amino acid encoded by a codon, case-insensitively.
pub fn amino_acid(codon: &str) -> Option<char> {
    AMINO_ACID_BY_CODON
        .get(codon.to_ascii_uppercase().as_str())
        .copied()
}

/// Translate a DNA sequence into a one-letter peptide string.
///
/// The sequence is read in frame from the first base; an incomplete or
/// unrecognized triplet translates to `X`.
pub fn translate(dna: &str) -> String {
    dna.as_bytes()
        .chunks(3)
        .map(|chunk| {
            std::str::from_utf8(chunk)
                .ok()
                .and_then(amino_acid)
                .unwrap_or('X')
        })
        .collect()
}

/// Every DNA sequence encoding `peptide`: the Cartesian product of the
/// degenerate codon sets of its positions, in table order.
///
/// Positions outside the amino-acid alphabet are skipped with their
/// candidates unexpanded (the grammars reject such peptides upstream). The
/// empty peptide reverse-translates to the single empty sequence.
pub fn reverse_translate(peptide: &str) -> Vec<String> {
    let mut sequences = vec![String::new()];
    for aa in peptide.chars() {
        let Some(codons) = codons_for(aa) else {
            continue;
        };
        let mut next = Vec::with_capacity(sequences.len() * codons.len());
        for prefix in &sequences {
            for codon in codons {
                let mut sequence = String::with_capacity(prefix.len() + 3);
                sequence.push_str(prefix);
                sequence.push_str(codon);
                next.push(sequence);
            }
        }
        sequences = next;
    }
    sequences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_preserves_case() {
        assert_eq!(complement(b'A'), b'T');
        assert_eq!(complement(b'g'), b'c');
        assert_eq!(complement(b'N'), b'N');
        assert_eq!(complement(b'n'), b'n');
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ATG"), "CAT");
        assert_eq!(reverse_complement("acgT"), "Acgt");
        assert_eq!(reverse_complement(""), "");
    }

    #[test]
    fn test_reverse_complement_is_involution() {
        let sequence = "acgtACGTnN";
        assert_eq!(reverse_complement(&reverse_complement(sequence)), sequence);
    }

    #[test]
    fn test_codon_table_cardinalities() {
        assert_eq!(codons_for('L').unwrap().len(), 6);
        assert_eq!(codons_for('S').unwrap().len(), 6);
        assert_eq!(codons_for('R').unwrap().len(), 6);
        assert_eq!(codons_for('M').unwrap().len(), 1);
        assert_eq!(codons_for('W').unwrap().len(), 1);
        assert_eq!(codons_for('*').unwrap().len(), 3);
        assert_eq!(codons_for('X').unwrap().len(), 64);
        assert_eq!(codons_for('x').unwrap().len(), 64);
        assert!(codons_for('B').is_none());
    }

    #[test]
    fn test_codons_for_is_case_insensitive() {
        assert_eq!(codons_for('m'), codons_for('M'));
    }

    #[test]
    fn test_amino_acid_lookup() {
        assert_eq!(amino_acid("ATG"), Some('M'));
        assert_eq!(amino_acid("atg"), Some('M'));
        assert_eq!(amino_acid("TAA"), Some('*'));
        assert_eq!(amino_acid("AT"), None);
        assert_eq!(amino_acid("NNN"), None);
    }

    #[test]
    fn test_translate() {
        assert_eq!(translate("ATGTGGTAA"), "MW*");
        assert_eq!(translate("atgtgg"), "MW");
        assert_eq!(translate(""), "");
        // Trailing partial codon.
        assert_eq!(translate("ATGT"), "MX");
    }

    #[test]
    fn test_reverse_translate_single() {
        assert_eq!(reverse_translate("M"), vec!["ATG"]);
        assert_eq!(reverse_translate("MW"), vec!["ATGTGG"]);
    }

    #[test]
    fn test_reverse_translate_product() {
        let sequences = reverse_translate("MC");
        assert_eq!(sequences, vec!["ATGTGT", "ATGTGC"]);

        // Cardinality is the product of the per-position set sizes.
        assert_eq!(reverse_translate("LS").len(), 36);
        assert_eq!(reverse_translate("MXM").len(), 64);
    }

    #[test]
    fn test_reverse_translate_empty() {
        assert_eq!(reverse_translate(""), vec![String::new()]);
    }

    #[test]
    fn test_reverse_translate_round_trips_through_translate() {
        for sequence in reverse_translate("MCW") {
            assert_eq!(translate(&sequence), "MCW");
        }
    }

    #[test]
    fn test_all_codons_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for codon in ALL_CODONS.iter() {
            assert!(seen.insert(*codon), "duplicate codon {codon}");
        }
        assert_eq!(seen.len(), 64);
    }
}
