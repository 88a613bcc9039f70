//! Golden test vectors for canonical text and digests.
//!
//! Any implementation that verifies against the same ledger must reproduce
//! these byte for byte.

use docseal_core::{compute_digest, normalize, HashAlgorithm};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Extracted text before normalization.
    pub input: &'static str,
    /// Expected canonical text.
    pub canonical: &'static str,
    /// Expected Keccak-256 of the canonical text (hex).
    pub keccak256: &'static str,
    /// Expected SHA-256 of the canonical text (hex).
    pub sha256: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "plain text",
            input: "Hello World",
            canonical: "Hello World",
            keccak256: "592fa743889fc7f92ac2a37bb1f5ba1daf2a5c84741ca0e0061d243a2e6707ba",
            sha256: "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e",
        },
        GoldenVector {
            name: "CRLF paragraphs",
            input: "Section 1.\r\nTerms apply.\r\n\r\n\r\nSection 2.\r\nPayment due.",
            canonical: "Section 1.\nTerms apply.\n\nSection 2.\nPayment due.",
            keccak256: "8451473b429d77b0259a67e4d84c65520a3084a84a69f71c9af887be57228e5f",
            sha256: "3eb1c0fe61162243f8e665e43afd63b791a81a32193ee312e77ba0e33f28ea2a",
        },
        GoldenVector {
            name: "tabs and space runs",
            input: "Party A\t\tand   Party B\t agree.",
            canonical: "Party A and Party B agree.",
            keccak256: "19725086b19dcfbb050d8e7fb131ad74273c806dada8ba58a17f50e92a35c898",
            sha256: "f455769b268d2ec04da835c5c4115dce996bd64c64bfa06ab9ec5e43c768dad1",
        },
        GoldenVector {
            name: "blank line run",
            input: "Recitals\n\n\n\n\nWHEREAS the parties",
            canonical: "Recitals\n\nWHEREAS the parties",
            keccak256: "0c19f8ac1a97b2a901e559b0459218f3edfdac7bcd8fafad33627f01a8b44631",
            sha256: "b1807f075a382cb6074e2961bc60b19c5ca986e0239073fbc2150d709dadf6fc",
        },
        GoldenVector {
            // Whitespace-only lines survive the blank-run rule and are
            // emptied by the trim that follows.
            name: "whitespace-only lines",
            input: "a\n \n \n \nb",
            canonical: "a\n\n\n\nb",
            keccak256: "047d0711921ff6f33559b1eafa09adb16c7c3e3abf0149a793aa77fcdc9b988e",
            sha256: "c85bb4862d8f5c0c710d74cb5112fba4280003f15565b91c436b5f6dae883ea5",
        },
        GoldenVector {
            name: "unicode trim",
            input: "\u{FEFF}\u{3000}Confidential\u{00A0}\n\u{2003}Draft\u{2003}",
            canonical: "Confidential\nDraft",
            keccak256: "eb3f7e23b572db171c2cb396de795c3675fbf43383225ba46b7faf906227706f",
            sha256: "c7cc8854c105096099772a0b935cb5c0e09fd6d92c2aa5340dc4a6e98986d4b0",
        },
        GoldenVector {
            name: "next line is not trimmed",
            input: "\u{0085}clause",
            canonical: "\u{0085}clause",
            keccak256: "ed22167515e1f0e513d7b83a9bbb3316e0c443fbba2afa1ade4e7bfba7a47fd2",
            sha256: "370f60e8ee3285d1ecbf3367a8835dc3b2d5eea6d0ba03714e921c75197c2764",
        },
        GoldenVector {
            name: "whitespace only",
            input: "  \r\n\t  ",
            canonical: "",
            keccak256: "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
            sha256: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        },
    ]
}

/// Check every vector, returning `(name, matches, keccak_hex)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let canonical = normalize(v.input);
            let keccak = compute_digest(&canonical, HashAlgorithm::Keccak256).to_hex();
            let sha = compute_digest(&canonical, HashAlgorithm::Sha256).to_hex();

            let matches = canonical == v.canonical && keccak == v.keccak256 && sha == v.sha256;
            (v.name.to_string(), matches, keccak)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_names_unique() {
        let mut names: Vec<_> = all_vectors().iter().map(|v| v.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all_vectors().len());
    }

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, hex) in verify_all_vectors() {
            assert!(matches, "vector {:?} produced {}", name, hex);
        }
    }

    #[test]
    fn test_canonical_is_stable_under_normalize() {
        // Every canonical output except the blank-line quirk is a fixed point.
        for v in all_vectors() {
            if v.canonical.contains("\n\n\n") {
                continue;
            }
            assert_eq!(normalize(v.canonical), v.canonical, "{}", v.name);
        }
    }
}
