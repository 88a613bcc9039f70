//! Proptest generators for property-based testing.

use proptest::prelude::*;

use docseal_core::{FileType, HashAlgorithm, VersionLabel};

/// A word with no whitespace.
pub fn word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9.,;:()§-]{1,12}".prop_map(String::from)
}

/// Horizontal whitespace that collapses to one space.
pub fn horizontal_gap() -> impl Strategy<Value = String> {
    "[ \t]{1,6}".prop_map(String::from)
}

/// A line ending in any of the forms extraction produces.
pub fn line_ending() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("\n"), Just("\r\n"), Just("\r")]
}

/// Words joined by single spaces, split into lines.
///
/// This is already canonical: no leading or trailing whitespace, no blank
/// line runs.
pub fn clean_text() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(word(), 1..8), 1..6)
}

/// Render lines of words with single spaces and `\n`.
pub fn render_clean(lines: &[Vec<String>]) -> String {
    lines
        .iter()
        .map(|words| words.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The same lines of words with randomized whitespace.
///
/// Normalizes to `render_clean(lines)`.
pub fn messy_rendering(lines: Vec<Vec<String>>) -> impl Strategy<Value = String> {
    let word_count: usize = lines.iter().map(Vec::len).sum();
    let line_count = lines.len();
    (
        prop::collection::vec(horizontal_gap(), word_count),
        prop::collection::vec(line_ending(), line_count),
        "[ \t]{0,3}",
        "[ \t]{0,3}",
    )
        .prop_map(move |(gaps, endings, lead, tail)| {
            let mut out = String::new();
            let mut gap = gaps.iter();
            for (i, words) in lines.iter().enumerate() {
                out.push_str(&lead);
                for (j, w) in words.iter().enumerate() {
                    if j > 0 {
                        out.push_str(gap.next().map(String::as_str).unwrap_or(" "));
                    }
                    out.push_str(w);
                }
                out.push_str(&tail);
                if i + 1 < lines.len() {
                    out.push_str(endings[i]);
                }
            }
            out
        })
}

/// Canonical text paired with a messy rendering of it.
pub fn messy_text() -> impl Strategy<Value = (String, String)> {
    clean_text().prop_flat_map(|lines| {
        let canonical = render_clean(&lines);
        messy_rendering(lines).prop_map(move |messy| (canonical.clone(), messy))
    })
}

/// Arbitrary text, including control and Unicode whitespace.
pub fn any_text(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => any::<char>(),
            1 => prop::sample::select(vec![
                ' ', '\t', '\n', '\r', '\u{00A0}', '\u{2003}', '\u{3000}', '\u{FEFF}', '\u{0085}',
            ]),
        ],
        0..=max_len,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

pub fn file_type() -> impl Strategy<Value = FileType> {
    prop::sample::select(FileType::ALL.to_vec())
}

pub fn hash_algorithm() -> impl Strategy<Value = HashAlgorithm> {
    prop_oneof![
        Just(HashAlgorithm::Keccak256),
        Just(HashAlgorithm::Sha256),
        Just(HashAlgorithm::Blake3),
    ]
}

/// Generate a valid version label.
pub fn version_label() -> impl Strategy<Value = VersionLabel> {
    (1u64..=10_000).prop_filter_map("label numbers start at 1", VersionLabel::new)
}
