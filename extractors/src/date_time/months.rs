//! Month names as they appear in English and Dutch airline documents.

const MONTH_NAMES: &[(&str, u32)] = &[
    ("jan", 1),
    ("january", 1),
    ("januari", 1),
    ("feb", 2),
    ("february", 2),
    ("februari", 2),
    ("mar", 3),
    ("mrt", 3),
    ("march", 3),
    ("maart", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("mei", 5),
    ("jun", 6),
    ("june", 6),
    ("juni", 6),
    ("jul", 7),
    ("july", 7),
    ("juli", 7),
    ("aug", 8),
    ("august", 8),
    ("augustus", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("okt", 10),
    ("october", 10),
    ("oktober", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
];

/// Month number (1-12) for an abbreviated or full month name, case insensitive
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim().to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, month)| *month)
}
