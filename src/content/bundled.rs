//! Records compiled into the binary.

use super::ContentSource;

const BUNDLED: &[(&str, &str)] = &[
    (
        "slidingWindow.json",
        include_str!("../../content/patterns/slidingWindow.json"),
    ),
    (
        "twoPointers.json",
        include_str!("../../content/patterns/twoPointers.json"),
    ),
    (
        "fastSlowPointers.json",
        include_str!("../../content/patterns/fastSlowPointers.json"),
    ),
];

pub fn bundled_sources() -> Vec<ContentSource> {
    BUNDLED
        .iter()
        .map(|(name, text)| ContentSource::new(*name, *text))
        .collect()
}
