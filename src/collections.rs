//! Built-in named page lists.

/// Physicists used for the original science run.
pub const SCIENCE: &[&str] = &["Albert Einstein", "Niels Bohr"];

static COLLECTIONS: &[(&str, &[&str])] = &[("science", SCIENCE)];

/// Pages of the built-in collection called `name`.
pub fn lookup(name: &str) -> Option<&'static [&'static str]> {
    COLLECTIONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, pages)| *pages)
}

/// Names of all built-in collections.
pub fn names() -> impl Iterator<Item = &'static str> {
    COLLECTIONS.iter().map(|(n, _)| *n)
}
