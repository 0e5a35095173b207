use tracing::error;

use crate::catalog::{Catalog, MessageEntry};

/// Domain under which the reverse catalog of `domain` is published.
pub fn reverse_domain(domain: &str) -> String {
    format!("{domain}reverse")
}

/// Catalog mapping each lower-cased translation back to its original.
///
/// Untranslated entries are reported and skipped. Translations that collide
/// case-insensitively merge into one entry; the first original seen wins.
pub fn build_reverse(catalog: &Catalog) -> Catalog {
    let mut reverse =
        Catalog::with_utf8_headers(catalog.domain(), catalog.locale().map(str::to_string));

    for entry in catalog.entries() {
        let Some(translation) = entry.primary_translation() else {
            error!("No translation for {}", entry.original);
            continue;
        };

        let mut flipped = MessageEntry::new(translation.to_lowercase())
            .with_translation(entry.original.clone());
        flipped.context = entry.context.clone();
        flipped.references = entry.references.clone();

        reverse.add_or_merge(flipped);
    }

    reverse
}
