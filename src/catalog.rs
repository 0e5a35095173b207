use polib::catalog::Catalog as PoCatalog;
use polib::message::{Message, MessageFlags, MessageView};
use polib::metadata::CatalogMetadata;
use polib::{mo_file, po_file};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

pub const FUZZY: &str = "fuzzy";
pub const UTF8_CONTENT_TYPE: &str = "text/plain; charset=UTF-8";

const CONTENT_TYPE_HEADER: &str = "Content-Type";
const LANGUAGE_HEADER: &str = "Language";
const PLURAL_FORMS_HEADER: &str = "Plural-Forms";

/// Header keys the PO reader requires, with the values filled in when a file
/// omits them.
const REQUIRED_HEADERS: &[(&str, &str)] = &[
    ("Project-Id-Version", "PACKAGE VERSION"),
    ("POT-Creation-Date", "YEAR-MO-DA HO:MI+ZONE"),
    ("PO-Revision-Date", "YEAR-MO-DA HO:MI+ZONE"),
    ("Last-Translator", "FULL NAME <EMAIL@ADDRESS>"),
    ("Language-Team", "LANGUAGE <LL@li.org>"),
    ("MIME-Version", "1.0"),
    (CONTENT_TYPE_HEADER, UTF8_CONTENT_TYPE),
    ("Content-Transfer-Encoding", "8bit"),
    (LANGUAGE_HEADER, "und"),
    (PLURAL_FORMS_HEADER, "nplurals=2; plural=(n != 1);"),
];

/// Identity of a message for merge purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId {
    pub context: Option<String>,
    pub original: String,
}

/// One translatable string with its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEntry {
    pub context: Option<String>,
    pub original: String,
    pub original_plural: Option<String>,
    pub translation: String,
    pub plural_translations: Vec<String>,
    /// Ordered, deduplicated source references (`branch file` or a list path).
    pub references: Vec<String>,
    pub flags: Vec<String>,
    pub comments: String,
}

impl MessageEntry {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = translation.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.add_reference(reference);
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.add_flag(flag);
        self
    }

    pub fn id(&self) -> EntryId {
        EntryId {
            context: self.context.clone(),
            original: self.original.clone(),
        }
    }

    pub fn is_plural(&self) -> bool {
        self.original_plural.is_some()
    }

    pub fn is_translated(&self) -> bool {
        !self.translation.is_empty() || self.plural_translations.iter().any(|t| !t.is_empty())
    }

    pub fn is_fuzzy(&self) -> bool {
        self.has_flag(FUZZY)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn add_reference(&mut self, reference: impl Into<String>) {
        let reference = reference.into();
        if !self.references.contains(&reference) {
            self.references.push(reference);
        }
    }

    pub fn add_flag(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    /// The translation to publish: the singular text, else the first plural form.
    pub fn primary_translation(&self) -> Option<&str> {
        self.translated_texts().first().copied()
    }

    /// Every non-empty translated text: the singular form or each plural form.
    pub fn translated_texts(&self) -> Vec<&str> {
        std::iter::once(self.translation.as_str())
            .chain(self.plural_translations.iter().map(String::as_str))
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Fold `other` (same identity) into this entry: references and flags are
    /// unioned in first-seen order and an existing non-empty translation wins.
    pub fn merge(&mut self, other: MessageEntry) {
        debug_assert_eq!(self.id(), other.id());

        for reference in other.references {
            self.add_reference(reference);
        }
        for flag in other.flags {
            self.add_flag(flag);
        }
        if self.original_plural.is_none() {
            self.original_plural = other.original_plural;
        }
        if self.translation.is_empty() {
            self.translation = other.translation;
        }
        if self.plural_translations.iter().all(String::is_empty)
            && other.plural_translations.iter().any(|t| !t.is_empty())
        {
            self.plural_translations = other.plural_translations;
        }
        if self.comments.is_empty() {
            self.comments = other.comments;
        }
    }
}

/// An ordered collection of entries for one domain, unique by [`EntryId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    domain: String,
    locale: Option<String>,
    headers: Vec<(String, String)>,
    entries: Vec<MessageEntry>,
    index: HashMap<EntryId, usize>,
}

impl Catalog {
    pub fn new(domain: impl Into<String>, locale: Option<String>) -> Self {
        Self {
            domain: domain.into(),
            locale,
            headers: Vec::new(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// New catalog carrying the plain-text UTF-8 content type header.
    pub fn with_utf8_headers(domain: impl Into<String>, locale: Option<String>) -> Self {
        let mut catalog = Self::new(domain, locale);
        catalog.set_header(CONTENT_TYPE_HEADER, UTF8_CONTENT_TYPE);
        catalog
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter()
    }

    pub fn get(&self, context: Option<&str>, original: &str) -> Option<&MessageEntry> {
        let id = EntryId {
            context: context.map(str::to_string),
            original: original.to_string(),
        };
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    /// Insert `entry`, or merge it into the entry sharing its identity.
    pub fn add_or_merge(&mut self, entry: MessageEntry) {
        let existing = self.index.get(&entry.id()).copied();
        match existing {
            Some(i) => self.entries[i].merge(entry),
            None => self.push(entry),
        }
    }

    /// Insert `entry`, replacing any entry sharing its identity in place.
    pub fn replace(&mut self, entry: MessageEntry) {
        let existing = self.index.get(&entry.id()).copied();
        match existing {
            Some(i) => self.entries[i] = entry,
            None => self.push(entry),
        }
    }

    fn push(&mut self, entry: MessageEntry) {
        self.index.insert(entry.id(), self.entries.len());
        self.entries.push(entry);
    }

    /// Snapshot of this catalog keeping only the entries `keep` accepts.
    pub fn filtered<F>(&self, mut keep: F) -> Catalog
    where
        F: FnMut(&MessageEntry) -> bool,
    {
        let mut out = Catalog::new(self.domain.clone(), self.locale.clone());
        out.headers = self.headers.clone();
        for entry in self.entries.iter().filter(|e| keep(e)) {
            out.push(entry.clone());
        }
        out
    }

    /// Load a PO/POT file. The file's own header supplies content type,
    /// language and plural forms.
    ///
    /// Header keys the file leaves out (or a missing header) are filled in on
    /// a scratch copy before parsing; filled-in values never reach the catalog.
    pub fn load_po(path: &Path, domain: &str, locale: Option<String>) -> Result<Catalog> {
        let source = std::fs::read_to_string(path)?;
        let (completed, filled) = complete_header(&source);

        let parsed = if filled.is_empty() {
            po_file::parse(path).map_err(|e| Error::catalog(path, e))?
        } else {
            debug!("{}: filling header keys {}", path.display(), filled.join(", "));
            let mut scratch = tempfile::Builder::new().suffix(".po").tempfile()?;
            scratch.write_all(completed.as_bytes())?;
            scratch.flush()?;
            po_file::parse(scratch.path()).map_err(|e| Error::catalog(path, e))?
        };

        let mut catalog = Self::from_po_catalog(&parsed, domain, locale);
        catalog
            .headers
            .retain(|(key, _)| !filled.iter().any(|f| f.eq_ignore_ascii_case(key)));
        Ok(catalog)
    }

    pub fn write_po(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        po_file::write(&self.to_po_catalog(), path).map_err(|e| Error::catalog(path, e))
    }

    pub fn write_mo(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        mo_file::write(&self.to_po_catalog(), path).map_err(|e| Error::catalog(path, e))
    }

    fn from_po_catalog(parsed: &PoCatalog, domain: &str, locale: Option<String>) -> Catalog {
        let mut catalog = Catalog::new(domain, locale);

        let metadata = &parsed.metadata;
        if !metadata.content_type.is_empty() {
            catalog.set_header(CONTENT_TYPE_HEADER, metadata.content_type.clone());
        }
        if !metadata.language.is_empty() {
            catalog.set_header(LANGUAGE_HEADER, metadata.language.clone());
        }
        if !metadata.plural_rules.expr.is_empty() {
            catalog.set_header(
                PLURAL_FORMS_HEADER,
                format!(
                    "nplurals={}; plural={};",
                    metadata.plural_rules.nplurals, metadata.plural_rules.expr
                ),
            );
        }

        for message in parsed.messages() {
            catalog.add_or_merge(entry_from_message(message));
        }
        catalog
    }

    fn to_po_catalog(&self) -> PoCatalog {
        let mut metadata = CatalogMetadata::new();
        metadata.content_type = self
            .header(CONTENT_TYPE_HEADER)
            .unwrap_or(UTF8_CONTENT_TYPE)
            .to_string();
        if let Some(language) = self.header(LANGUAGE_HEADER).or(self.locale()) {
            metadata.language = language.to_string();
        }
        if let Some((nplurals, expr)) = self.header(PLURAL_FORMS_HEADER).and_then(parse_plural_forms)
        {
            metadata.plural_rules.nplurals = nplurals;
            metadata.plural_rules.expr = expr;
        }

        let mut out = PoCatalog::new(metadata);
        for entry in &self.entries {
            out.append_or_update(message_from_entry(entry));
        }
        out
    }
}

/// `source` with every [`REQUIRED_HEADERS`] key present in its header entry,
/// plus the keys that had to be added. A file without a header entry gets one.
fn complete_header(source: &str) -> (String, Vec<&'static str>) {
    let lines: Vec<&str> = source.lines().collect();

    let first = lines
        .iter()
        .position(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .unwrap_or(lines.len());
    let next = lines
        .iter()
        .skip(first + 1)
        .map(|line| line.trim())
        .find(|line| !line.is_empty() && !line.starts_with('#'));
    let has_header = lines.get(first).map(|line| line.trim()) == Some(r#"msgid """#)
        && next.is_some_and(|line| line.starts_with("msgstr"));

    if !has_header {
        let filled: Vec<&'static str> = REQUIRED_HEADERS.iter().map(|(key, _)| *key).collect();
        let mut out = String::from("msgid \"\"\nmsgstr \"\"\n");
        for (key, value) in REQUIRED_HEADERS {
            out.push_str(&format!("\"{key}: {value}\\n\"\n"));
        }
        out.push('\n');
        out.push_str(source);
        return (out, filled);
    }

    // The header's msgstr: its own line plus the string continuation lines.
    let msgstr_line = lines
        .iter()
        .enumerate()
        .skip(first + 1)
        .find(|(_, line)| line.trim().starts_with("msgstr"))
        .map(|(i, _)| i)
        .unwrap_or(first);
    let mut last = msgstr_line;
    while lines.get(last + 1).is_some_and(|line| line.trim().starts_with('"')) {
        last += 1;
    }

    let mut value = String::new();
    for line in &lines[msgstr_line..=last] {
        let line = line.trim().trim_start_matches("msgstr").trim();
        value.push_str(line.trim_matches('"'));
    }
    let present: Vec<&str> = value
        .split("\\n")
        .filter_map(|field| field.split_once(':'))
        .map(|(key, _)| key.trim())
        .collect();

    let filled: Vec<&'static str> = REQUIRED_HEADERS
        .iter()
        .map(|(key, _)| *key)
        .filter(|key| !present.contains(key))
        .collect();
    if filled.is_empty() {
        return (source.to_string(), filled);
    }

    let mut out: Vec<String> = lines[..=last].iter().map(|line| line.to_string()).collect();
    if !value.is_empty() && !value.ends_with("\\n") {
        out.push(r#""\n""#.to_string());
    }
    for (key, value) in REQUIRED_HEADERS.iter().filter(|(key, _)| filled.contains(key)) {
        out.push(format!("\"{key}: {value}\\n\""));
    }
    out.extend(lines[last + 1..].iter().map(|line| line.to_string()));

    let mut completed = out.join("\n");
    completed.push('\n');
    (completed, filled)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn parse_plural_forms(value: &str) -> Option<(usize, String)> {
    let mut nplurals = None;
    let mut expr = None;
    for part in value.split(';') {
        let part = part.trim();
        if let Some(n) = part.strip_prefix("nplurals=") {
            nplurals = n.trim().parse().ok();
        } else if let Some(e) = part.strip_prefix("plural=") {
            expr = Some(e.trim().to_string());
        }
    }
    Some((nplurals?, expr?))
}

fn entry_from_message(message: &dyn MessageView) -> MessageEntry {
    let context = Some(message.msgctxt())
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let (original_plural, translation, plural_translations) = if message.is_plural() {
        (
            message.msgid_plural().ok().map(str::to_string),
            String::new(),
            message
                .msgstr_plural()
                .map(|forms| forms.to_vec())
                .unwrap_or_default(),
        )
    } else {
        (
            None,
            message.msgstr().unwrap_or_default().to_string(),
            Vec::new(),
        )
    };

    MessageEntry {
        context,
        original: message.msgid().to_string(),
        original_plural,
        translation,
        plural_translations,
        references: message
            .source()
            .lines()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect(),
        flags: message.flags().iter().map(|f| f.to_string()).collect(),
        comments: message.comments().to_string(),
    }
}

fn message_from_entry(entry: &MessageEntry) -> Message {
    let mut flags = MessageFlags::new();
    for flag in &entry.flags {
        flags.add_flag(flag);
    }
    let context = entry.context.clone().unwrap_or_default();
    let source = entry.references.join("\n");

    match &entry.original_plural {
        Some(plural) => {
            let forms = if entry.plural_translations.is_empty() {
                vec![String::new(), String::new()]
            } else {
                entry.plural_translations.clone()
            };
            Message::build_plural()
                .with_msgctxt(context)
                .with_msgid(entry.original.clone())
                .with_msgid_plural(plural.clone())
                .with_msgstr_plural(forms)
                .with_source(source)
                .with_flags(flags)
                .with_comments(entry.comments.clone())
                .done()
        }
        None => Message::build_singular()
            .with_msgctxt(context)
            .with_msgid(entry.original.clone())
            .with_msgstr(entry.translation.clone())
            .with_source(source)
            .with_flags(flags)
            .with_comments(entry.comments.clone())
            .done(),
    }
}

/// Copy of `catalog` without any entry flagged fuzzy.
pub fn filter_fuzzy(catalog: &Catalog) -> Catalog {
    catalog.filtered(|entry| !entry.is_fuzzy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(original: &str, translation: &str, reference: &str) -> MessageEntry {
        MessageEntry::new(original)
            .with_translation(translation)
            .with_reference(reference)
    }

    #[test]
    fn test_merge_unions_references_in_order() {
        let mut a = entry("Save", "", "main a.js");
        a.merge(entry("Save", "", "dev b.js"));
        a.merge(entry("Save", "", "main a.js"));

        assert_eq!(a.references, vec!["main a.js", "dev b.js"]);
    }

    #[test]
    fn test_merge_prefers_non_empty_translation() {
        let mut a = entry("Save", "", "x");
        a.merge(entry("Save", "Enregistrer", "y"));
        assert_eq!(a.translation, "Enregistrer");

        let mut b = entry("Save", "Sichern", "x");
        b.merge(entry("Save", "Speichern", "y"));
        assert_eq!(b.translation, "Sichern");
    }

    #[test]
    fn test_merge_is_idempotent_and_commutative_on_references() {
        let a = entry("Hi", "", "one").with_flag("c-format");
        let b = entry("Hi", "Salut", "two").with_flag(FUZZY);

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut abb = ab.clone();
        abb.merge(b.clone());
        assert_eq!(abb, ab);

        let mut ba = b.clone();
        ba.merge(a.clone());

        let mut left = ab.references.clone();
        let mut right = ba.references.clone();
        left.sort();
        right.sort();
        assert_eq!(left, right);
        assert_eq!(ab.translation, ba.translation);
        assert!(ab.is_fuzzy() && ba.is_fuzzy());
        assert!(ab.has_flag("c-format") && ba.has_flag("c-format"));
    }

    #[test]
    fn test_catalog_deduplicates_by_identity() {
        let mut catalog = Catalog::with_utf8_headers("messages", None);
        catalog.add_or_merge(entry("Open", "", "a"));
        catalog.add_or_merge(entry("Close", "", "a"));
        catalog.add_or_merge(entry("Open", "", "b"));
        catalog.add_or_merge(entry("Open", "", "c").with_context("menu"));

        assert_eq!(catalog.len(), 3);
        let open = catalog.get(None, "Open").unwrap();
        assert_eq!(open.references, vec!["a", "b"]);
        assert!(catalog.get(Some("menu"), "Open").is_some());
        assert_eq!(catalog.header("content-type"), Some(UTF8_CONTENT_TYPE));
    }

    #[test]
    fn test_replace_overwrites_in_place() {
        let mut catalog = Catalog::new("messages", None);
        catalog.add_or_merge(entry("A", "", "first"));
        catalog.add_or_merge(entry("B", "", "first"));
        catalog.replace(entry("A", "Ah", "second"));

        let originals: Vec<_> = catalog.entries().map(|e| e.original.as_str()).collect();
        assert_eq!(originals, vec!["A", "B"]);
        assert_eq!(catalog.get(None, "A").unwrap().references, vec!["second"]);
    }

    #[test]
    fn test_filter_fuzzy_removes_only_fuzzy() {
        let mut catalog = Catalog::new("messages", Some("fr-FR".to_string()));
        catalog.add_or_merge(entry("A", "a", "r"));
        catalog.add_or_merge(entry("B", "b", "r").with_flag(FUZZY));
        catalog.add_or_merge(entry("C", "", "r").with_flag("c-format"));

        let filtered = filter_fuzzy(&catalog);
        let originals: Vec<_> = filtered.entries().map(|e| e.original.as_str()).collect();
        assert_eq!(originals, vec!["A", "C"]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(filtered.locale(), Some("fr-FR"));
    }

    #[test]
    fn test_po_round_trip_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fr.po");

        let mut catalog = Catalog::with_utf8_headers("messages", Some("fr-FR".to_string()));
        catalog.add_or_merge(entry("Hello", "Bonjour", "main src/a.js"));
        catalog.add_or_merge(entry("Bye", "", "main src/b.js").with_flag(FUZZY));
        catalog.write_po(&path).unwrap();

        let loaded = Catalog::load_po(&path, "messages", Some("fr-FR".to_string())).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(None, "Hello").unwrap().translation, "Bonjour");
        assert!(loaded.get(None, "Bye").unwrap().is_fuzzy());
    }

    #[test]
    fn test_write_mo_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out/fr_FR/LC_MESSAGES/messages.mo");

        let mut catalog = Catalog::with_utf8_headers("messages", Some("fr-FR".to_string()));
        catalog.add_or_merge(entry("Hello", "Bonjour", "r"));
        catalog.write_mo(&path).unwrap();

        assert!(path.is_file());
    }

    fn load(content: &str) -> Catalog {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fr.po");
        std::fs::write(&path, content).unwrap();
        Catalog::load_po(&path, "messages", Some("fr-FR".to_string())).unwrap()
    }

    #[test]
    fn test_load_po_with_content_type_only_header() {
        let catalog = load(concat!(
            "msgid \"\"\n",
            "msgstr \"\"\n",
            "\"Content-Type: text/plain; charset=UTF-8\\n\"\n",
            "\n",
            "msgid \"Save\"\n",
            "msgstr \"Enregistrer\"\n",
        ));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(None, "Save").unwrap().translation, "Enregistrer");
        assert_eq!(catalog.header(CONTENT_TYPE_HEADER), Some(UTF8_CONTENT_TYPE));
        assert_eq!(catalog.header(LANGUAGE_HEADER), None);
        assert_eq!(catalog.header(PLURAL_FORMS_HEADER), None);
    }

    #[test]
    fn test_load_po_without_header() {
        let catalog = load("#: main src/a.js\nmsgid \"Save\"\nmsgstr \"Enregistrer\"\n");

        assert_eq!(catalog.len(), 1);
        let save = catalog.get(None, "Save").unwrap();
        assert_eq!(save.translation, "Enregistrer");
        assert_eq!(save.references, vec!["main src/a.js"]);
        assert!(catalog.headers().is_empty());
    }

    #[test]
    fn test_load_po_single_line_header_keeps_own_values() {
        let catalog = load(concat!(
            "# Translators\n",
            "msgid \"\"\n",
            "msgstr \"Language: de\\nPlural-Forms: nplurals=2; plural=(n != 1);\"\n",
            "\n",
            "msgid \"Save\"\n",
            "msgstr \"Speichern\"\n",
        ));

        assert_eq!(catalog.header(LANGUAGE_HEADER), Some("de"));
        assert!(catalog
            .header(PLURAL_FORMS_HEADER)
            .is_some_and(|forms| forms.starts_with("nplurals=2;")));
        assert_eq!(catalog.header(CONTENT_TYPE_HEADER), None);
        assert_eq!(catalog.get(None, "Save").unwrap().translation, "Speichern");
    }

    #[test]
    fn test_load_po_flags_context_and_plurals() {
        let catalog = load(concat!(
            "msgid \"\"\n",
            "msgstr \"\"\n",
            "\"Content-Type: text/plain; charset=UTF-8\\n\"\n",
            "\n",
            "#, fuzzy, c-format\n",
            "msgid \"%d left\"\n",
            "msgstr \"%d restant\"\n",
            "\n",
            "msgctxt \"menu\"\n",
            "msgid \"Open\"\n",
            "msgstr \"Ouvrir\"\n",
            "\n",
            "msgid \"One file\"\n",
            "msgid_plural \"{n} files\"\n",
            "msgstr[0] \"Un fichier\"\n",
            "msgstr[1] \"{n} fichiers\"\n",
        ));

        let left = catalog.get(None, "%d left").unwrap();
        assert!(left.is_fuzzy());
        assert!(left.has_flag("c-format"));

        assert_eq!(catalog.get(Some("menu"), "Open").unwrap().translation, "Ouvrir");
        assert!(catalog.get(None, "Open").is_none());

        let files = catalog.get(None, "One file").unwrap();
        assert_eq!(files.original_plural.as_deref(), Some("{n} files"));
        assert_eq!(files.plural_translations, vec!["Un fichier", "{n} fichiers"]);
        assert!(files.is_translated());
        assert_eq!(files.primary_translation(), Some("Un fichier"));
    }

    #[test]
    fn test_complete_header_leaves_full_header_untouched() {
        let mut header = String::from("msgid \"\"\nmsgstr \"\"\n");
        for (key, value) in REQUIRED_HEADERS {
            header.push_str(&format!("\"{key}: {value}\\n\"\n"));
        }
        header.push_str("\nmsgid \"a\"\nmsgstr \"b\"\n");

        let (completed, filled) = complete_header(&header);
        assert!(filled.is_empty());
        assert_eq!(completed, header);
    }

    #[test]
    fn test_multiline_msgid_is_not_a_header() {
        let (completed, filled) = complete_header("msgid \"\"\n\"Long \"\n\"text\"\nmsgstr \"x\"\n");
        assert_eq!(filled.len(), REQUIRED_HEADERS.len());
        assert!(completed.starts_with("msgid \"\"\nmsgstr \"\"\n\"Project-Id-Version"));
    }

    #[test]
    fn test_parse_plural_forms() {
        assert_eq!(
            parse_plural_forms("nplurals=2; plural=(n > 1);"),
            Some((2, "(n > 1)".to_string()))
        );
        assert_eq!(parse_plural_forms("garbage"), None);
    }
}
