use crate::error::{Error, Result};

pub const SEPARATOR: char = '-';

/// Frozen language -> territory assumptions used to complete two-letter codes.
///
/// This is a compatibility table, not locale data: `zh` maps to the `Hans`
/// script tag for every Chinese variant and `xx` is the explicit "unset" sentinel.
const TERRITORIES: &[(&str, &str)] = &[
    ("af", "ZA"),
    ("ar", "AR"),
    ("ay", "BO"),
    ("az", "AZ"),
    ("be", "BY"),
    ("bg", "BG"),
    ("bn", "IN"),
    ("bs", "BA"),
    ("ca", "ES"),
    ("ck", "US"),
    ("cs", "CZ"),
    ("cy", "GB"),
    ("da", "DK"),
    ("de", "DE"),
    ("el", "GR"),
    ("en", "GB"),
    ("eo", "EO"),
    ("es", "ES"),
    ("et", "EE"),
    ("eu", "ES"),
    ("fa", "IR"),
    ("fi", "FI"),
    ("fo", "FO"),
    ("fr", "FR"),
    ("fy", "NL"),
    ("ga", "IE"),
    ("gl", "ES"),
    ("gn", "PY"),
    ("gu", "IN"),
    ("gx", "GR"),
    ("he", "IL"),
    ("hi", "IN"),
    ("hr", "HR"),
    ("hu", "HU"),
    ("hy", "AM"),
    ("id", "ID"),
    ("is", "IS"),
    ("it", "IT"),
    ("ja", "JP"),
    ("jv", "ID"),
    ("ka", "GE"),
    ("kk", "KZ"),
    ("km", "KH"),
    ("kn", "IN"),
    ("ko", "KR"),
    ("ku", "TR"),
    ("la", "VA"),
    ("li", "NL"),
    ("lo", "LA"),
    ("lt", "LT"),
    ("lv", "LV"),
    ("mg", "MG"),
    ("mk", "MK"),
    ("ml", "IN"),
    ("mn", "MN"),
    ("mr", "IN"),
    ("ms", "MY"),
    ("mt", "MT"),
    ("nb", "NO"),
    ("ne", "NP"),
    ("nl", "NL"),
    ("nn", "NO"),
    ("or", "IN"),
    ("pa", "IN"),
    ("pl", "PL"),
    ("ps", "AF"),
    ("pt", "PT"),
    ("qu", "PE"),
    ("rm", "CH"),
    ("ro", "RO"),
    ("ru", "RU"),
    ("sa", "IN"),
    ("se", "NO"),
    ("si", "LK"),
    ("sk", "SK"),
    ("sl", "SI"),
    ("so", "SO"),
    ("sq", "AL"),
    ("sr", "RS"),
    ("sv", "SE"),
    ("sw", "KE"),
    ("ta", "IN"),
    ("te", "IN"),
    ("tg", "TJ"),
    ("th", "TH"),
    ("tl", "PH"),
    ("tr", "TR"),
    ("tt", "RU"),
    ("uk", "UA"),
    ("ur", "PK"),
    ("uz", "UZ"),
    ("vi", "VN"),
    ("xh", "ZA"),
    ("xx", "XX"),
    ("yi", "DE"),
    ("zh", "Hans"),
    ("zu", "ZA"),
];

/// Territory (or script) assumed for a bare two-letter language code.
pub fn territory_for(language: &str) -> Option<&'static str> {
    TERRITORIES
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, territory)| *territory)
}

/// Complete a locale identifier to its canonical `language-TERRITORY` form.
///
/// Two-character input is a bare language code and gets its territory from the
/// table; anything else only has its `_`/`-` separators canonicalised.
pub fn normalize(code: &str) -> Result<String> {
    if code.chars().count() == 2 {
        let territory =
            territory_for(code).ok_or_else(|| Error::UnknownLanguage(code.to_string()))?;
        return Ok(format!("{code}{SEPARATOR}{territory}"));
    }

    Ok(code.replace(['-', '_'], &SEPARATOR.to_string()))
}

/// `en-GB` -> `en_GB`, the form used in directory and file names.
pub fn to_underscore(locale: &str) -> String {
    locale.replace('-', "_")
}
