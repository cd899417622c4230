//! Country resolution for geolocation comments.
//!
//! Viewers type where they are watching from ("maroc", "Côte d'Ivoire",
//! "974"). [`resolve`] folds accents and case and maps the text to a
//! canonical two-letter code through the names and aliases in
//! [`COUNTRIES`]. Text that matches nothing is reported as
//! [`ResolvedCountry::Unrecognized`]; whether it is kept is up to the
//! dispatcher.

use std::collections::HashMap;
use std::sync::LazyLock;

use unicode_normalization::UnicodeNormalization;

/// A known country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    /// Canonical code.
    pub code: &'static str,
    /// French display name.
    pub name: &'static str,
    /// Flag emoji.
    pub flag: &'static str,
    /// Extra spellings accepted in comments.
    pub aliases: &'static [&'static str],
}

const fn country(
    code: &'static str,
    name: &'static str,
    flag: &'static str,
    aliases: &'static [&'static str],
) -> Country {
    Country {
        code,
        name,
        flag,
        aliases,
    }
}

/// Every country the overlay knows by name.
pub static COUNTRIES: &[Country] = &[
    // Africa
    country("MA", "Maroc", "🇲🇦", &["maroc", "morocco", "maghreb"]),
    country("DZ", "Algérie", "🇩🇿", &["algerie", "algeria", "dz"]),
    country("TN", "Tunisie", "🇹🇳", &["tunisie", "tunisia"]),
    country("LY", "Libye", "🇱🇾", &[]),
    country("EG", "Égypte", "🇪🇬", &["egypte", "egypt"]),
    country("MR", "Mauritanie", "🇲🇷", &[]),
    country("CI", "Côte d'Ivoire", "🇨🇮", &["ci", "ivory coast"]),
    country("SN", "Sénégal", "🇸🇳", &["senegal"]),
    country("ML", "Mali", "🇲🇱", &[]),
    country("GN", "Guinée", "🇬🇳", &["guinea"]),
    country("BF", "Burkina Faso", "🇧🇫", &["burkina"]),
    country("BJ", "Bénin", "🇧🇯", &["benin"]),
    country("TG", "Togo", "🇹🇬", &[]),
    country("NE", "Niger", "🇳🇪", &[]),
    country("CM", "Cameroun", "🇨🇲", &["cameroon", "237"]),
    country("CD", "RDC", "🇨🇩", &["congo rdc", "dr congo", "kinshasa"]),
    country("CG", "Congo", "🇨🇬", &["brazzaville"]),
    country("GA", "Gabon", "🇬🇦", &[]),
    country("TD", "Tchad", "🇹🇩", &[]),
    country("CF", "Centrafrique", "🇨🇫", &[]),
    country("GQ", "Guinée Équatoriale", "🇬🇶", &[]),
    country("MG", "Madagascar", "🇲🇬", &[]),
    country("KM", "Comores", "🇰🇲", &[]),
    country("MU", "Maurice", "🇲🇺", &[]),
    country("RE", "Réunion", "🇷🇪", &["974"]),
    country("RW", "Rwanda", "🇷🇼", &[]),
    country("BI", "Burundi", "🇧🇮", &[]),
    country("DJ", "Djibouti", "🇩🇯", &[]),
    country("ZA", "Afrique du Sud", "🇿🇦", &["south africa"]),
    country("NG", "Nigeria", "🇳🇬", &[]),
    country("GH", "Ghana", "🇬🇭", &[]),
    country("KE", "Kenya", "🇰🇪", &[]),
    country("AO", "Angola", "🇦🇴", &[]),
    country("ET", "Éthiopie", "🇪🇹", &[]),
    // Europe
    country("FR", "France", "🇫🇷", &["fr", "paris"]),
    country("BE", "Belgique", "🇧🇪", &["belgium"]),
    country("CH", "Suisse", "🇨🇭", &["switzerland"]),
    country("DE", "Allemagne", "🇩🇪", &["germany", "berlin", "deutschland"]),
    country("IT", "Italie", "🇮🇹", &["italy", "italia"]),
    country("ES", "Espagne", "🇪🇸", &["spain", "espana"]),
    country("PT", "Portugal", "🇵🇹", &[]),
    country("GB", "Royaume-Uni", "🇬🇧", &["uk", "united kingdom", "angleterre", "england", "londres"]),
    country("NL", "Pays-Bas", "🇳🇱", &["netherlands", "hollande", "holland"]),
    country("LU", "Luxembourg", "🇱🇺", &[]),
    country("RU", "Russie", "🇷🇺", &["russia"]),
    country("UA", "Ukraine", "🇺🇦", &[]),
    country("PL", "Pologne", "🇵🇱", &["poland"]),
    country("SE", "Suède", "🇸🇪", &["sweden"]),
    country("NO", "Norvège", "🇳🇴", &["norway"]),
    country("DK", "Danemark", "🇩🇰", &["denmark"]),
    country("GR", "Grèce", "🇬🇷", &["greece"]),
    country("TR", "Turquie", "🇹🇷", &["turkey"]),
    // Americas
    country("CA", "Canada", "🇨🇦", &["quebec"]),
    country("US", "USA", "🇺🇸", &["etats-unis", "united states", "amerique"]),
    country("MX", "Mexique", "🇲🇽", &["mexico"]),
    country("BR", "Brésil", "🇧🇷", &["brazil", "brasil"]),
    country("AR", "Argentine", "🇦🇷", &["argentina"]),
    country("CO", "Colombie", "🇨🇴", &["colombia"]),
    country("CL", "Chili", "🇨🇱", &["chile"]),
    country("PE", "Pérou", "🇵🇪", &[]),
    country("HT", "Haïti", "🇭🇹", &["haiti"]),
    country("GP", "Guadeloupe", "🇬🇵", &["971"]),
    country("MQ", "Martinique", "🇲🇶", &["972"]),
    country("GF", "Guyane", "🇬🇫", &["973"]),
    // Asia and Oceania
    country("CN", "Chine", "🇨🇳", &["china"]),
    country("JP", "Japon", "🇯🇵", &["japan"]),
    country("KR", "Corée du Sud", "🇰🇷", &["korea"]),
    country("IN", "Inde", "🇮🇳", &["india"]),
    country("AE", "Dubaï / Émirats", "🇦🇪", &["dubai", "uae", "emirates"]),
    country("SA", "Arabie Saoudite", "🇸🇦", &["saudi"]),
    country("QA", "Qatar", "🇶🇦", &[]),
    country("IL", "Israël", "🇮🇱", &["israel"]),
    country("AU", "Australie", "🇦🇺", &["australia"]),
    country("TH", "Thaïlande", "🇹🇭", &["thailand"]),
    country("VN", "Vietnam", "🇻🇳", &[]),
    country("ID", "Indonésie", "🇮🇩", &["indonesia"]),
];

/// Normalized name, alias, or lowercase code to canonical code.
static LOOKUP: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for c in COUNTRIES {
        map.insert(c.code.to_ascii_lowercase(), c.code);
        map.insert(normalize(c.name), c.code);
        for alias in c.aliases {
            map.insert(normalize(alias), c.code);
        }
    }
    map
});

/// Result of resolving free text to a country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCountry {
    /// A known country, by canonical code.
    Known(&'static str),
    /// Non-empty text that matches no known country, trimmed.
    Unrecognized(String),
    /// Blank input.
    Empty,
}

/// Fold `input` for comparison: decompose, strip combining accents,
/// lowercase, trim.
pub fn normalize(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !('\u{300}'..='\u{36f}').contains(c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_owned()
}

/// Resolve free text to a country.
pub fn resolve(input: &str) -> ResolvedCountry {
    let key = normalize(input);
    if key.is_empty() {
        return ResolvedCountry::Empty;
    }
    LOOKUP.get(&key).copied().map_or_else(
        || ResolvedCountry::Unrecognized(input.trim().to_owned()),
        ResolvedCountry::Known,
    )
}

/// Look up a known country by canonical code.
pub fn find(code: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.code == code)
}

/// Display name and flag for a country code, as shown on the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryInfo {
    /// Display name.
    pub name: String,
    /// Flag emoji.
    pub flag: String,
}

/// Display information for `code`.
///
/// Unknown codes display as themselves with a globe; a missing code
/// displays as unknown.
pub fn country_info(code: Option<&str>) -> CountryInfo {
    match code {
        None => CountryInfo {
            name: "Inconnu".to_owned(),
            flag: "\u{2753}".to_owned(),
        },
        Some(code) => find(code).map_or_else(
            || CountryInfo {
                name: code.to_owned(),
                flag: "\u{1f30d}".to_owned(),
            },
            |c| CountryInfo {
                name: c.name.to_owned(),
                flag: c.flag.to_owned(),
            },
        ),
    }
}
