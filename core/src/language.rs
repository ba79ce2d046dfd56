//! Language codes and corpus domains.
//!
//! Language codes are stored as free-form map keys on disk, but inside the
//! engine they are a closed enum with an `Unknown` escape hatch so that
//! lookups such as [`Language::display_name`] are total.

use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A language code carried by corpus entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Japanese,
    Korean,
    Chinese,
    Arabic,
    Hindi,
    Urdu,
    Russian,
    Dutch,
    Swedish,
    Norwegian,
    Danish,
    Polish,
    Turkish,
    Hebrew,
    Thai,
    Vietnamese,
    /// Any code outside the table, kept verbatim.
    Unknown(String),
}

/// (language, code, display name) for every known language.
const LANGUAGE_TABLE: &[(Language, &str, &str)] = &[
    (Language::English, "en", "English"),
    (Language::Spanish, "es", "Spanish"),
    (Language::French, "fr", "French"),
    (Language::German, "de", "German"),
    (Language::Italian, "it", "Italian"),
    (Language::Portuguese, "pt", "Portuguese"),
    (Language::Japanese, "ja", "Japanese"),
    (Language::Korean, "ko", "Korean"),
    (Language::Chinese, "zh", "Chinese"),
    (Language::Arabic, "ar", "Arabic"),
    (Language::Hindi, "hi", "Hindi"),
    (Language::Urdu, "ur", "Urdu"),
    (Language::Russian, "ru", "Russian"),
    (Language::Dutch, "nl", "Dutch"),
    (Language::Swedish, "sv", "Swedish"),
    (Language::Norwegian, "no", "Norwegian"),
    (Language::Danish, "da", "Danish"),
    (Language::Polish, "pl", "Polish"),
    (Language::Turkish, "tr", "Turkish"),
    (Language::Hebrew, "he", "Hebrew"),
    (Language::Thai, "th", "Thai"),
    (Language::Vietnamese, "vi", "Vietnamese"),
];

impl Language {
    /// Parse a code. Known codes match case-insensitively; anything else
    /// becomes [`Language::Unknown`] with the trimmed input.
    pub fn from_code(code: &str) -> Self {
        let trimmed = code.trim();
        LANGUAGE_TABLE
            .iter()
            .find(|(_, c, _)| c.eq_ignore_ascii_case(trimmed))
            .map(|(lang, _, _)| lang.clone())
            .unwrap_or_else(|| Self::Unknown(trimmed.to_string()))
    }

    /// The short code used as a key in corpus files.
    pub fn code(&self) -> &str {
        match self {
            Self::Unknown(code) => code,
            known => LANGUAGE_TABLE
                .iter()
                .find(|(lang, _, _)| lang == known)
                .map(|(_, code, _)| *code)
                .unwrap_or_default(),
        }
    }

    /// Human-readable name; unknown codes echo the raw code.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Unknown(code) => code,
            known => LANGUAGE_TABLE
                .iter()
                .find(|(lang, _, _)| lang == known)
                .map(|(_, _, name)| *name)
                .unwrap_or_default(),
        }
    }

    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Every language in the lookup table, in table order.
    pub fn all_known() -> impl Iterator<Item = Language> {
        LANGUAGE_TABLE.iter().map(|(lang, _, _)| lang.clone())
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::from_code(code)
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        match lang {
            Language::Unknown(code) => code,
            known => known.code().to_string(),
        }
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_code(s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// Translation domain a corpus is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Conversational,
    Medical,
    Business,
    Technical,
    News,
    Legal,
    Academic,
    Travel,
    Culinary,
    Education,
    Finance,
    Sports,
    Automotive,
    RealEstate,
    Arts,
    Politics,
    Social,
    Environment,
    Religious,
    Pharmaceutical,
    /// Domain tags written by newer tooling.
    #[serde(other)]
    Other,
}

impl Domain {
    /// Every concrete domain, excluding [`Domain::Other`].
    pub const ALL: [Domain; 20] = [
        Self::Conversational,
        Self::Medical,
        Self::Business,
        Self::Technical,
        Self::News,
        Self::Legal,
        Self::Academic,
        Self::Travel,
        Self::Culinary,
        Self::Education,
        Self::Finance,
        Self::Sports,
        Self::Automotive,
        Self::RealEstate,
        Self::Arts,
        Self::Politics,
        Self::Social,
        Self::Environment,
        Self::Religious,
        Self::Pharmaceutical,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conversational => "conversational",
            Self::Medical => "medical",
            Self::Business => "business",
            Self::Technical => "technical",
            Self::News => "news",
            Self::Legal => "legal",
            Self::Academic => "academic",
            Self::Travel => "travel",
            Self::Culinary => "culinary",
            Self::Education => "education",
            Self::Finance => "finance",
            Self::Sports => "sports",
            Self::Automotive => "automotive",
            Self::RealEstate => "realestate",
            Self::Arts => "arts",
            Self::Politics => "politics",
            Self::Social => "social",
            Self::Environment => "environment",
            Self::Religious => "religious",
            Self::Pharmaceutical => "pharmaceutical",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|domain| domain.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown domain {wanted:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_roundtrip() {
        for lang in Language::all_known() {
            assert_eq!(Language::from_code(lang.code()), lang);
        }
        assert_eq!(Language::all_known().count(), 22);
    }

    #[test]
    fn test_codes_match_case_insensitively() {
        assert_eq!(Language::from_code("ES"), Language::Spanish);
        assert_eq!(Language::from(" ur "), Language::Urdu);
    }

    #[test]
    fn test_unknown_code_echoes_raw_code() {
        let lang = Language::from_code("sw");
        assert_eq!(lang, Language::Unknown("sw".to_string()));
        assert_eq!(lang.display_name(), "sw");
        assert_eq!(lang.code(), "sw");
        assert!(!lang.is_known());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Language::Spanish.display_name(), "Spanish");
        assert_eq!(Language::English.display_name(), "English");
        assert_eq!(Language::Vietnamese.display_name(), "Vietnamese");
    }

    #[test]
    fn test_language_serializes_as_code() {
        let json = serde_json::to_string(&Language::German).unwrap();
        assert_eq!(json, "\"de\"");
        let parsed: Language = serde_json::from_str("\"xx\"").unwrap();
        assert_eq!(parsed, Language::Unknown("xx".to_string()));
    }

    #[test]
    fn test_domain_serde_and_forward_compat() {
        let domain: Domain = serde_json::from_str("\"realestate\"").unwrap();
        assert_eq!(domain, Domain::RealEstate);
        assert_eq!(domain.to_string(), "realestate");

        let future: Domain = serde_json::from_str("\"aerospace\"").unwrap();
        assert_eq!(future, Domain::Other);
    }

    #[test]
    fn test_domain_from_str() {
        assert_eq!("Legal".parse::<Domain>(), Ok(Domain::Legal));
        assert_eq!("realestate".parse::<Domain>(), Ok(Domain::RealEstate));
        assert!("aerospace".parse::<Domain>().is_err());
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>(), Ok(domain));
        }
    }
}
