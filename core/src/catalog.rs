//! Built-in corpus sources and the bundled sample corpora.

use crate::corpus::Corpus;
use crate::corpus::CorpusStore;
use crate::corpus::Entry;
use crate::language::Domain;
use crate::language::Language;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

const SAMPLE_CORPORA: &str = include_str!("../data/sample_corpora.json");

/// Languages every built-in source is expected to cover.
const SOURCE_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "ja", "ko", "zh", "ar", "hi", "ur", "ru",
];

/// (name, display name, description, domain)
const DEFAULT_SOURCES: &[(&str, &str, &str, Domain)] = &[
    (
        "opus_opensubtitles",
        "OpenSubtitles",
        "Movie/TV subtitles - conversational language",
        Domain::Conversational,
    ),
    (
        "medical_terminology",
        "Medical Terms",
        "Medical terminology and healthcare translations",
        Domain::Medical,
    ),
    (
        "business_common",
        "Business Common",
        "Common business phrases and terminology",
        Domain::Business,
    ),
    (
        "technical_computing",
        "Technical Computing",
        "Programming and technical terminology",
        Domain::Technical,
    ),
    (
        "news_current",
        "News & Current Events",
        "News articles and current affairs",
        Domain::News,
    ),
    (
        "legal_formal",
        "Legal & Formal",
        "Legal documents, contracts, and formal communications",
        Domain::Legal,
    ),
    (
        "academic_research",
        "Academic & Research",
        "Academic papers, research terminology, and scholarly language",
        Domain::Academic,
    ),
    (
        "travel_tourism",
        "Travel & Tourism",
        "Travel phrases, tourism, hotels, and transportation",
        Domain::Travel,
    ),
    (
        "culinary_food",
        "Culinary & Food",
        "Food, cooking, restaurants, and culinary terminology",
        Domain::Culinary,
    ),
    (
        "education_learning",
        "Education & Learning",
        "Educational content, classroom language, and learning materials",
        Domain::Education,
    ),
    (
        "finance_banking",
        "Finance & Banking",
        "Financial services, banking, investments, and economic terms",
        Domain::Finance,
    ),
    (
        "sports_fitness",
        "Sports & Fitness",
        "Sports terminology, fitness, and athletic activities",
        Domain::Sports,
    ),
    (
        "automotive_transport",
        "Automotive & Transport",
        "Cars, transportation, mechanics, and automotive industry",
        Domain::Automotive,
    ),
    (
        "real_estate",
        "Real Estate",
        "Property, real estate, housing, and rental terminology",
        Domain::RealEstate,
    ),
    (
        "arts_culture",
        "Arts & Culture",
        "Art, music, literature, and cultural expressions",
        Domain::Arts,
    ),
    (
        "government_politics",
        "Government & Politics",
        "Political terminology, government services, and civic language",
        Domain::Politics,
    ),
    (
        "social_media",
        "Social Media",
        "Social media language, internet slang, and digital communication",
        Domain::Social,
    ),
    (
        "environmental_science",
        "Environmental Science",
        "Environment, climate, ecology, and sustainability terminology",
        Domain::Environment,
    ),
    (
        "religious_spiritual",
        "Religious & Spiritual",
        "Religious texts, spiritual concepts, and faith-based language",
        Domain::Religious,
    ),
    (
        "pharmaceutical",
        "Pharmaceutical",
        "Drug names, pharmacy, medication instructions, and pharmaceutical industry",
        Domain::Pharmaceutical,
    ),
];

/// A named corpus the engine should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusSource {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub domain: Domain,
    pub languages: Vec<Language>,
}

/// Ordered set of corpus sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    sources: Vec<CorpusSource>,
}

impl Catalog {
    pub fn new(sources: Vec<CorpusSource>) -> Self {
        Self { sources }
    }

    /// The twenty built-in domain corpora.
    pub fn default_sources() -> Self {
        let languages: Vec<Language> = SOURCE_LANGUAGES
            .iter()
            .map(|code| Language::from_code(code))
            .collect();
        let sources = DEFAULT_SOURCES
            .iter()
            .map(|(name, display_name, description, domain)| CorpusSource {
                name: (*name).to_string(),
                display_name: (*display_name).to_string(),
                description: (*description).to_string(),
                domain: *domain,
                languages: languages.clone(),
            })
            .collect();
        Self { sources }
    }

    pub fn get(&self, name: &str) -> Option<&CorpusSource> {
        self.sources.iter().find(|source| source.name == name)
    }

    pub fn domain_of(&self, name: &str) -> Option<Domain> {
        self.get(name).map(|source| source.domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorpusSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_sources()
    }
}

/// Per-corpus summary reported by `RetrievalEngine::stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub domain: Domain,
    pub entries: usize,
    pub indexed: bool,
    pub vectors: usize,
}

/// The bundled demonstration corpora, keyed by corpus name.
pub fn sample_corpora() -> crate::corpus::Result<BTreeMap<String, Vec<Entry>>> {
    Ok(serde_json::from_str(SAMPLE_CORPORA)?)
}

/// Write every bundled sample corpus into `store`, tagging each with the
/// catalog domain. Existing files with the same names are replaced.
pub fn seed_samples(store: &CorpusStore, catalog: &Catalog) -> crate::corpus::Result<usize> {
    let samples = sample_corpora()?;
    for (name, entries) in &samples {
        let corpus = Corpus::new(name.clone(), catalog.domain_of(name), entries.clone());
        store.save_corpus(&corpus)?;
        info!("Created {} corpus with {} entries", name, entries.len());
    }
    Ok(samples.len())
}
