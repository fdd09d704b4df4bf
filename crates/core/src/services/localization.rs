//! Localized exhibit content with per-language fallback chains.

use std::fmt;

use museum_db::entities::exhibit;
use serde::{Deserialize, Serialize};

/// Content language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ru,
    Uz,
    En,
    Ar,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Self; 4] = [Self::Ru, Self::Uz, Self::En, Self::Ar];

    /// Two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::Uz => "uz",
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Parse a language tag. Region variants such as `en-US` or `uz_Latn`
    /// resolve to their base language.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let base = tag.trim().split(['-', '_']).next()?;
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(base))
    }

    /// Best supported language of an `Accept-Language` header.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut best: Option<(Self, f32)> = None;
        for item in header.split(',') {
            let mut parts = item.split(';');
            let Some(lang) = parts.next().and_then(Self::parse) else {
                continue;
            };
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if quality > 0.0 && best.is_none_or(|(_, q)| quality > q) {
                best = Some((lang, quality));
            }
        }
        best.map(|(lang, _)| lang)
    }

    /// Lookup order for titles, subtitles and descriptions.
    #[must_use]
    pub const fn text_chain(self) -> [Self; 3] {
        match self {
            Self::Ru => [Self::Ru, Self::En, Self::Uz],
            Self::Uz => [Self::Uz, Self::Ru, Self::En],
            Self::En => [Self::En, Self::Ru, Self::Uz],
            Self::Ar => [Self::Ar, Self::Ru, Self::Uz],
        }
    }

    /// Lookup order for narration tracks. There is no Arabic track.
    #[must_use]
    pub const fn audio_chain(self) -> [Self; 3] {
        match self {
            Self::Ar => [Self::Ru, Self::En, Self::Uz],
            other => other.text_chain(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Pick the display language of a request.
///
/// An explicit `lang` parameter wins when supported, then the language
/// cookie, then `Accept-Language`, then `default`.
#[must_use]
pub fn resolve_language(
    explicit: Option<&str>,
    cookie: Option<&str>,
    accept_language: Option<&str>,
    default: Language,
) -> Language {
    explicit
        .and_then(Language::parse)
        .or_else(|| cookie.and_then(Language::parse))
        .or_else(|| accept_language.and_then(Language::from_accept_language))
        .unwrap_or(default)
}

/// First candidate that is present and non-empty.
pub fn first_filled<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

/// One field in each language. `None` marks a language the field lacks.
#[derive(Debug, Clone, Copy)]
pub struct Variants<'a> {
    pub ru: Option<&'a str>,
    pub uz: Option<&'a str>,
    pub en: Option<&'a str>,
    pub ar: Option<&'a str>,
}

impl<'a> Variants<'a> {
    /// Value in one language.
    #[must_use]
    pub const fn get(&self, lang: Language) -> Option<&'a str> {
        match lang {
            Language::Ru => self.ru,
            Language::Uz => self.uz,
            Language::En => self.en,
            Language::Ar => self.ar,
        }
    }

    /// First filled value along `chain`.
    #[must_use]
    pub fn resolve(&self, chain: &[Language]) -> Option<&'a str> {
        first_filled(chain.iter().map(|&lang| self.get(lang)))
    }
}

fn titles(e: &exhibit::Model) -> Variants<'_> {
    Variants {
        ru: Some(e.title_ru.as_str()),
        uz: Some(e.title_uz.as_str()),
        en: Some(e.title_en.as_str()),
        ar: Some(e.title_ar.as_str()),
    }
}

fn sub_titles(e: &exhibit::Model) -> Variants<'_> {
    Variants {
        ru: Some(e.sub_title_ru.as_str()),
        uz: Some(e.sub_title_uz.as_str()),
        en: Some(e.sub_title_en.as_str()),
        ar: Some(e.sub_title_ar.as_str()),
    }
}

fn descriptions(e: &exhibit::Model) -> Variants<'_> {
    Variants {
        ru: Some(e.description_ru.as_str()),
        uz: Some(e.description_uz.as_str()),
        en: Some(e.description_en.as_str()),
        ar: Some(e.description_ar.as_str()),
    }
}

fn audio(e: &exhibit::Model) -> Variants<'_> {
    Variants {
        ru: e.audio_ru.as_deref(),
        uz: e.audio_uz.as_deref(),
        en: e.audio_en.as_deref(),
        ar: None,
    }
}

/// Exhibit text resolved for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedContent {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// Storage key of the narration track.
    pub audio: Option<String>,
}

impl LocalizedContent {
    /// Resolve all display fields of an exhibit. Never fails: missing text
    /// falls back to the exhibit code or to an empty string.
    #[must_use]
    pub fn resolve(exhibit: &exhibit::Model, lang: Language) -> Self {
        let chain = lang.text_chain();
        let descriptions = descriptions(exhibit);

        let subtitle = sub_titles(exhibit)
            .resolve(&chain)
            .or_else(|| first_filled([descriptions.get(lang)]))
            .unwrap_or_default();

        Self {
            title: titles(exhibit)
                .resolve(&chain)
                .unwrap_or(exhibit.slug.as_str())
                .to_string(),
            subtitle: subtitle.to_string(),
            description: descriptions.resolve(&chain).unwrap_or_default().to_string(),
            audio: audio(exhibit)
                .resolve(&lang.audio_chain())
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use museum_db::test_utils::fixtures;

    fn exhibit() -> exhibit::Model {
        let mut e = fixtures::exhibit("e1", "ISC-REN2-1.0001");
        e.title_ru = String::new();
        e.title_en = "Statue".to_string();
        e.title_uz = "Haykal".to_string();
        e
    }

    #[test]
    fn test_parse() {
        assert_eq!(Language::parse("ru"), Some(Language::Ru));
        assert_eq!(Language::parse("EN-us"), Some(Language::En));
        assert_eq!(Language::parse("uz_Latn"), Some(Language::Uz));
        assert_eq!(Language::parse("ar"), Some(Language::Ar));
        assert_eq!(Language::parse("de"), None);
        assert_eq!(Language::parse(""), None);
    }

    #[test]
    fn test_accept_language() {
        assert_eq!(
            Language::from_accept_language("de-DE,de;q=0.9,en;q=0.8,ru;q=0.7"),
            Some(Language::En)
        );
        assert_eq!(
            Language::from_accept_language("ru;q=0.5, uz;q=0.9"),
            Some(Language::Uz)
        );
        assert_eq!(Language::from_accept_language("fr, de"), None);
        assert_eq!(Language::from_accept_language("en;q=0"), None);
    }

    #[test]
    fn test_resolve_language_precedence() {
        let default = Language::Ru;
        assert_eq!(
            resolve_language(Some("uz"), Some("en"), Some("ar"), default),
            Language::Uz
        );
        assert_eq!(
            resolve_language(Some("xx"), Some("en"), Some("ar"), default),
            Language::En
        );
        assert_eq!(resolve_language(None, None, Some("ar"), default), Language::Ar);
        assert_eq!(resolve_language(None, None, None, default), Language::Ru);
    }

    #[test]
    fn test_title_fallbacks() {
        let e = exhibit();
        assert_eq!(LocalizedContent::resolve(&e, Language::Ru).title, "Statue");
        assert_eq!(LocalizedContent::resolve(&e, Language::Uz).title, "Haykal");
        assert_eq!(LocalizedContent::resolve(&e, Language::En).title, "Statue");
        // ar -> ru -> uz
        assert_eq!(LocalizedContent::resolve(&e, Language::Ar).title, "Haykal");
    }

    #[test]
    fn test_title_falls_back_to_slug() {
        let mut e = exhibit();
        e.title_en.clear();
        e.title_uz.clear();
        for lang in Language::ALL {
            assert_eq!(LocalizedContent::resolve(&e, lang).title, "ISC-REN2-1.0001");
        }
    }

    #[test]
    fn test_subtitle_uses_description_last() {
        let mut e = exhibit();
        e.description_uz = "Tavsif".to_string();
        e.description_ru = "Описание".to_string();

        let uz = LocalizedContent::resolve(&e, Language::Uz);
        assert_eq!(uz.subtitle, "Tavsif");
        assert_eq!(uz.description, "Tavsif");

        // No English description: subtitle stays empty, description falls back
        let en = LocalizedContent::resolve(&e, Language::En);
        assert_eq!(en.subtitle, "");
        assert_eq!(en.description, "Описание");

        e.sub_title_en = "Bronze".to_string();
        assert_eq!(LocalizedContent::resolve(&e, Language::Uz).subtitle, "Bronze");
    }

    #[test]
    fn test_audio_chains() {
        let mut e = exhibit();
        assert_eq!(LocalizedContent::resolve(&e, Language::Ru).audio, None);

        e.audio_uz = Some("exhibits/x/audio/uz/a.mp3".to_string());
        e.audio_en = Some("exhibits/x/audio/en/b.mp3".to_string());

        assert_eq!(
            LocalizedContent::resolve(&e, Language::Ru).audio.as_deref(),
            Some("exhibits/x/audio/en/b.mp3")
        );
        assert_eq!(
            LocalizedContent::resolve(&e, Language::Uz).audio.as_deref(),
            Some("exhibits/x/audio/uz/a.mp3")
        );
        // Arabic has no track of its own: ru -> en -> uz
        assert_eq!(
            LocalizedContent::resolve(&e, Language::Ar).audio.as_deref(),
            Some("exhibits/x/audio/en/b.mp3")
        );

        e.audio_en = Some(String::new());
        assert_eq!(
            LocalizedContent::resolve(&e, Language::Ar).audio.as_deref(),
            Some("exhibits/x/audio/uz/a.mp3")
        );
    }

    #[test]
    fn test_first_filled() {
        assert_eq!(first_filled([None, Some(""), Some("a"), Some("b")]), Some("a"));
        assert_eq!(first_filled([None, Some("")]), None);
    }
}
