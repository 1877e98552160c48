//! Locale tags and the scoped process-default locale.
//!
//! The default locale is not mutated ad hoc: a [`LocaleGuard`] installs an
//! override and removes exactly that override when dropped, including during
//! unwinding.
//!
//! # Tag grammar
//!
//! A subset of BCP 47: `language[-Script][-REGION][-variant...]`, where
//! language is 2-3 (or 5-8) letters, script is 4 letters, region is 2 letters
//! or 3 digits, and each variant is 5-8 alphanumerics or a digit followed by
//! 3 alphanumerics.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::random::RandomStream;

/// Sentinel value that asks for a random locale.
pub const RANDOM_LOCALE: &str = "random";

/// Fallback when the environment names no usable locale.
pub const FALLBACK_LOCALE: &str = "en-US";

/// Locales a random pick is drawn from.
pub const AVAILABLE_LOCALES: &[&str] = &[
    "ar-EG", "ar-SA", "be-BY", "bg-BG", "ca-ES", "cs-CZ", "da-DK", "de-AT", "de-CH", "de-DE",
    "el-GR", "en-AU", "en-CA", "en-GB", "en-IE", "en-IN", "en-US", "es-AR", "es-ES", "es-MX",
    "et-EE", "fi-FI", "fr-BE", "fr-CA", "fr-CH", "fr-FR", "ga-IE", "he-IL", "hi-IN", "hr-HR",
    "hu-HU", "id-ID", "is-IS", "it-IT", "ja-JP", "ko-KR", "lt-LT", "lv-LV", "mk-MK", "ms-MY",
    "mt-MT", "nl-NL", "no-NO", "pl-PL", "pt-BR", "pt-PT", "ro-RO", "ru-RU", "sk-SK", "sl-SI",
    "sq-AL", "sr-Latn-RS", "sv-SE", "th-TH", "tr-TR", "uk-UA", "vi-VN", "zh-Hans-CN",
    "zh-Hant-TW",
];

/// A parsed, case-canonicalized locale tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    script: Option<String>,
    region: Option<String>,
    variants: Vec<String>,
}

impl Locale {
    /// Parses a `-`-separated language tag.
    ///
    /// # Errors
    /// Returns [`HarnessError::InvalidLocale`] if the tag is malformed.
    pub fn parse(tag: &str) -> Result<Self> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(HarnessError::invalid_locale(tag, "empty tag"));
        }

        let mut subtags = trimmed.split('-').peekable();

        let language = match subtags.next() {
            Some(lang) if is_language(lang) => lang.to_ascii_lowercase(),
            Some(lang) => {
                return Err(HarnessError::invalid_locale(
                    tag,
                    format!("{lang:?} is not a language subtag"),
                ));
            }
            None => return Err(HarnessError::invalid_locale(tag, "missing language")),
        };

        let script = match subtags.peek() {
            Some(s) if is_script(s) => {
                let s = titlecase(s);
                subtags.next();
                Some(s)
            }
            _ => None,
        };

        let region = match subtags.peek() {
            Some(r) if is_region(r) => {
                let r = r.to_ascii_uppercase();
                subtags.next();
                Some(r)
            }
            _ => None,
        };

        let mut variants = Vec::new();
        for subtag in subtags {
            if !is_variant(subtag) {
                return Err(HarnessError::invalid_locale(
                    tag,
                    format!("{subtag:?} is not a valid subtag"),
                ));
            }
            variants.push(subtag.to_ascii_lowercase());
        }

        Ok(Self {
            language,
            script,
            region,
            variants,
        })
    }

    /// Parses a POSIX locale name such as `de_DE.UTF-8` or `fr_CA@euro`.
    ///
    /// `C` and `POSIX` have no language and are rejected.
    ///
    /// # Errors
    /// Returns [`HarnessError::InvalidLocale`] if the name is unusable.
    pub fn from_posix(name: &str) -> Result<Self> {
        let base = name
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .trim();
        if base.eq_ignore_ascii_case("C") || base.eq_ignore_ascii_case("POSIX") {
            return Err(HarnessError::invalid_locale(name, "no language in C locale"));
        }
        Self::parse(&base.replace('_', "-"))
    }

    /// Picks a locale from [`AVAILABLE_LOCALES`].
    pub fn random(stream: &mut RandomStream) -> Self {
        stream
            .pick(AVAILABLE_LOCALES)
            .and_then(|tag| Self::parse(tag).ok())
            .unwrap_or_else(Self::fallback)
    }

    /// Returns `en-US`.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            language: "en".to_string(),
            script: None,
            region: Some("US".to_string()),
            variants: Vec::new(),
        }
    }

    /// Language subtag, lowercase.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Script subtag, titlecase.
    #[must_use]
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Region subtag, uppercase.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Variant subtags, lowercase.
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Formats the locale as a language tag.
    #[must_use]
    pub fn to_language_tag(&self) -> String {
        let mut tag = self.language.clone();
        for part in self
            .script
            .iter()
            .chain(self.region.iter())
            .chain(self.variants.iter())
        {
            tag.push('-');
            tag.push_str(part);
        }
        tag
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_language_tag())
    }
}

impl FromStr for Locale {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Locale {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_language_tag())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Self::parse(&tag).map_err(serde::de::Error::custom)
    }
}

fn is_language(s: &str) -> bool {
    matches!(s.len(), 2..=3 | 5..=8) && s.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_script(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_region(s: &str) -> bool {
    (s.len() == 2 && s.bytes().all(|b| b.is_ascii_alphabetic()))
        || (s.len() == 3 && s.bytes().all(|b| b.is_ascii_digit()))
}

fn is_variant(s: &str) -> bool {
    let alnum = s.bytes().all(|b| b.is_ascii_alphanumeric());
    match s.len() {
        5..=8 => alnum,
        4 => alnum && s.as_bytes()[0].is_ascii_digit(),
        _ => false,
    }
}

fn titlecase(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// How the locale for a suite is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocaleSetting {
    /// Draw one from [`AVAILABLE_LOCALES`] with the suite's random stream.
    #[default]
    Random,
    /// Use this locale.
    Explicit(Locale),
}

impl LocaleSetting {
    /// Parses a configuration value: `"random"` (any case) or a language tag.
    ///
    /// # Errors
    /// Returns [`HarnessError::InvalidLocale`] for malformed tags.
    pub fn parse(value: &str) -> Result<Self> {
        if value.trim().eq_ignore_ascii_case(RANDOM_LOCALE) {
            Ok(Self::Random)
        } else {
            Locale::parse(value).map(Self::Explicit)
        }
    }

    /// Resolves the setting to a concrete locale.
    pub fn resolve(&self, stream: &mut RandomStream) -> Locale {
        match self {
            Self::Random => Locale::random(stream),
            Self::Explicit(locale) => locale.clone(),
        }
    }
}

static GLOBAL_REGISTRY: LazyLock<Arc<LocaleRegistry>> =
    LazyLock::new(|| Arc::new(LocaleRegistry::new(detect_system_locale())));

/// Holder of a default locale.
///
/// The process-wide instance is [`LocaleRegistry::global`]; independent
/// registries can be created for isolated use.
///
/// Overrides are kept as a stack keyed by guard. The current default is the
/// most recent live override, or the base locale when none is live. Dropping
/// a guard removes only its own override, so guards held by concurrent suites
/// may be dropped in any order and the base locale is back once all are gone.
#[derive(Debug)]
pub struct LocaleRegistry {
    state: RwLock<Overrides>,
    next_token: AtomicU64,
}

#[derive(Debug)]
struct Overrides {
    base: Locale,
    installed: Vec<(u64, Locale)>,
}

impl Overrides {
    fn current(&self) -> &Locale {
        self.installed
            .last()
            .map_or(&self.base, |(_, locale)| locale)
    }
}

impl LocaleRegistry {
    /// Creates a registry with the given default.
    #[must_use]
    pub fn new(initial: Locale) -> Self {
        Self {
            state: RwLock::new(Overrides {
                base: initial,
                installed: Vec::new(),
            }),
            next_token: AtomicU64::new(0),
        }
    }

    /// Returns the process-wide registry, seeded from the environment.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Returns the current default locale.
    #[must_use]
    pub fn current(&self) -> Locale {
        self.state.read().current().clone()
    }

    /// Number of overrides currently installed.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.state.read().installed.len()
    }

    /// Installs `locale` until the returned guard is dropped.
    #[must_use = "the override is reverted as soon as the guard is dropped"]
    pub fn install(self: &Arc<Self>, locale: Locale) -> LocaleGuard {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.write();
        let previous = state.current().clone();
        state.installed.push((token, locale.clone()));
        tracing::debug!(previous = %previous, installed = %locale, "default locale overridden");
        LocaleGuard {
            registry: Arc::clone(self),
            token,
            previous,
        }
    }
}

/// Removes its override from the registry when dropped.
#[derive(Debug)]
pub struct LocaleGuard {
    registry: Arc<LocaleRegistry>,
    token: u64,
    previous: Locale,
}

impl LocaleGuard {
    /// Default that was in effect when this guard was installed.
    #[must_use]
    pub const fn previous(&self) -> &Locale {
        &self.previous
    }
}

impl Drop for LocaleGuard {
    fn drop(&mut self) {
        let mut state = self.registry.state.write();
        state.installed.retain(|(token, _)| *token != self.token);
        tracing::debug!(restored = %state.current(), "default locale override removed");
    }
}

/// Reads the system locale from `LC_ALL`, `LC_MESSAGES` then `LANG`.
#[must_use]
pub fn detect_system_locale() -> Locale {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter(|value| !value.trim().is_empty())
        .find_map(|value| Locale::from_posix(&value).ok())
        .unwrap_or_else(Locale::fallback)
}
