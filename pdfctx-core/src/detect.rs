//! Locale detection: explicit > filename > content > default.
//!
//! Detection never fails. When nothing points at a locale the configured
//! default is returned so parsing can always proceed.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::UnknownLocaleError;
use crate::locale::{LocaleCode, list_locales};

/// Minimum keyword coverage for content detection to be trusted.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.30;

pub const DEFAULT_LOCALE: LocaleCode = LocaleCode::Fr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Explicit,
    Filename,
    Content,
    Default,
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DetectionMethod::Explicit => "explicit",
            DetectionMethod::Filename => "filename",
            DetectionMethod::Content => "content",
            DetectionMethod::Default => "default",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionResult {
    pub locale: LocaleCode,
    pub method: DetectionMethod,
    /// Keyword coverage for content detection, `0.0` for the default,
    /// absent for explicit and filename resolution.
    pub confidence: Option<f64>,
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.method, self.confidence) {
            (DetectionMethod::Content, Some(c)) => write!(
                f,
                "{} via content (confidence: {:.2}%)",
                self.locale,
                c * 100.0
            ),
            (method, _) => write!(f, "{} via {}", self.locale, method),
        }
    }
}

/// Keyword coverage of one locale over a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocaleScore {
    pub locale: LocaleCode,
    pub matched: usize,
    pub total: usize,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct LocaleDetector {
    default_locale: LocaleCode,
    confidence_threshold: f64,
}

impl Default for LocaleDetector {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl LocaleDetector {
    /// Detector falling back to `default_locale`.
    pub fn new(default_locale: &str) -> Result<Self, UnknownLocaleError> {
        Ok(Self {
            default_locale: default_locale.parse()?,
            ..Self::default()
        })
    }

    /// Override the content threshold (clamped to `[0, 1]`).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = if threshold.is_nan() {
            DEFAULT_CONFIDENCE_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }

    pub fn default_locale(&self) -> LocaleCode {
        self.default_locale
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// First locale (registry order) with a marker in the file name.
    pub fn detect_from_filename(&self, filename: &str) -> Option<LocaleCode> {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename);
        list_locales()
            .iter()
            .find(|cfg| cfg.matches_filename(name))
            .map(|cfg| cfg.code)
    }

    /// Keyword coverage for every locale, in registry order.
    pub fn score_content(&self, text: &str) -> Vec<LocaleScore> {
        let lowered = text.to_lowercase();
        list_locales()
            .iter()
            .map(|cfg| {
                let matched = cfg.keywords.iter().filter(|k| lowered.contains(*k)).count();
                let total = cfg.keywords.len();
                LocaleScore {
                    locale: cfg.code,
                    matched,
                    total,
                    score: if total == 0 {
                        0.0
                    } else {
                        matched as f64 / total as f64
                    },
                }
            })
            .collect()
    }

    /// Best-covered locale if its coverage reaches the threshold.
    /// Ties go to the earlier locale in registry order.
    pub fn detect_from_content(&self, text: &str) -> Option<LocaleScore> {
        if text.trim().is_empty() {
            return None;
        }
        let mut best: Option<LocaleScore> = None;
        for s in self.score_content(text) {
            match best {
                Some(b) if s.score <= b.score => {}
                _ => best = Some(s),
            }
        }
        best.filter(|b| b.score >= self.confidence_threshold)
    }

    /// Resolve the effective locale for one document.
    pub fn detect(
        &self,
        filename: &str,
        document_text: Option<&str>,
        explicit: Option<LocaleCode>,
        auto_detect: bool,
    ) -> DetectionResult {
        if let Some(locale) = explicit {
            log::debug!("locale {locale} given explicitly");
            return DetectionResult {
                locale,
                method: DetectionMethod::Explicit,
                confidence: None,
            };
        }

        if auto_detect {
            if let Some(locale) = self.detect_from_filename(filename) {
                log::debug!("locale {locale} from file name {filename:?}");
                return DetectionResult {
                    locale,
                    method: DetectionMethod::Filename,
                    confidence: None,
                };
            }

            if let Some(best) = document_text.and_then(|t| self.detect_from_content(t)) {
                log::debug!(
                    "locale {} from content ({}/{} keywords)",
                    best.locale,
                    best.matched,
                    best.total
                );
                return DetectionResult {
                    locale: best.locale,
                    method: DetectionMethod::Content,
                    confidence: Some(best.score),
                };
            }
        }

        log::debug!("falling back to default locale {}", self.default_locale);
        DetectionResult {
            locale: self.default_locale,
            method: DetectionMethod::Default,
            confidence: Some(0.0),
        }
    }

    /// Like [`detect`](Self::detect), taking the explicit locale as text.
    ///
    /// A blank explicit locale counts as absent; an unknown one is an error.
    pub fn resolve(
        &self,
        filename: &str,
        document_text: Option<&str>,
        explicit: Option<&str>,
        auto_detect: bool,
    ) -> Result<DetectionResult, UnknownLocaleError> {
        let explicit = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(code) => Some(code.parse::<LocaleCode>()?),
            None => None,
        };
        Ok(self.detect(filename, document_text, explicit, auto_detect))
    }
}
