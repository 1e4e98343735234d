//! Code block language detection.
//!
//! A process-wide registry holds the set of languages auto-detection may
//! choose from. It is initialised once at startup with [`init`] and released
//! with [`teardown`]; nothing is configured implicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Python,
    Java,
    Cpp,
}

impl Language {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Language::Javascript => &[
                "function", "const", "let", "var", "console", "undefined", "typeof", "require",
                "document", "async", "await", "=>",
            ],
            Language::Python => &[
                "def", "elif", "self", "None", "True", "False", "lambda", "print", "__init__",
                "import", "pass",
            ],
            Language::Java => &[
                "public", "class", "static", "void", "String", "System", "private", "extends",
                "implements", "final",
            ],
            Language::Cpp => &[
                "#include", "std", "cout", "cin", "endl", "nullptr", "template", "namespace",
                "vector", "int",
            ],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Javascript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightConfig {
    pub languages: Vec<Language>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            languages: vec![
                Language::Javascript,
                Language::Python,
                Language::Java,
                Language::Cpp,
            ],
        }
    }
}

/// Keyword-scoring language detector
#[derive(Debug, Clone)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    pub fn languages(&self) -> &[Language] {
        &self.config.languages
    }

    /// Best-scoring configured language; ties go to the earlier one.
    pub fn detect(&self, code: &str) -> Option<Language> {
        let words: Vec<&str> = code
            .split(|c: char| c.is_whitespace() || "(){}[];,.<>:\"'".contains(c))
            .filter(|w| !w.is_empty())
            .collect();

        let mut best: Option<(Language, usize)> = None;
        for &language in &self.config.languages {
            let score = words
                .iter()
                .filter(|w| language.keywords().contains(w))
                .count();
            if score == 0 {
                continue;
            }
            if best.map(|(_, top)| score > top).unwrap_or(true) {
                best = Some((language, score));
            }
        }

        best.map(|(language, _)| language)
    }
}

static REGISTRY: RwLock<Option<Highlighter>> = RwLock::new(None);

/// Installs the process-wide configuration. Returns `false` and keeps the
/// existing one if already initialised.
pub fn init(config: HighlightConfig) -> bool {
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if registry.is_some() {
        return false;
    }
    tracing::debug!(languages = ?config.languages, "Highlighter initialised");
    *registry = Some(Highlighter::new(config));
    true
}

pub fn teardown() {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
}

pub fn is_initialized() -> bool {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Detects with the process-wide configuration; `None` before [`init`].
pub fn detect_language(code: &str) -> Option<Language> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .and_then(|h| h.detect(code))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub code: String,
    pub language: Option<Language>,
}

/// Every code block in `markup` with its detected language.
pub fn code_blocks(markup: &str) -> Vec<CodeBlock> {
    diary_markup::code_blocks(markup)
        .into_iter()
        .map(|code| {
            let language = detect_language(&code);
            CodeBlock { code, language }
        })
        .collect()
}
