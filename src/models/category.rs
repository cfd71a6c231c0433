// src/models/category.rs

//! News categories and content languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Language of a content collection. Each one owns a `<code>/contents.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Cn,
    Jp,
    Kp,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Cn, Language::Jp, Language::Kp];

    /// Language the scraper writes; translations are produced from it.
    pub const CANONICAL: Language = Language::En;

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Cn => "cn",
            Language::Jp => "jp",
            Language::Kp => "kp",
        }
    }

    /// Native name, used when instructing the translator.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Cn => "中文",
            Language::Jp => "日本語",
            Language::Kp => "조선어",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::validation(format!("Unknown language code: {s}")))
    }
}

/// The closed set of news categories published by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Articles,
    BriefingsStatements,
    FactSheets,
    PresidentialActions,
    Remarks,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Articles,
        Category::BriefingsStatements,
        Category::FactSheets,
        Category::PresidentialActions,
        Category::Remarks,
    ];

    /// English label, as it appears on the source site and in `en/contents.json`.
    pub fn label(self) -> &'static str {
        self.localized(Language::En)
    }

    /// URL path segment used by the front-end.
    pub fn uri(self) -> &'static str {
        match self {
            Category::Articles => "articles",
            Category::BriefingsStatements => "briefings-statements",
            Category::FactSheets => "fact-sheets",
            Category::PresidentialActions => "presidential-actions",
            Category::Remarks => "remarks",
        }
    }

    /// Label stored in the `category` field of a language's collection.
    pub fn localized(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Category::Articles, Language::En) => "Articles",
            (Category::Articles, Language::Cn) => "文章",
            (Category::Articles, Language::Jp) => "記事",
            (Category::Articles, Language::Kp) => "기사",
            (Category::BriefingsStatements, Language::En) => "Briefings & Statements",
            (Category::BriefingsStatements, Language::Cn) => "简报和声明",
            (Category::BriefingsStatements, Language::Jp) => "ブリーフィングと声明",
            (Category::BriefingsStatements, Language::Kp) => "브리핑과 성명",
            (Category::FactSheets, Language::En) => "Fact Sheets",
            (Category::FactSheets, Language::Cn) => "情况说明",
            (Category::FactSheets, Language::Jp) => "ファクトシート",
            (Category::FactSheets, Language::Kp) => "사실 자료",
            (Category::PresidentialActions, Language::En) => "Presidential Actions",
            (Category::PresidentialActions, Language::Cn) => "总统行动",
            (Category::PresidentialActions, Language::Jp) => "大統領令",
            (Category::PresidentialActions, Language::Kp) => "수반 결정",
            (Category::Remarks, Language::En) => "Remarks",
            (Category::Remarks, Language::Cn) => "讲话",
            (Category::Remarks, Language::Jp) => "発言",
            (Category::Remarks, Language::Kp) => "담화",
        }
    }

    /// Look up a category by its English label.
    pub fn from_label(label: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.label() == label.trim())
    }

    /// Look up a category by its URL segment.
    pub fn from_uri(uri: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.uri() == uri.trim())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the English label or the URL segment.
impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_uri(s)
            .or_else(|| Category::from_label(s))
            .ok_or_else(|| AppError::validation(format!("Unknown category: {s}")))
    }
}
