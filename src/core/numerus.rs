//! Plural (numerus) rules.
//!
//! Every supported language maps to one of a small set of rule families. A
//! family knows how many forms a translation needs and which form a cardinal
//! count selects. Languages outside the table fall back to a single universal
//! form; callers are told about the fallback so they can report it.

/// A plural rule family shared by one or more languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralRule {
    /// One form for every count (Japanese, Chinese, Korean, ...).
    Universal,
    /// `n == 1` is singular.
    English,
    /// `n <= 1` is singular.
    French,
    Latvian,
    Icelandic,
    Irish,
    Gaelic,
    /// Czech and Slovak.
    Slovak,
    Macedonian,
    Lithuanian,
    /// Russian, Ukrainian, Belarusian, Serbian, Croatian, Bosnian.
    Russian,
    Polish,
    Romanian,
    Slovenian,
    Maltese,
    Welsh,
    Arabic,
}

/// Returned when a language has no entry in the plural table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPluralRules {
    pub language: String,
}

/// A resolved rule for a language code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numerus {
    pub rule: PluralRule,
    /// Set when the language is unknown and `rule` is the universal fallback.
    pub unknown: Option<UnknownPluralRules>,
}

const UNIVERSAL_LANGUAGES: &[&str] = &[
    "bi", "bo", "dz", "fa", "fj", "gn", "hu", "id", "ja", "jv", "km", "ko", "lo", "ms", "my",
    "na", "om", "su", "th", "tr", "tt", "vi", "yo", "za", "zh",
];

const ENGLISH_LANGUAGES: &[&str] = &[
    "af", "an", "as", "ast", "az", "bg", "bn", "ca", "da", "de", "el", "en", "eo", "es", "et",
    "eu", "fi", "fo", "fur", "fy", "gl", "gu", "ha", "he", "hi", "ia", "it", "ka", "kk", "kl",
    "kn", "ku", "ky", "lb", "ml", "mn", "mr", "nb", "nds", "ne", "nl", "nn", "no", "or", "pa",
    "ps", "pt", "rm", "sco", "so", "sq", "sv", "sw", "ta", "te", "tk", "ur", "uz", "xh", "zu",
];

const FRENCH_LANGUAGES: &[&str] = &["br", "fil", "fr", "hy", "ln", "oc", "ti", "tl", "wa"];

impl PluralRule {
    /// Look up the rule family for a language code such as `de`, `pt_BR` or `sr-Latn`.
    ///
    /// Returns `None` for languages that are not in the table.
    pub fn for_language(code: &str) -> Option<Self> {
        let (language, region) = split_language_code(code);
        if language.is_empty() {
            return None;
        }

        if language == "pt" && region.as_deref() == Some("BR") {
            return Some(Self::French);
        }

        let lang = language.as_str();
        if UNIVERSAL_LANGUAGES.contains(&lang) {
            return Some(Self::Universal);
        }
        if ENGLISH_LANGUAGES.contains(&lang) {
            return Some(Self::English);
        }
        if FRENCH_LANGUAGES.contains(&lang) {
            return Some(Self::French);
        }

        let rule = match lang {
            "lv" => Self::Latvian,
            "is" => Self::Icelandic,
            "ga" => Self::Irish,
            "gd" => Self::Gaelic,
            "cs" | "sk" => Self::Slovak,
            "mk" => Self::Macedonian,
            "lt" => Self::Lithuanian,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::Russian,
            "pl" => Self::Polish,
            "ro" | "mo" => Self::Romanian,
            "sl" => Self::Slovenian,
            "mt" => Self::Maltese,
            "cy" => Self::Welsh,
            "ar" => Self::Arabic,
            _ => return None,
        };
        Some(rule)
    }

    /// Human-readable names of the forms, in category order.
    pub fn form_names(self) -> &'static [&'static str] {
        match self {
            Self::Universal => &["Universal Form"],
            Self::English | Self::French | Self::Icelandic => &["Singular", "Plural"],
            Self::Latvian => &["Singular", "Plural", "Nullar"],
            Self::Irish => &["Singular", "Dual", "Plural"],
            Self::Gaelic => &["1/11", "2/12", "Few", "Many"],
            Self::Slovak | Self::Russian | Self::Polish | Self::Romanian | Self::Macedonian => {
                &["Singular", "Paucal", "Plural"]
            }
            Self::Lithuanian => &["Singular", "Paucal", "Plural"],
            Self::Slovenian => &["Singular", "Dual", "Trial", "Plural"],
            Self::Maltese => &["Singular", "Paucal", "Greater Paucal", "Plural"],
            Self::Welsh => &["Nullar", "Singular", "Dual", "Sexal", "Plural"],
            Self::Arabic => &[
                "Nullar",
                "Singular",
                "Dual",
                "Minority Plural",
                "Plural",
                "Plural (100-102, ...)",
            ],
        }
    }

    pub fn form_count(self) -> usize {
        self.form_names().len()
    }

    /// Select the form index for a cardinal count. Always `< form_count()`.
    pub fn category_of(self, n: u64) -> usize {
        let mod10 = n % 10;
        let mod100 = n % 100;
        let teen = (10..=19).contains(&mod100);

        match self {
            Self::Universal => 0,
            Self::English => usize::from(n != 1),
            Self::French => usize::from(n > 1),
            Self::Latvian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Icelandic => usize::from(!(mod10 == 1 && mod100 != 11)),
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Gaelic => match n {
                1 | 11 => 0,
                2 | 12 => 1,
                3..=19 => 2,
                _ => 3,
            },
            Self::Slovak => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Macedonian => match mod10 {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Lithuanian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if mod10 != 0 && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Russian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if (2..=4).contains(&mod10) && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&mod10) && !teen {
                    1
                } else {
                    2
                }
            }
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match mod100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Maltese => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=10).contains(&mod100) {
                    1
                } else if (11..=19).contains(&mod100) {
                    2
                } else {
                    3
                }
            }
            Self::Welsh => match n {
                0 => 0,
                1 => 1,
                2..=5 => 2,
                6 => 3,
                _ => 4,
            },
            Self::Arabic => {
                if n <= 2 {
                    n as usize
                } else if (3..=10).contains(&mod100) {
                    3
                } else if mod100 >= 11 {
                    4
                } else {
                    5
                }
            }
        }
    }
}

/// Resolve the rule for a language, falling back to the universal form.
pub fn resolve(language: &str) -> Numerus {
    match PluralRule::for_language(language) {
        Some(rule) => Numerus {
            rule,
            unknown: None,
        },
        None => Numerus {
            rule: PluralRule::Universal,
            unknown: Some(UnknownPluralRules {
                language: language.to_string(),
            }),
        },
    }
}

/// Number of translation forms a plural message needs in `language`.
pub fn form_count(language: &str) -> usize {
    resolve(language).rule.form_count()
}

/// Form index selected by `n` in `language`.
pub fn category_of(language: &str, n: u64) -> usize {
    resolve(language).rule.category_of(n)
}

/// Split `ll_RR`, `ll-RR` or `ll` into a lowercase language and an uppercase region.
///
/// Script subtags (`sr-Latn`) are skipped; only a two-letter or three-digit
/// subtag is treated as the region.
pub fn split_language_code(code: &str) -> (String, Option<String>) {
    let mut parts = code.trim().split(['_', '-']);
    let language = parts.next().unwrap_or_default().to_ascii_lowercase();
    let region = parts
        .find(|part| {
            (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
                || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
        })
        .map(|part| part.to_ascii_uppercase());
    (language, region)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_counts() {
        assert_eq!(form_count("ja"), 1);
        assert_eq!(form_count("en"), 2);
        assert_eq!(form_count("de_DE"), 2);
        assert_eq!(form_count("ru"), 3);
        assert_eq!(form_count("sl"), 4);
        assert_eq!(form_count("cy"), 5);
        assert_eq!(form_count("ar"), 6);
    }

    #[test]
    fn test_unknown_language_falls_back_to_single_form() {
        let numerus = resolve("xx");
        assert_eq!(numerus.rule, PluralRule::Universal);
        assert_eq!(
            numerus.unknown,
            Some(UnknownPluralRules {
                language: "xx".to_string()
            })
        );
        assert_eq!(form_count("xx"), 1);
        assert_eq!(category_of("xx", 42), 0);
    }

    #[test]
    fn test_empty_language_is_unknown() {
        assert!(resolve("").unknown.is_some());
    }

    #[test]
    fn test_brazilian_portuguese_uses_french_rule() {
        assert_eq!(PluralRule::for_language("pt_BR"), Some(PluralRule::French));
        assert_eq!(PluralRule::for_language("pt-br"), Some(PluralRule::French));
        assert_eq!(PluralRule::for_language("pt_PT"), Some(PluralRule::English));
        assert_eq!(category_of("pt_BR", 0), 0);
        assert_eq!(category_of("pt_PT", 0), 1);
    }

    #[test]
    fn test_english_categories() {
        assert_eq!(category_of("en", 0), 1);
        assert_eq!(category_of("en", 1), 0);
        assert_eq!(category_of("en", 2), 1);
    }

    #[test]
    fn test_russian_categories() {
        let expected = [
            (1, 0),
            (2, 1),
            (4, 1),
            (5, 2),
            (11, 2),
            (12, 2),
            (21, 0),
            (22, 1),
            (111, 2),
            (0, 2),
        ];
        for (n, category) in expected {
            assert_eq!(category_of("ru", n), category, "n = {}", n);
        }
    }

    #[test]
    fn test_arabic_categories() {
        let expected = [
            (0, 0),
            (1, 1),
            (2, 2),
            (3, 3),
            (10, 3),
            (11, 4),
            (99, 4),
            (100, 5),
            (102, 5),
            (103, 3),
        ];
        for (n, category) in expected {
            assert_eq!(category_of("ar", n), category, "n = {}", n);
        }
    }

    #[test]
    fn test_categories_are_always_in_range() {
        let rules = [
            PluralRule::Universal,
            PluralRule::English,
            PluralRule::French,
            PluralRule::Latvian,
            PluralRule::Icelandic,
            PluralRule::Irish,
            PluralRule::Gaelic,
            PluralRule::Slovak,
            PluralRule::Macedonian,
            PluralRule::Lithuanian,
            PluralRule::Russian,
            PluralRule::Polish,
            PluralRule::Romanian,
            PluralRule::Slovenian,
            PluralRule::Maltese,
            PluralRule::Welsh,
            PluralRule::Arabic,
        ];
        for rule in rules {
            for n in (0..1_000).chain([u64::MAX - 1, u64::MAX]) {
                assert!(rule.category_of(n) < rule.form_count(), "{:?} n = {}", rule, n);
            }
        }
    }

    #[test]
    fn test_split_language_code() {
        assert_eq!(split_language_code("de"), ("de".to_string(), None));
        assert_eq!(
            split_language_code("zh_CN"),
            ("zh".to_string(), Some("CN".to_string()))
        );
        assert_eq!(
            split_language_code("sr-Latn-RS"),
            ("sr".to_string(), Some("RS".to_string()))
        );
        assert_eq!(
            split_language_code("es_419"),
            ("es".to_string(), Some("419".to_string()))
        );
    }
}
