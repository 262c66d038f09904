use unicode_general_category::{GeneralCategory, get_general_category};

use crate::consts::{FALLBACK_TITLE_PREFIX, SONG_FILE_EXTENSION};

/// A song found on the index page, identified by the last path segment of its link
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SongRef {
    pub(crate) url: String,
}

impl SongRef {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub(crate) fn id(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or_default()
    }

    pub(crate) fn fallback_title(&self) -> String {
        format!("{FALLBACK_TITLE_PREFIX}{}", self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SongRecord {
    pub(crate) title: String,
    pub(crate) text: String,
}

impl SongRecord {
    pub(crate) fn file_name(&self) -> String {
        song_file_name(&self.title)
    }
}

/// Keep letters, numbers, spaces, hyphens and underscores; everything else becomes `_`
pub(crate) fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if is_letter_or_number(c) || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// General category L* or N*. Combining marks count as punctuation here, even
/// the ones `char::is_alphanumeric` accepts through Other_Alphabetic.
fn is_letter_or_number(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::DecimalNumber
            | GeneralCategory::LetterNumber
            | GeneralCategory::OtherNumber
    )
}

pub(crate) fn song_file_name(title: &str) -> String {
    format!("{}.{SONG_FILE_EXTENSION}", sanitize_title(title))
}
