use crate::words::dto::AddWordRequest;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

pub const MAX_WORD_LEN: usize = 100;

const WORD_FIELD: &str = "New language word";
const TRANSLATION_FIELD: &str = "English translation";

/// Why a word was rejected. The message is shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WordError {
    #[error("New language word is required.")]
    MissingWord,
    #[error("English translation is required.")]
    MissingTranslation,
    #[error("{field} must be at most 100 characters.")]
    TooLong { field: &'static str },
    #[error("{field} may only contain letters and spaces.")]
    InvalidCharacters { field: &'static str },
}

fn is_letters_and_spaces(text: &str) -> bool {
    lazy_static! {
        static ref WORD_RE: Regex = Regex::new(r"^[a-zA-Z\s]+$").unwrap();
    }
    WORD_RE.is_match(text)
}

fn check_field(field: &'static str, text: &str) -> Result<(), WordError> {
    if text.chars().count() > MAX_WORD_LEN {
        return Err(WordError::TooLong { field });
    }
    if !is_letters_and_spaces(text) {
        return Err(WordError::InvalidCharacters { field });
    }
    Ok(())
}

/// Trim both fields, then require them and check length and alphabet.
pub fn validate_word(payload: &mut AddWordRequest) -> Result<(), WordError> {
    payload.new_language_word = payload.new_language_word.trim().to_string();
    payload.english_translation = payload.english_translation.trim().to_string();

    if payload.new_language_word.is_empty() {
        return Err(WordError::MissingWord);
    }
    if payload.english_translation.is_empty() {
        return Err(WordError::MissingTranslation);
    }
    check_field(WORD_FIELD, &payload.new_language_word)?;
    check_field(TRANSLATION_FIELD, &payload.english_translation)?;
    Ok(())
}
