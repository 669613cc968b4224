use serde::Deserialize;

/// Form body for adding a word to the current project.
#[derive(Debug, Default, Deserialize)]
pub struct AddWordRequest {
    #[serde(default)]
    pub new_language_word: String,
    #[serde(default)]
    pub english_translation: String,
}
