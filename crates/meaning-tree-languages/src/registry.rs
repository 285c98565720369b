//! Registry for readers and tokenizer languages.

use crate::traits::Reader;
use meaning_tree_tokens::TokenizerLanguage;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Global reader registry.
static READERS: RwLock<Vec<&'static dyn Reader>> = RwLock::new(Vec::new());
static READERS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Global tokenizer registry.
static TOKENIZERS: RwLock<Vec<&'static dyn TokenizerLanguage>> = RwLock::new(Vec::new());
static TOKENIZERS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom reader.
pub fn register_reader(reader: &'static dyn Reader) {
    READERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(reader);
}

/// Register a custom tokenizer language.
pub fn register_tokenizer(language: &'static dyn TokenizerLanguage) {
    TOKENIZERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(language);
}

fn init_readers() {
    READERS_INITIALIZED.get_or_init(|| {
        #[cfg(feature = "lang-python")]
        {
            register_reader(&crate::python::PYTHON_READER);
        }
    });
}

fn init_tokenizers() {
    TOKENIZERS_INITIALIZED.get_or_init(|| {
        #[cfg(feature = "lang-python")]
        {
            register_tokenizer(&crate::python::PYTHON);
        }
        #[cfg(feature = "lang-lua")]
        {
            register_tokenizer(&crate::lua::LUA);
        }
    });
}

/// Get a reader by language name.
pub fn reader_for_language(lang: &str) -> Option<&'static dyn Reader> {
    init_readers();
    READERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|r| r.language() == lang)
        .copied()
}

/// Get a reader by file extension.
pub fn reader_for_extension(ext: &str) -> Option<&'static dyn Reader> {
    init_readers();
    READERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|r| r.extensions().contains(&ext))
        .copied()
}

/// Get a tokenizer language by name.
pub fn tokenizer_for_language(lang: &str) -> Option<&'static dyn TokenizerLanguage> {
    init_tokenizers();
    TOKENIZERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|t| t.name() == lang)
        .copied()
}

/// Get a tokenizer language by file extension.
pub fn tokenizer_for_extension(ext: &str) -> Option<&'static dyn TokenizerLanguage> {
    init_tokenizers();
    TOKENIZERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|t| t.extensions().contains(&ext))
        .copied()
}

/// Get all registered readers.
pub fn readers() -> Vec<&'static dyn Reader> {
    init_readers();
    READERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Get all registered tokenizer languages.
pub fn tokenizers() -> Vec<&'static dyn TokenizerLanguage> {
    init_tokenizers();
    TOKENIZERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
