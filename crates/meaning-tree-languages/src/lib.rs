//! Language plugins for meaning-tree.
//!
//! Each plugin describes one grammar to the operator-aware tokenizer and,
//! where available, reads source into a [`meaning_tree::MeaningTree`]:
//!
//! ```text
//! source ──tree-sitter──> CST ──OperatorTable──> TokenList (linked operands)
//!                          └───Reader──────────> MeaningTree ──ExtendedLanguage──> TokenList
//! ```
//!
//! Built-in languages register themselves lazily, behind the `lang-python`
//! and `lang-lua` features.
//!
//! # Example
//!
//! ```ignore
//! use meaning_tree::IdAllocator;
//! use meaning_tree_languages::{Config, tokenizer_for_language};
//! use meaning_tree_tokens::Tokenizer;
//!
//! let config = Config::load(std::path::Path::new("."));
//! let ids = config.allocator();
//! let python = tokenizer_for_language("python").unwrap();
//! let tokens = Tokenizer::new(python, &ids)
//!     .with_options(config.tokenizer_options())
//!     .tokenize("a + b * c")?;
//! ```

pub mod config;
pub mod registry;
pub mod traits;

#[cfg(feature = "lang-lua")]
pub mod lua;
#[cfg(feature = "lang-python")]
pub mod python;

pub use config::Config;
pub use traits::{ReadError, ReadOptions, Reader};

pub use registry::{
    reader_for_extension, reader_for_language, readers, register_reader, register_tokenizer,
    tokenizer_for_extension, tokenizer_for_language, tokenizers,
};

#[cfg(feature = "lang-lua")]
pub use lua::{LUA, Lua};
#[cfg(feature = "lang-python")]
pub use python::{PYTHON, PYTHON_READER, Python, PythonReader, read_python, read_python_with};
