pub mod entities;
pub mod lemmatizer;
pub mod preprocess;
pub mod stopwords;
pub mod tokenizer;

pub use entities::EntityRecognizer;
pub use preprocess::enhanced_preprocess_text;
pub use tokenizer::{tokenize, Token, TokenKind};
