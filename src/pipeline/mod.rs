//! File-scoped batch stages run by the task dispatcher.
//!
//! Each stage opens nothing itself: it works on the [`Database`](crate::db::Database)
//! it is handed and re-reads its inputs from the store, so stages can run in
//! any order and on different workers.

pub mod analysis;
pub mod extract;
pub mod nlp;

pub use analysis::{
    cluster_embeddings, embed_processed_texts, generate_embeddings, generate_topics,
    ClusterSummary, EmbeddingSummary, TopicSummary,
};
pub use extract::{
    extract_pdf_content_and_store, extract_pdf_tables_and_store, store_page_tables, store_pages,
    ExtractionSummary, TableSummary,
};
pub use nlp::{apply_nlp, extract_entities, EntitySummary, NlpSummary};
