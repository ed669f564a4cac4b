pub mod analysis;
pub mod chunk;
pub mod file;

pub use analysis::{ClusterAssignment, EmbeddingRecord, EntityMention, EntityRecord, TopicRecord};
pub use chunk::{ExtractedTable, ProcessedText, TextChunk};
pub use file::FileRecord;
