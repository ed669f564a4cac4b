pub mod chunker;
pub mod layout;
pub mod normalize;
pub mod pdf;
pub mod tables;
pub mod tabular;

pub use chunker::{chunk_text, determine_chunk_size};
pub use layout::PdfLayout;
pub use pdf::{PageSource, PdfDocument};
pub use tables::{table_to_string, Table, TableDetector};
