pub mod clustering;
pub mod embedding;
pub mod topics;

pub use clustering::{kmeans, KMeansConfig};
pub use embedding::{Embedder, HashingEmbedder};
pub use topics::{Dictionary, LdaConfig, LdaModel};
