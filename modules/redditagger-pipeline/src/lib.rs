pub mod aggregator;
pub mod annotator;
pub mod cache;
pub mod fetcher;
pub mod inference;
pub mod pipeline;
pub mod segmenter;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use aggregator::{aggregate, Aggregator};
pub use annotator::Annotator;
pub use cache::MemoryCache;
pub use fetcher::Fetcher;
pub use pipeline::{Pipeline, PipelineSettings};
pub use segmenter::Segmenter;
