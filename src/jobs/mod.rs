pub mod cache_sweeper;

pub use cache_sweeper::start_cache_sweeper;
