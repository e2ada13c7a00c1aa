//! songtube-core: resolve song queries to YouTube videos and fetch their audio

pub mod config;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod platform;
pub mod resolver;
pub mod search;
pub mod token;
pub mod web_search;
pub mod ytdlp;

pub use config::Config;
pub use error::{Result, SongtubeError};
pub use fetcher::{DownloadResult, Fetcher};
pub use resolver::{AcceptanceThresholds, Resolver};
pub use token::AccessToken;
