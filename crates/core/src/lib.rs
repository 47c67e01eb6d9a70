pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod export;
pub mod models;
pub mod traits;

pub use client::{interpret_match_response, HttpRankingService};
pub use config::{
    ConsoleConfig, ServiceConfig, DEFAULT_PRODUCT_NAME, DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT_SECS,
};
pub use console::{MatchConsole, SubmissionTicket};
pub use error::{MatchError, EMPTY_DESCRIPTION_ERROR, GENERIC_SERVICE_ERROR};
pub use export::{
    export_text, render_analysis, render_candidates, write_export, DEFAULT_EXPORT_FILE_NAME,
};
pub use models::{
    clamp_top_n, Analysis, AnalysisEntry, ErrorBody, MatchRequest, MatchResponse, Query,
    RankedCandidate, RequestState, ResultSet, DEFAULT_TOP_N, MAX_TOP_N, MIN_TOP_N,
};
pub use traits::RankingService;
