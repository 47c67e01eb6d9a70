use crate::{MatchError, MatchRequest, MatchResponse};
use async_trait::async_trait;
use url::Url;

#[async_trait]
pub trait RankingService {
    /// Sends one ranking request. A single attempt; callers never retry.
    async fn rank(&self, request: &MatchRequest) -> Result<MatchResponse, MatchError>;

    /// Location a matched resume can be opened from.
    fn resume_url(&self, file_name: &str) -> Url;
}
