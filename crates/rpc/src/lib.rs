pub mod navigation;
pub mod search;

use navigation::NavigationPayload;
use search::{IndexSummary, SearchOutcome, SearchRequest};

#[tarpc::service]
pub trait CourseService {
    /// Heartbeat
    async fn ping() -> String;

    /// Navigation tree plus the flat url -> title table
    async fn navigation() -> NavigationPayload;

    /// Keyword search over the published index
    async fn search(req: SearchRequest) -> SearchOutcome;

    /// Rebuild the index from disk and publish it
    async fn reindex() -> IndexSummary;
}
