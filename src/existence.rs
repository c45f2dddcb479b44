//! Remote existence classification for locally referenced resources.
//!
//! A resource picked from Pod keeps a reference row in the host's store.
//! [`ExistenceChecker`] joins that lookup with one REST call and
//! classifies the outcome into a four-valued status the host renders.

use async_trait::async_trait;
use thiserror::Error;

use crate::client::{ApiClient, ApiResponse};

/// Repository type marking resources that originate from Pod.
pub const REPOSITORY_TYPE: &str = "pod";

/// Classification of a locally referenced remote resource.
///
/// The numeric codes are part of the host-facing contract; see
/// [`Self::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceStatus {
    /// The local resource does not reference this platform.
    NotThisType,
    /// The platform did not answer with usable data.
    ServerUnreachable,
    /// The platform answered and the resource is gone.
    ///
    /// Retained for the host-facing code contract; current classification
    /// folds missing resources into [`Self::ServerUnreachable`] because
    /// the client cannot tell a 404 from a transport failure.
    NotFound,
    /// The resource still exists remotely.
    Exists,
}

impl ExistenceStatus {
    /// Stable numeric code exposed to the host.
    #[must_use]
    pub fn code(self) -> i8 {
        match self {
            Self::NotThisType => -2,
            Self::ServerUnreachable => -1,
            Self::NotFound => 0,
            Self::Exists => 1,
        }
    }
}

/// Failures from the host's persistence layer.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The reference query could not be executed.
    #[error("resource reference lookup failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// A resource-to-repository linkage read from the host's store.
#[derive(Debug, Clone)]
pub struct ResourceReference {
    /// Repository type the resource originates from.
    pub repository_type: String,
    /// Remote identifier recorded when the resource was picked.
    pub source: String,
}

/// Read access to the host's resource reference records.
#[async_trait]
pub trait PersistenceReader: Send + Sync {
    /// Returns the repository linkage for `context_id`, when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the underlying store fails.
    async fn find_reference(
        &self,
        context_id: i64,
    ) -> Result<Option<ResourceReference>, PersistenceError>;
}

/// Checks whether locally referenced Pod resources still exist remotely.
pub struct ExistenceChecker<R> {
    reader: R,
    client: ApiClient,
}

impl<R: PersistenceReader> ExistenceChecker<R> {
    /// Creates a checker over the host's store and one REST client.
    #[must_use]
    pub fn new(reader: R, client: ApiClient) -> Self {
        Self { reader, client }
    }

    /// Classifies the remote status of the resource behind `context_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the reference lookup fails.
    /// API-side failures never error; they classify as
    /// [`ExistenceStatus::ServerUnreachable`].
    #[tracing::instrument(skip(self))]
    pub async fn check_resource_exists(
        &self,
        context_id: i64,
    ) -> Result<ExistenceStatus, PersistenceError> {
        let Some(reference) = self.reader.find_reference(context_id).await? else {
            return Ok(ExistenceStatus::NotThisType);
        };
        if reference.repository_type != REPOSITORY_TYPE {
            return Ok(ExistenceStatus::NotThisType);
        }

        let path = format!("/rest/videos/{}/?", reference.source);
        let params = [("format", "json"), ("encoding_in_progress", "False")];
        match self.client.execute_request(&path, &params).await {
            ApiResponse::Unavailable => Ok(ExistenceStatus::ServerUnreachable),
            ApiResponse::Page(_) | ApiResponse::Single(_) => Ok(ExistenceStatus::Exists),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::PodConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedReader(Option<ResourceReference>);

    #[async_trait]
    impl PersistenceReader for FixedReader {
        async fn find_reference(
            &self,
            _context_id: i64,
        ) -> Result<Option<ResourceReference>, PersistenceError> {
            Ok(self.0.clone())
        }
    }

    struct FailingReader;

    #[async_trait]
    impl PersistenceReader for FailingReader {
        async fn find_reference(
            &self,
            _context_id: i64,
        ) -> Result<Option<ResourceReference>, PersistenceError> {
            Err(PersistenceError::Query(sqlx::Error::PoolClosed))
        }
    }

    fn pod_reference(source: &str) -> ResourceReference {
        ResourceReference {
            repository_type: REPOSITORY_TYPE.to_string(),
            source: source.to_string(),
        }
    }

    fn client_for(base_url: &str) -> ApiClient {
        ApiClient::new(PodConfig::new(base_url, "test-key"))
    }

    #[test]
    fn test_status_codes_match_host_contract() {
        assert_eq!(ExistenceStatus::NotThisType.code(), -2);
        assert_eq!(ExistenceStatus::ServerUnreachable.code(), -1);
        assert_eq!(ExistenceStatus::NotFound.code(), 0);
        assert_eq!(ExistenceStatus::Exists.code(), 1);
    }

    #[tokio::test]
    async fn test_check_without_linkage_is_not_this_type() {
        let checker = ExistenceChecker::new(
            FixedReader(None),
            client_for("https://pod.example.org"),
        );
        let status = checker.check_resource_exists(17).await.unwrap();
        assert_eq!(status, ExistenceStatus::NotThisType);
    }

    #[tokio::test]
    async fn test_check_with_foreign_repository_type_is_not_this_type() {
        let reference = ResourceReference {
            repository_type: "dropbox".to_string(),
            source: "41".to_string(),
        };
        let checker = ExistenceChecker::new(
            FixedReader(Some(reference)),
            client_for("https://pod.example.org"),
        );
        let status = checker.check_resource_exists(17).await.unwrap();
        assert_eq!(status, ExistenceStatus::NotThisType);
    }

    #[tokio::test]
    async fn test_check_existing_resource() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/videos/41/"))
            .and(query_param("format", "json"))
            .and(query_param("encoding_in_progress", "False"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 41,
                "video_data": {"title": "Lecture", "full_url": "//pod.example.org/video/0041/"}
            })))
            .mount(&mock_server)
            .await;

        let checker = ExistenceChecker::new(
            FixedReader(Some(pod_reference("41"))),
            client_for(&mock_server.uri()),
        );
        let status = checker.check_resource_exists(17).await.unwrap();
        assert_eq!(status, ExistenceStatus::Exists);
    }

    #[tokio::test]
    async fn test_check_missing_resource_reports_unreachable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/videos/41/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let checker = ExistenceChecker::new(
            FixedReader(Some(pod_reference("41"))),
            client_for(&mock_server.uri()),
        );
        let status = checker.check_resource_exists(17).await.unwrap();
        assert_eq!(status, ExistenceStatus::ServerUnreachable);
    }

    #[tokio::test]
    async fn test_check_unreachable_platform() {
        // Nothing listens on this port; the connection is refused.
        let checker = ExistenceChecker::new(
            FixedReader(Some(pod_reference("41"))),
            client_for("http://127.0.0.1:9"),
        );
        let status = checker.check_resource_exists(17).await.unwrap();
        assert_eq!(status, ExistenceStatus::ServerUnreachable);
    }

    #[tokio::test]
    async fn test_check_propagates_persistence_failure() {
        let checker =
            ExistenceChecker::new(FailingReader, client_for("https://pod.example.org"));
        let result = checker.check_resource_exists(17).await;
        assert!(result.is_err(), "store failures must reach the caller");
    }
}
