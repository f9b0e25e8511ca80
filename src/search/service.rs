//! Search service contract

use super::models::ServiceReply;
use crate::error::ServiceError;
use crate::query::QueryDescriptor;
use async_trait::async_trait;
use std::sync::Arc;

/// Backend that turns a query descriptor into a list of document links.
///
/// One call per search; implementations must not retry.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run a single search
    async fn search(&self, query: &QueryDescriptor) -> Result<ServiceReply, ServiceError>;
}

#[async_trait]
impl<T: SearchService + ?Sized> SearchService for Arc<T> {
    async fn search(&self, query: &QueryDescriptor) -> Result<ServiceReply, ServiceError> {
        (**self).search(query).await
    }
}
