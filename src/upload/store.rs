//! Key-value store abstraction for uploaded parts, with the DynamoDB implementation.

use async_trait::async_trait;
use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected the write for capacity reasons; safe to retry later
    #[error("throttled: {0}")]
    Throttled(String),

    #[error("{0}")]
    Other(String),
}

/// One stored part of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartItem {
    pub project_path: String,
    /// Stored data path, already suffixed with `_part<N>`
    pub data_path: String,
    pub data: String,
}

impl PartItem {
    /// Build part `part` (1-based) of an upload under `data_path`
    pub fn new(project_path: &str, data_path: &str, part: usize, data: String) -> Self {
        Self {
            project_path: project_path.to_string(),
            data_path: format!("{}_part{}", data_path, part),
            data,
        }
    }
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn put_part(&self, item: &PartItem) -> Result<(), StoreError>;
}

/// DynamoDB table keyed by `projectPath` / `dataPath`
pub struct DynamoStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoStore {
    pub async fn new(table_name: String, region: Option<String>, endpoint: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_sdk_dynamodb::config::Region::new(region));
        }
        let config = loader.load().await;

        let mut client_config = aws_sdk_dynamodb::config::Builder::from(&config);
        if let Some(ep) = endpoint {
            client_config = client_config.endpoint_url(ep);
        }

        Self::from_config(client_config, table_name)
    }

    /// Build the client with SDK-level retries off; `Uploader` owns the backoff.
    fn from_config(client_config: aws_sdk_dynamodb::config::Builder, table_name: String) -> Self {
        let client_config = client_config.retry_config(RetryConfig::disabled());
        let client = aws_sdk_dynamodb::Client::from_conf(client_config.build());
        Self { client, table_name }
    }
}

#[async_trait]
impl KvStore for DynamoStore {
    async fn put_part(&self, item: &PartItem) -> Result<(), StoreError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("projectPath", AttributeValue::S(item.project_path.clone()))
            .item("dataPath", AttributeValue::S(item.data_path.clone()))
            .item("data", AttributeValue::S(item.data.clone()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let throttled = matches!(
                    err.as_service_error(),
                    Some(PutItemError::ProvisionedThroughputExceededException(_))
                        | Some(PutItemError::RequestLimitExceeded(_))
                );
                let message = DisplayErrorContext(&err).to_string();
                if throttled {
                    Err(StoreError::Throttled(message))
                } else {
                    Err(StoreError::Other(message))
                }
            }
        }
    }
}
