//! # DynamoDbTableKeyDeletionStrategy
//!
//! テーブルの主キーでアイテムを 1 件削除する。
//!
//! ## 削除方式
//!
//! 削除キーの値をテーブルのパーティションキー（とソートキー）に対応付け、
//! DeleteItem を 1 回だけ発行する。存在確認は行わない（存在しないキーの削除も成功する）。

use std::sync::Arc;

use async_trait::async_trait;
use ondemand_deletion_domain::dynamodb::{
    DynamoDbDeletionKeyValue,
    DynamoDbDeletionTarget,
    validated::ValidatedDynamoDbTableKeyDeletionTarget,
};

use super::{DeletionResult, DynamoDbDeletionStrategy, dynamodb_key::table_key};
use crate::{dynamodb::DynamoDbClient, error::InfraError};

/// `TABLE_KEY` 戦略の実装
pub struct DynamoDbTableKeyDeletionStrategy {
    client: Arc<dyn DynamoDbClient>,
}

impl DynamoDbTableKeyDeletionStrategy {
    pub fn new(client: Arc<dyn DynamoDbClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DynamoDbDeletionStrategy for DynamoDbTableKeyDeletionStrategy {
    #[tracing::instrument(skip_all, level = "debug", fields(table_name = %target.table_name))]
    async fn delete(
        &self,
        target: &DynamoDbDeletionTarget,
        key: &DynamoDbDeletionKeyValue,
    ) -> Result<DeletionResult, InfraError> {
        let target = ValidatedDynamoDbTableKeyDeletionTarget::from_deletion_target(target)?;
        let item_key = table_key(target.partition_key_name(), target.sort_key_name(), key);

        tracing::info!(
            region = target.region(),
            table_name = target.table_name(),
            key_attributes = item_key.len(),
            "DynamoDB: 主キーでアイテムを削除"
        );
        self.client.delete_item(target.table_name(), item_key).await?;

        Ok(DeletionResult { deleted_count: 1 })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_sdk_dynamodb::types::AttributeValue;
    use ondemand_deletion_domain::dynamodb::{
        DynamoDbDeletionKeySchema,
        DynamoDbDeletionStrategyType,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{InfraErrorKind, mock::MockDynamoDbClient};

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn target(sort_key_name: Option<&str>) -> DynamoDbDeletionTarget {
        DynamoDbDeletionTarget {
            strategy:            DynamoDbDeletionStrategyType::TableKey,
            region:              "us-west-2".to_string(),
            table_name:          "TestTable".to_string(),
            partition_key_name:  "CustomerId".to_string(),
            sort_key_name:       sort_key_name.map(String::from),
            deletion_key_schema: DynamoDbDeletionKeySchema {
                primary_key_name:   "CustomerId".to_string(),
                secondary_key_name: sort_key_name.map(String::from),
            },
            gsi_name:            None,
        }
    }

    fn sut(client: &MockDynamoDbClient) -> DynamoDbTableKeyDeletionStrategy {
        DynamoDbTableKeyDeletionStrategy::new(Arc::new(client.clone()))
    }

    #[tokio::test]
    async fn test_パーティションキーだけで削除する() {
        let client = MockDynamoDbClient::new();
        client.add_item(HashMap::from([("CustomerId".to_string(), s("customer1"))]));
        client.add_item(HashMap::from([("CustomerId".to_string(), s("customer2"))]));

        let result = sut(&client)
            .delete(&target(None), &DynamoDbDeletionKeyValue::new("customer1"))
            .await
            .unwrap();

        assert_eq!(result.deleted_count, 1);
        assert_eq!(
            client.items(),
            vec![HashMap::from([("CustomerId".to_string(), s("customer2"))])]
        );
    }

    #[tokio::test]
    async fn test_ソートキーを含むキーで削除する() {
        let client = MockDynamoDbClient::new();

        sut(&client)
            .delete(
                &target(Some("SortKey")),
                &DynamoDbDeletionKeyValue::with_secondary("Customer123", "SortValue456"),
            )
            .await
            .unwrap();

        assert_eq!(
            client.deleted_keys(),
            vec![HashMap::from([
                ("CustomerId".to_string(), s("Customer123")),
                ("SortKey".to_string(), s("SortValue456")),
            ])]
        );
    }

    #[tokio::test]
    async fn test_セカンダリ値がなければソートキーを省略する() {
        let client = MockDynamoDbClient::new();

        sut(&client)
            .delete(
                &target(Some("SortKey")),
                &DynamoDbDeletionKeyValue::new("Customer123"),
            )
            .await
            .unwrap();

        assert_eq!(
            client.deleted_keys(),
            vec![HashMap::from([("CustomerId".to_string(), s("Customer123"))])]
        );
    }

    #[tokio::test]
    async fn test_存在しないキーの削除も成功する() {
        let client = MockDynamoDbClient::new();

        let result = sut(&client)
            .delete(&target(None), &DynamoDbDeletionKeyValue::new("missing"))
            .await;

        assert!(result.is_ok());
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_不正なターゲットはストアを呼ばずに失敗する() {
        let client = MockDynamoDbClient::new();
        let invalid = DynamoDbDeletionTarget {
            deletion_key_schema: DynamoDbDeletionKeySchema::new("CustomerId"),
            ..target(Some("SortKey"))
        };

        let err = sut(&client)
            .delete(&invalid, &DynamoDbDeletionKeyValue::new("Customer123"))
            .await
            .unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::Validation(_)));
        assert_eq!(
            err.to_string(),
            "If sortKeyName is provided, deletionKeySchema.secondaryKeyName must also be provided"
        );
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ストアのエラーを伝播する() {
        let client = MockDynamoDbClient::new();
        client.fail_delete_item("throttled");

        let err = sut(&client)
            .delete(&target(None), &DynamoDbDeletionKeyValue::new("Customer123"))
            .await
            .unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::DynamoDb(msg) if msg == "throttled"));
    }
}
