//! # DynamoDbGsiQueryDeletionStrategy
//!
//! GSI を Query し、削除キーに一致するアイテムをすべて削除する。
//!
//! ## 削除方式
//!
//! 1. 削除キースキーマの属性名（GSI のキー）で等価条件の KeyConditionExpression を組み立てる。
//!    スキーマがセカンダリ属性を宣言しているのに削除キーにセカンダリ値がなければ、
//!    ストアを呼ばずに失敗する
//! 2. GSI を Query し、結果アイテムから**テーブルの**主キーを取り出す
//! 3. アイテムごとに DeleteItem を即時発行する（ページやアイテムをまたいだバッチ化はしない）
//! 4. `LastEvaluatedKey` がなくなるまで繰り返す

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use ondemand_deletion_domain::dynamodb::{
    DynamoDbDeletionKeyValue,
    DynamoDbDeletionTarget,
    validated::ValidatedDynamoDbGsiDeletionTarget,
};

use super::{DeletionResult, DynamoDbDeletionStrategy, dynamodb_key::delete_page_items};
use crate::{
    dynamodb::{DynamoDbClient, IndexQuery},
    error::InfraError,
};

const RESULT_SOURCE: &str = "GSI query result";

/// `GSI_QUERY` 戦略の実装
pub struct DynamoDbGsiQueryDeletionStrategy {
    client: Arc<dyn DynamoDbClient>,
}

impl DynamoDbGsiQueryDeletionStrategy {
    pub fn new(client: Arc<dyn DynamoDbClient>) -> Self {
        Self { client }
    }
}

/// 先頭ページの Query リクエストを組み立てる
fn build_query(
    target: &ValidatedDynamoDbGsiDeletionTarget,
    key: &DynamoDbDeletionKeyValue,
    uses_secondary_key: bool,
) -> IndexQuery {
    let schema = target.deletion_key_schema();
    let mut key_condition_expression = "#partitionKeyAlias = :partitionKeyValue".to_string();
    let mut names = HashMap::from([(
        "#partitionKeyAlias".to_string(),
        schema.primary_key_name.clone(),
    )]);
    let mut values = HashMap::from([(
        ":partitionKeyValue".to_string(),
        AttributeValue::S(key.primary_key_value.clone()),
    )]);

    if let (true, Some(secondary_key_name), Some(secondary)) = (
        uses_secondary_key,
        &schema.secondary_key_name,
        &key.secondary_key_value,
    ) {
        key_condition_expression.push_str(" AND #sortKeyAlias = :sortKeyValue");
        names.insert("#sortKeyAlias".to_string(), secondary_key_name.clone());
        values.insert(
            ":sortKeyValue".to_string(),
            AttributeValue::S(secondary.clone()),
        );
    }

    IndexQuery {
        table_name: target.table_name().to_string(),
        index_name: target.gsi_name().to_string(),
        key_condition_expression,
        expression_attribute_names: names,
        expression_attribute_values: values,
        exclusive_start_key: None,
    }
}

#[async_trait]
impl DynamoDbDeletionStrategy for DynamoDbGsiQueryDeletionStrategy {
    #[tracing::instrument(skip_all, level = "debug", fields(table_name = %target.table_name))]
    async fn delete(
        &self,
        target: &DynamoDbDeletionTarget,
        key: &DynamoDbDeletionKeyValue,
    ) -> Result<DeletionResult, InfraError> {
        let target = ValidatedDynamoDbGsiDeletionTarget::from_deletion_target(target)?;
        let uses_secondary_key = target.uses_secondary_key(key)?;
        let query = build_query(&target, key, uses_secondary_key);

        tracing::info!(
            region = target.region(),
            table_name = target.table_name(),
            gsi_name = target.gsi_name(),
            uses_secondary_key,
            "DynamoDB: GSI を Query して削除を開始"
        );

        let mut deleted_count: u64 = 0;
        let mut exclusive_start_key = None;

        loop {
            let page = self
                .client
                .query(IndexQuery {
                    exclusive_start_key,
                    ..query.clone()
                })
                .await?;

            deleted_count += delete_page_items(
                self.client.as_ref(),
                target.table_name(),
                target.partition_key_name(),
                target.sort_key_name(),
                &page.items,
                RESULT_SOURCE,
            )
            .await?;

            tracing::debug!(
                page_items = page.items.len(),
                deleted_count,
                "DynamoDB: GSI Query の 1 ページ分を削除"
            );

            // ページネーション
            exclusive_start_key = page.next_start_key().cloned();
            if exclusive_start_key.is_none() {
                break;
            }
        }

        tracing::info!(
            table_name = target.table_name(),
            deleted_count,
            "DynamoDB: GSI Query による削除が完了"
        );

        Ok(DeletionResult { deleted_count })
    }
}

#[cfg(test)]
mod tests {
    use ondemand_deletion_domain::dynamodb::{
        DynamoDbDeletionKeySchema,
        DynamoDbDeletionStrategyType,
    };
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{
        InfraErrorKind,
        dynamodb::{Item, ItemPage},
        mock::MockDynamoDbClient,
    };

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn item(customer_id: &str, sort_key: &str) -> Item {
        HashMap::from([
            ("CustomerId".to_string(), s(customer_id)),
            ("SortKey".to_string(), s(sort_key)),
            ("GsiPartitionKey".to_string(), s("Customer123")),
        ])
    }

    #[fixture]
    fn target() -> DynamoDbDeletionTarget {
        DynamoDbDeletionTarget {
            strategy:            DynamoDbDeletionStrategyType::GsiQuery,
            region:              "us-west-2".to_string(),
            table_name:          "TestTable".to_string(),
            partition_key_name:  "CustomerId".to_string(),
            sort_key_name:       Some("SortKey".to_string()),
            deletion_key_schema: DynamoDbDeletionKeySchema::new("GsiPartitionKey"),
            gsi_name:            Some("GsiIndex".to_string()),
        }
    }

    fn sut(client: &MockDynamoDbClient) -> DynamoDbGsiQueryDeletionStrategy {
        DynamoDbGsiQueryDeletionStrategy::new(Arc::new(client.clone()))
    }

    #[rstest]
    #[tokio::test]
    async fn test_ページをまたいで一致したアイテムをすべて削除する(target: DynamoDbDeletionTarget) {
        let client = MockDynamoDbClient::new();
        client.push_query_page(ItemPage {
            items:              vec![item("Customer1", "SortValue456"), item("Customer2", "SortValue456")],
            last_evaluated_key: Some(item("Customer2", "SortValue456")),
        });
        client.push_query_page(ItemPage {
            items:              vec![item("Customer3", "SortValue789")],
            last_evaluated_key: None,
        });

        let result = sut(&client)
            .delete(&target, &DynamoDbDeletionKeyValue::new("Customer123"))
            .await
            .unwrap();

        assert_eq!(result.deleted_count, 3);
        assert_eq!(client.queries().len(), 2);
        assert_eq!(
            client.deleted_keys(),
            vec![
                HashMap::from([
                    ("CustomerId".to_string(), s("Customer1")),
                    ("SortKey".to_string(), s("SortValue456")),
                ]),
                HashMap::from([
                    ("CustomerId".to_string(), s("Customer2")),
                    ("SortKey".to_string(), s("SortValue456")),
                ]),
                HashMap::from([
                    ("CustomerId".to_string(), s("Customer3")),
                    ("SortKey".to_string(), s("SortValue789")),
                ]),
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_2ページ目は前ページの開始位置から取得する(target: DynamoDbDeletionTarget) {
        let client = MockDynamoDbClient::new();
        let cursor = item("Customer2", "SortValue456");
        client.push_query_page(ItemPage {
            items:              vec![],
            last_evaluated_key: Some(cursor.clone()),
        });

        sut(&client)
            .delete(&target, &DynamoDbDeletionKeyValue::new("Customer123"))
            .await
            .unwrap();

        let queries = client.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].exclusive_start_key.is_none());
        assert_eq!(queries[1].exclusive_start_key, Some(cursor));
    }

    #[rstest]
    #[tokio::test]
    async fn test_空の開始位置で終了する(target: DynamoDbDeletionTarget) {
        let client = MockDynamoDbClient::new();
        client.push_query_page(ItemPage {
            items:              vec![item("Customer1", "SortValue456")],
            last_evaluated_key: Some(HashMap::new()),
        });

        let result = sut(&client)
            .delete(&target, &DynamoDbDeletionKeyValue::new("Customer123"))
            .await
            .unwrap();

        assert_eq!(result.deleted_count, 1);
        assert_eq!(client.queries().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_パーティションキーだけのquery条件を組み立てる(target: DynamoDbDeletionTarget) {
        let client = MockDynamoDbClient::new();

        sut(&client)
            .delete(&target, &DynamoDbDeletionKeyValue::new("Customer123"))
            .await
            .unwrap();

        let query = &client.queries()[0];
        assert_eq!(query.table_name, "TestTable");
        assert_eq!(query.index_name, "GsiIndex");
        assert_eq!(
            query.key_condition_expression,
            "#partitionKeyAlias = :partitionKeyValue"
        );
        assert_eq!(
            query.expression_attribute_names,
            HashMap::from([("#partitionKeyAlias".to_string(), "GsiPartitionKey".to_string())])
        );
        assert_eq!(
            query.expression_attribute_values,
            HashMap::from([(":partitionKeyValue".to_string(), s("Customer123"))])
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_セカンダリ属性を含むquery条件を組み立てる(target: DynamoDbDeletionTarget) {
        let client = MockDynamoDbClient::new();
        let target = DynamoDbDeletionTarget {
            deletion_key_schema: DynamoDbDeletionKeySchema::with_secondary(
                "GsiPartitionKey",
                "GsiSortKey",
            ),
            ..target
        };

        sut(&client)
            .delete(
                &target,
                &DynamoDbDeletionKeyValue::with_secondary("Customer123", "SortValue456"),
            )
            .await
            .unwrap();

        let query = &client.queries()[0];
        assert_eq!(
            query.key_condition_expression,
            "#partitionKeyAlias = :partitionKeyValue AND #sortKeyAlias = :sortKeyValue"
        );
        assert_eq!(
            query.expression_attribute_names.get("#sortKeyAlias"),
            Some(&"GsiSortKey".to_string())
        );
        assert_eq!(
            query.expression_attribute_values.get(":sortKeyValue"),
            Some(&s("SortValue456"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_スキーマにないセカンダリ値は送らない(target: DynamoDbDeletionTarget) {
        let client = MockDynamoDbClient::new();

        sut(&client)
            .delete(
                &target,
                &DynamoDbDeletionKeyValue::with_secondary("Customer123", "SortValue456"),
            )
            .await
            .unwrap();

        let query = &client.queries()[0];
        assert!(!query.expression_attribute_values.contains_key(":sortKeyValue"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_セカンダリ値のない削除キーはストアを呼ばずに失敗する(
        target: DynamoDbDeletionTarget,
    ) {
        let client = MockDynamoDbClient::new();
        let target = DynamoDbDeletionTarget {
            deletion_key_schema: DynamoDbDeletionKeySchema::with_secondary(
                "GsiPartitionKey",
                "GsiSortKey",
            ),
            ..target
        };

        let err = sut(&client)
            .delete(&target, &DynamoDbDeletionKeyValue::new("Customer123"))
            .await
            .unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Mismatch between deletion key and deletion key schema \
             DynamoDbDeletionKeySchema { primary_key_name: \"GsiPartitionKey\", secondary_key_name: Some(\"GsiSortKey\") }, \
             missing secondary key value"
        );
        assert!(client.calls().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_テーブルのキーがないアイテムで中断する(target: DynamoDbDeletionTarget) {
        let client = MockDynamoDbClient::new();
        let broken = HashMap::from([
            ("CustomerId".to_string(), s("Customer2")),
            ("GsiPartitionKey".to_string(), s("Customer123")),
        ]);
        client.push_query_page(ItemPage {
            items:              vec![item("Customer1", "SortValue456"), broken],
            last_evaluated_key: None,
        });

        let err = sut(&client)
            .delete(&target, &DynamoDbDeletionKeyValue::new("Customer123"))
            .await
            .unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::DataInconsistency(_)));
        assert_eq!(
            err.to_string(),
            "GSI query result sort key missing or not a string: None"
        );
        // 中断前の削除は確定している
        assert_eq!(client.deleted_keys().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_gsi名がなければストアを呼ばずに失敗する(target: DynamoDbDeletionTarget) {
        let client = MockDynamoDbClient::new();
        let target = DynamoDbDeletionTarget {
            gsi_name: None,
            ..target
        };

        let err = sut(&client)
            .delete(&target, &DynamoDbDeletionKeyValue::new("Customer123"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "GSI name must not be null");
        assert!(client.calls().is_empty());
    }
}
