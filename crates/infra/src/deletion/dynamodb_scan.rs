//! # DynamoDbScanDeletionStrategy
//!
//! テーブル全体を Scan し、削除キーに一致するアイテムをすべて削除する。
//!
//! ## 削除方式
//!
//! GSI も主キーも使えないテーブル向けの最終手段。制御構造は
//! [`DynamoDbGsiQueryDeletionStrategy`](super::DynamoDbGsiQueryDeletionStrategy) と同じで、
//! Query の代わりにフィルタ式付きの Scan を使う。スキーマの属性名はキー属性でなくてよい。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use ondemand_deletion_domain::dynamodb::{
    DynamoDbDeletionKeyValue,
    DynamoDbDeletionTarget,
    validated::ValidatedDynamoDbScanDeletionTarget,
};

use super::{DeletionResult, DynamoDbDeletionStrategy, dynamodb_key::delete_page_items};
use crate::{
    dynamodb::{DynamoDbClient, FilteredScan},
    error::InfraError,
};

const RESULT_SOURCE: &str = "Scan result";

/// `SCAN` 戦略の実装
pub struct DynamoDbScanDeletionStrategy {
    client: Arc<dyn DynamoDbClient>,
}

impl DynamoDbScanDeletionStrategy {
    pub fn new(client: Arc<dyn DynamoDbClient>) -> Self {
        Self { client }
    }
}

fn build_scan(
    target: &ValidatedDynamoDbScanDeletionTarget,
    key: &DynamoDbDeletionKeyValue,
    uses_secondary_key: bool,
) -> FilteredScan {
    let schema = target.deletion_key_schema();
    let mut filter_expression = "#primaryKey = :primaryKeyValue".to_string();
    let mut names = HashMap::from([("#primaryKey".to_string(), schema.primary_key_name.clone())]);
    let mut values = HashMap::from([(
        ":primaryKeyValue".to_string(),
        AttributeValue::S(key.primary_key_value.clone()),
    )]);

    if let (true, Some(name), Some(value)) = (
        uses_secondary_key,
        &schema.secondary_key_name,
        &key.secondary_key_value,
    ) {
        filter_expression.push_str(" AND #secondaryKey = :secondaryKeyValue");
        names.insert("#secondaryKey".to_string(), name.clone());
        values.insert(
            ":secondaryKeyValue".to_string(),
            AttributeValue::S(value.clone()),
        );
    }

    FilteredScan {
        table_name: target.table_name().to_string(),
        filter_expression,
        expression_attribute_names: names,
        expression_attribute_values: values,
        exclusive_start_key: None,
    }
}

#[async_trait]
impl DynamoDbDeletionStrategy for DynamoDbScanDeletionStrategy {
    #[tracing::instrument(skip_all, level = "debug", fields(table_name = %target.table_name))]
    async fn delete(
        &self,
        target: &DynamoDbDeletionTarget,
        key: &DynamoDbDeletionKeyValue,
    ) -> Result<DeletionResult, InfraError> {
        let target = ValidatedDynamoDbScanDeletionTarget::from_deletion_target(target)?;
        let uses_secondary_key = target.uses_secondary_key(key)?;
        let scan = build_scan(&target, key, uses_secondary_key);

        tracing::info!(
            region = target.region(),
            table_name = target.table_name(),
            uses_secondary_key,
            "DynamoDB: テーブル全体を Scan して削除を開始"
        );

        let mut deleted_count: u64 = 0;
        let mut exclusive_start_key = None;

        loop {
            let page = self
                .client
                .scan(FilteredScan {
                    exclusive_start_key,
                    ..scan.clone()
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
                "DynamoDB: Scan の 1 ページ分を削除"
            );

            exclusive_start_key = page.next_start_key().cloned();
            if exclusive_start_key.is_none() {
                break;
            }
        }

        tracing::info!(
            table_name = target.table_name(),
            deleted_count,
            "DynamoDB: Scan による削除が完了"
        );

        Ok(DeletionResult { deleted_count })
    }
}
