//! # DynamoDbDeletionConnector
//!
//! DynamoDB 削除リクエストの入口。削除ターゲットの戦略に応じて実装を選ぶ。

use std::sync::Arc;

use ondemand_deletion_domain::dynamodb::{
    DynamoDbDeletionKeyValue,
    DynamoDbDeletionStrategyType,
    DynamoDbDeletionTarget,
};

use super::{
    DeletionResult,
    DynamoDbDeletionStrategy,
    DynamoDbGsiQueryDeletionStrategy,
    DynamoDbScanDeletionStrategy,
    DynamoDbTableKeyDeletionStrategy,
};
use crate::{
    config::DeletionConfig,
    dynamodb::{self, AwsDynamoDbClient, DynamoDbClient},
    error::InfraError,
};

/// DynamoDB 削除コネクタ
pub struct DynamoDbDeletionConnector {
    table_key: DynamoDbTableKeyDeletionStrategy,
    gsi_query: DynamoDbGsiQueryDeletionStrategy,
    scan:      DynamoDbScanDeletionStrategy,
}

impl DynamoDbDeletionConnector {
    pub fn new(client: Arc<dyn DynamoDbClient>) -> Self {
        Self {
            table_key: DynamoDbTableKeyDeletionStrategy::new(Arc::clone(&client)),
            gsi_query: DynamoDbGsiQueryDeletionStrategy::new(Arc::clone(&client)),
            scan:      DynamoDbScanDeletionStrategy::new(client),
        }
    }

    /// 設定とリージョンから AWS DynamoDB に接続したコネクタを作成する
    pub async fn connect(config: &DeletionConfig, region: &str) -> Self {
        let client = dynamodb::create_client(region, config.dynamodb_endpoint.as_deref()).await;
        Self::new(Arc::new(AwsDynamoDbClient::new(client)))
    }

    fn strategy_for(&self, strategy: DynamoDbDeletionStrategyType) -> &dyn DynamoDbDeletionStrategy {
        match strategy {
            DynamoDbDeletionStrategyType::TableKey => &self.table_key,
            DynamoDbDeletionStrategyType::GsiQuery => &self.gsi_query,
            DynamoDbDeletionStrategyType::Scan => &self.scan,
        }
    }

    /// 削除キーに一致するデータを削除ターゲットのテーブルから削除する
    pub async fn delete_data(
        &self,
        target: &DynamoDbDeletionTarget,
        key: &DynamoDbDeletionKeyValue,
    ) -> Result<DeletionResult, InfraError> {
        tracing::info!(
            strategy = %target.strategy,
            table_name = %target.table_name,
            "DynamoDB 削除リクエストを開始"
        );

        let result = self.strategy_for(target.strategy).delete(target, key).await;

        match &result {
            Ok(DeletionResult { deleted_count }) => tracing::info!(
                strategy = %target.strategy,
                table_name = %target.table_name,
                deleted_count,
                "DynamoDB 削除リクエストが完了"
            ),
            Err(e) => tracing::error!(
                strategy = %target.strategy,
                table_name = %target.table_name,
                error = %e,
                "DynamoDB 削除リクエストが失敗"
            ),
        }

        result
    }
}
