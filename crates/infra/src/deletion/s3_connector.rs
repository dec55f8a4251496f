//! # S3DeletionConnector
//!
//! S3 削除リクエストの入口。削除ターゲットの戦略に応じて実装を選ぶ。

use std::sync::Arc;

use ondemand_deletion_domain::s3::{S3DeletionKeyValue, S3DeletionStrategyType, S3DeletionTarget};

use super::{
    DeletionResult,
    S3DeletionStrategy,
    S3ObjectKeyDeletionStrategy,
    S3RowLevelDeletionStrategy,
};
use crate::{
    config::DeletionConfig,
    error::InfraError,
    s3::{self, AwsS3Client, S3Client},
};

/// S3 削除コネクタ
pub struct S3DeletionConnector {
    object_key: S3ObjectKeyDeletionStrategy,
    row_level:  S3RowLevelDeletionStrategy,
}

impl S3DeletionConnector {
    pub fn new(client: Arc<dyn S3Client>) -> Self {
        Self {
            object_key: S3ObjectKeyDeletionStrategy::new(Arc::clone(&client)),
            row_level:  S3RowLevelDeletionStrategy::new(client),
        }
    }

    /// 設定とリージョンから AWS S3 に接続したコネクタを作成する
    pub async fn connect(config: &DeletionConfig, region: &str) -> Self {
        let client = s3::create_client(region, config.s3_endpoint_url.as_deref()).await;
        Self::new(Arc::new(AwsS3Client::new(client)))
    }

    fn strategy_for(&self, strategy: S3DeletionStrategyType) -> &dyn S3DeletionStrategy {
        match strategy {
            S3DeletionStrategyType::ObjectKey => &self.object_key,
            S3DeletionStrategyType::RowLevel => &self.row_level,
        }
    }

    /// 削除キーに一致するデータを削除ターゲットのバケットから削除する
    pub async fn delete_data(
        &self,
        target: &S3DeletionTarget,
        key: &S3DeletionKeyValue,
    ) -> Result<DeletionResult, InfraError> {
        tracing::info!(
            strategy = %target.strategy,
            bucket_name = %target.bucket_name,
            "S3 削除リクエストを開始"
        );

        let result = self.strategy_for(target.strategy).delete(target, key).await;

        match &result {
            Ok(DeletionResult { deleted_count }) => tracing::info!(
                strategy = %target.strategy,
                bucket_name = %target.bucket_name,
                deleted_count,
                "S3 削除リクエストが完了"
            ),
            Err(e) => tracing::error!(
                strategy = %target.strategy,
                bucket_name = %target.bucket_name,
                error = %e,
                "S3 削除リクエストが失敗"
            ),
        }

        result
    }
}
