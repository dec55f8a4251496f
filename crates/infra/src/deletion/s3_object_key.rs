//! # S3ObjectKeyDeletionStrategy
//!
//! キーパターンに一致する S3 オブジェクトを削除する。
//!
//! ## 削除方式
//!
//! 1. 削除キーのキャプチャ値でパターンのキャプチャグループを置き換える
//! 2. プレフィックス（削除キーのものを優先）で ListObjectsV2 を実行する
//! 3. パターンにキー全体が一致するオブジェクトだけを DeleteObjects で削除する
//!    （1 ページにつき 1 回。一致がなければ呼ばない）
//! 4. 一覧が途切れなくなるまで繰り返す

use std::sync::Arc;

use async_trait::async_trait;
use ondemand_deletion_domain::{
    pattern::{DeletionKeyPattern, effective_pattern},
    s3::{
        S3DeletionKeyValue,
        S3DeletionTarget,
        validated::{ValidatedS3ObjectKeyDeletionKeyValue, ValidatedS3ObjectKeyDeletionTarget},
    },
};

use super::{DeletionResult, S3DeletionStrategy};
use crate::{error::InfraError, s3::S3Client};

/// パターンにキー全体が一致するキーだけを残す
///
/// パターンがない場合はすべてのキーを返す。
pub(super) fn keys_matching(keys: Vec<String>, pattern: Option<&DeletionKeyPattern>) -> Vec<String> {
    match pattern {
        Some(pattern) => keys
            .into_iter()
            .filter(|key| pattern.is_full_match(key))
            .collect(),
        None => keys,
    }
}

/// `OBJECT_KEY` 戦略の実装
pub struct S3ObjectKeyDeletionStrategy {
    client: Arc<dyn S3Client>,
}

impl S3ObjectKeyDeletionStrategy {
    pub fn new(client: Arc<dyn S3Client>) -> Self {
        Self { client }
    }

    async fn delete_keys(&self, bucket_name: &str, keys: &[String]) -> Result<(), InfraError> {
        let errors = self.client.delete_objects(bucket_name, keys).await?;
        if errors.is_empty() {
            return Ok(());
        }

        tracing::error!(
            bucket_name,
            requested = keys.len(),
            error_count = errors.len(),
            "S3 DeleteObjects: 一部のオブジェクト削除に失敗"
        );
        Err(InfraError::partial_batch_failure(format!(
            "Received errors in S3 DeleteObjects response: {errors:?}"
        )))
    }
}

#[async_trait]
impl S3DeletionStrategy for S3ObjectKeyDeletionStrategy {
    #[tracing::instrument(skip_all, level = "debug", fields(bucket_name = %target.bucket_name))]
    async fn delete(
        &self,
        target: &S3DeletionTarget,
        key: &S3DeletionKeyValue,
    ) -> Result<DeletionResult, InfraError> {
        let target = ValidatedS3ObjectKeyDeletionTarget::from_deletion_target(target)?;
        let key = ValidatedS3ObjectKeyDeletionKeyValue::from_deletion_key_value(key)?;

        let pattern = effective_pattern(
            target.deletion_key_pattern(),
            key.deletion_key_pattern_capture_value(),
        )?;
        let prefix = key.object_key_prefix().or(target.object_key_prefix());

        tracing::info!(
            region = target.region(),
            bucket_name = target.bucket_name(),
            object_key_prefix = prefix,
            deletion_key_pattern = pattern.as_str(),
            "S3: キーパターンによるオブジェクト削除を開始"
        );

        let mut deleted_count: u64 = 0;
        let mut continuation_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects(target.bucket_name(), prefix, continuation_token.as_deref())
                .await?;

            let listed = page.keys.len();
            let keys_to_delete = keys_matching(page.keys, Some(&pattern));
            tracing::debug!(
                listed,
                matched = keys_to_delete.len(),
                "S3: オブジェクト一覧の 1 ページ分を照合"
            );

            if !keys_to_delete.is_empty() {
                self.delete_keys(target.bucket_name(), &keys_to_delete).await?;
                deleted_count += keys_to_delete.len() as u64;
            }

            // ページネーション
            if !page.is_truncated {
                break;
            }
            continuation_token = page.next_continuation_token;
        }

        tracing::info!(
            bucket_name = target.bucket_name(),
            deleted_count,
            "S3: キーパターンによるオブジェクト削除が完了"
        );

        Ok(DeletionResult { deleted_count })
    }
}
