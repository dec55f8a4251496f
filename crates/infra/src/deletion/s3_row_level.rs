//! # S3RowLevelDeletionStrategy
//!
//! 複数顧客のデータが混在するファイルから、削除キーの属性値を持つ行だけを取り除く。
//!
//! ## 削除方式
//!
//! ファイル形式ごとに処理を分ける:
//!
//! - `JSONL`: キーパターンに一致する `.json` / `.jsonl` オブジェクトを列挙して内容を取得する。
//!   行の除去と書き戻しは未実装のため、取得後に [`InfraErrorKind::NotImplemented`] を返す
//! - `PARQUET`: 未実装のため、ストアに触れずに [`InfraErrorKind::NotImplemented`] を返す
//!
//! どちらの形式でも、何もせずに成功を返すことはない。
//!
//! [`InfraErrorKind::NotImplemented`]: crate::InfraErrorKind::NotImplemented

use std::sync::Arc;

use async_trait::async_trait;
use ondemand_deletion_domain::{
    pattern::effective_pattern,
    s3::{
        FileFormat,
        S3DeletionKeyValue,
        S3DeletionTarget,
        validated::{ValidatedS3RowLevelDeletionKeyValue, ValidatedS3RowLevelDeletionTarget},
    },
};

use super::{DeletionResult, S3DeletionStrategy, s3_object_key::keys_matching};
use crate::{error::InfraError, s3::S3Client};

const JSON_LINE_EXTENSIONS: [&str; 2] = [".json", ".jsonl"];

/// `ROW_LEVEL` 戦略の実装
pub struct S3RowLevelDeletionStrategy {
    client: Arc<dyn S3Client>,
}

impl S3RowLevelDeletionStrategy {
    pub fn new(client: Arc<dyn S3Client>) -> Self {
        Self { client }
    }

    async fn delete_json_line_rows(
        &self,
        target: &ValidatedS3RowLevelDeletionTarget,
        key: &ValidatedS3RowLevelDeletionKeyValue,
    ) -> Result<DeletionResult, InfraError> {
        let pattern = target
            .deletion_key_pattern()
            .map(|base| effective_pattern(base, key.deletion_key_pattern_capture_value()))
            .transpose()?;
        let prefix = key.object_key_prefix().or(target.object_key_prefix());

        tracing::info!(
            region = target.region(),
            bucket_name = target.bucket_name(),
            object_key_prefix = prefix,
            deletion_key_pattern = pattern.as_ref().map(|p| p.as_str()),
            deletion_row_attribute_name = target.deletion_row_attribute_name(),
            "S3: JSON Lines ファイルの行削除を開始"
        );

        let mut continuation_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects(target.bucket_name(), prefix, continuation_token.as_deref())
                .await?;

            let candidates: Vec<String> = keys_matching(page.keys, pattern.as_ref())
                .into_iter()
                .filter(|object_key| {
                    JSON_LINE_EXTENSIONS
                        .iter()
                        .any(|extension| object_key.ends_with(extension))
                })
                .collect();
            tracing::debug!(
                candidates = candidates.len(),
                "S3: 行削除の対象となる JSON オブジェクトを照合"
            );

            for object_key in &candidates {
                let body = self.client.get_object(target.bucket_name(), object_key).await?;
                // TODO: 行属性が削除キーの値と等しい JSON オブジェクトを除去し、変更があれば書き戻す
                tracing::debug!(
                    object_key = object_key.as_str(),
                    size = body.len(),
                    deletion_row_attribute_name = target.deletion_row_attribute_name(),
                    "S3: 行の除去と書き戻しは未実装"
                );
            }

            if !page.is_truncated {
                break;
            }
            continuation_token = page.next_continuation_token;
        }

        Err(InfraError::not_implemented(
            "JSON Line row-level deletion not yet implemented",
        ))
    }

    fn delete_parquet_rows(
        &self,
        target: &ValidatedS3RowLevelDeletionTarget,
    ) -> Result<DeletionResult, InfraError> {
        tracing::warn!(
            region = target.region(),
            bucket_name = target.bucket_name(),
            "S3: Parquet ファイルの行削除は未実装"
        );
        Err(InfraError::not_implemented(
            "Parquet row-level deletion not yet implemented",
        ))
    }
}

#[async_trait]
impl S3DeletionStrategy for S3RowLevelDeletionStrategy {
    #[tracing::instrument(skip_all, level = "debug", fields(bucket_name = %target.bucket_name))]
    async fn delete(
        &self,
        target: &S3DeletionTarget,
        key: &S3DeletionKeyValue,
    ) -> Result<DeletionResult, InfraError> {
        let target = ValidatedS3RowLevelDeletionTarget::from_deletion_target(target)?;
        let key = ValidatedS3RowLevelDeletionKeyValue::from_deletion_key_value(key)?;

        match target.object_file_format() {
            FileFormat::Jsonl => self.delete_json_line_rows(&target, &key).await,
            FileFormat::Parquet => self.delete_parquet_rows(&target),
        }
    }
}

#[cfg(test)]
mod tests {
    use ondemand_deletion_domain::{pattern::DeletionKeyPattern, s3::S3DeletionStrategyType};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{InfraErrorKind, mock::MockS3Client, s3::ObjectPage};

    #[fixture]
    fn target() -> S3DeletionTarget {
        S3DeletionTarget {
            strategy:                    S3DeletionStrategyType::RowLevel,
            region:                      "us-west-2".to_string(),
            bucket_name:                 "test-bucket".to_string(),
            object_key_prefix:           Some("data/customers/".to_string()),
            deletion_key_pattern:        Some(
                DeletionKeyPattern::new(r"data/customers/([\w\-]+)/.*").unwrap(),
            ),
            deletion_row_attribute_name: Some("customerId".to_string()),
            object_file_format:          Some(FileFormat::Jsonl),
        }
    }

    fn row_key() -> S3DeletionKeyValue {
        S3DeletionKeyValue {
            deletion_key_pattern_capture_value: Some("customer-123".to_string()),
            deletion_row_attribute_value: Some("customer-123".to_string()),
            ..Default::default()
        }
    }

    fn sut(client: &MockS3Client) -> S3RowLevelDeletionStrategy {
        S3RowLevelDeletionStrategy::new(Arc::new(client.clone()))
    }

    #[rstest]
    #[tokio::test]
    async fn test_jsonlは一致したjsonファイルを取得してから未実装エラーを返す(
        target: S3DeletionTarget,
    ) {
        let client = MockS3Client::new();
        client.put_object("data/customers/customer-123/file1.json", "{\"customerId\":\"customer-123\"}\n");
        client.put_object("data/customers/customer-123/file2.jsonl", "{}\n");
        client.push_list_page(ObjectPage {
            keys: vec![
                "data/customers/customer-123/file1.json".to_string(),
                "data/customers/customer-123/file2.jsonl".to_string(),
                "data/customers/customer-123/file3.parquet".to_string(),
                "data/customers/customer-456/file1.json".to_string(),
            ],
            ..Default::default()
        });

        let err = sut(&client).delete(&target, &row_key()).await.unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::NotImplemented(_)));
        assert_eq!(err.to_string(), "JSON Line row-level deletion not yet implemented");
        assert_eq!(
            client.fetched_keys(),
            vec![
                "data/customers/customer-123/file1.json".to_string(),
                "data/customers/customer-123/file2.jsonl".to_string(),
            ]
        );
        assert!(client.delete_batches().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_jsonlはパターンがなければプレフィックス配下のjsonをすべて対象にする(
        target: S3DeletionTarget,
    ) {
        let client = MockS3Client::new();
        client.put_object("data/customers/a.json", "{}\n");
        client.put_object("data/customers/b/c.jsonl", "{}\n");
        client.push_list_page(ObjectPage {
            keys:                    vec!["data/customers/a.json".to_string()],
            is_truncated:            true,
            next_continuation_token: Some("token-1".to_string()),
        });
        client.push_list_page(ObjectPage {
            keys: vec!["data/customers/b/c.jsonl".to_string()],
            ..Default::default()
        });
        let target = S3DeletionTarget {
            deletion_key_pattern: None,
            ..target
        };

        let err = sut(&client).delete(&target, &row_key()).await.unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::NotImplemented(_)));
        assert_eq!(client.list_calls().len(), 2);
        assert_eq!(client.fetched_keys().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_parquetはストアに触れずに未実装エラーを返す(target: S3DeletionTarget) {
        let client = MockS3Client::new();
        let target = S3DeletionTarget {
            object_file_format: Some(FileFormat::Parquet),
            ..target
        };

        let err = sut(&client).delete(&target, &row_key()).await.unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::NotImplemented(_)));
        assert_eq!(err.to_string(), "Parquet row-level deletion not yet implemented");
        assert!(client.list_calls().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_行属性値のない削除キーは拒否する(target: S3DeletionTarget) {
        let client = MockS3Client::new();
        let key = S3DeletionKeyValue {
            deletion_row_attribute_value: None,
            ..row_key()
        };

        let err = sut(&client).delete(&target, &key).await.unwrap_err();

        assert!(matches!(err.kind(), InfraErrorKind::Validation(_)));
        assert_eq!(err.to_string(), "Deletion row attribute value must be non-null");
        assert!(client.list_calls().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_ファイル形式のないターゲットは拒否する(target: S3DeletionTarget) {
        let client = MockS3Client::new();
        let target = S3DeletionTarget {
            object_file_format: None,
            ..target
        };

        let err = sut(&client).delete(&target, &row_key()).await.unwrap_err();

        assert_eq!(err.to_string(), "Object file format must not be null");
    }
}
