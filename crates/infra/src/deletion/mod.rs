//! # オンデマンド削除基盤
//!
//! 削除ターゲット（ストアごとの削除設定）と削除キー（リクエストごとの値）から、
//! 具体的な削除操作を実行する。
//!
//! ## 概要
//!
//! 呼び出し元は [`DynamoDbDeletionConnector`] / [`S3DeletionConnector`] の
//! `delete_data` だけを使用する。コネクタは削除戦略に応じて次の実装に振り分ける:
//!
//! | ストア | 戦略 | 実装 |
//! |--------|------|------|
//! | DynamoDB | `TABLE_KEY` | [`DynamoDbTableKeyDeletionStrategy`] |
//! | DynamoDB | `GSI_QUERY` | [`DynamoDbGsiQueryDeletionStrategy`] |
//! | DynamoDB | `SCAN` | [`DynamoDbScanDeletionStrategy`] |
//! | S3 | `OBJECT_KEY` | [`S3ObjectKeyDeletionStrategy`] |
//! | S3 | `ROW_LEVEL` | [`S3RowLevelDeletionStrategy`] |
//!
//! ## 実行モデル
//!
//! 1 回の削除リクエストは逐次的な呼び出しの連鎖で、ページ・アイテムを並行処理しない。
//! リトライは行わず、途中で失敗した場合もそれまでの削除は確定したままになる。

mod dynamodb_connector;
mod dynamodb_gsi_query;
mod dynamodb_key;
mod dynamodb_scan;
mod dynamodb_table_key;
mod s3_connector;
mod s3_object_key;
mod s3_row_level;

use async_trait::async_trait;
pub use dynamodb_connector::DynamoDbDeletionConnector;
pub use dynamodb_gsi_query::DynamoDbGsiQueryDeletionStrategy;
pub use dynamodb_scan::DynamoDbScanDeletionStrategy;
pub use dynamodb_table_key::DynamoDbTableKeyDeletionStrategy;
use ondemand_deletion_domain::{
    dynamodb::{DynamoDbDeletionKeyValue, DynamoDbDeletionTarget},
    s3::{S3DeletionKeyValue, S3DeletionTarget},
};
pub use s3_connector::S3DeletionConnector;
pub use s3_object_key::S3ObjectKeyDeletionStrategy;
pub use s3_row_level::S3RowLevelDeletionStrategy;

use crate::error::InfraError;

/// 削除リクエストの実行結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionResult {
    /// 発行した削除の件数（DynamoDB はアイテム数、S3 はオブジェクト数）
    pub deleted_count: u64,
}

/// DynamoDB 削除戦略トレイト
///
/// 各戦略は未検証の削除ターゲットを受け取り、ストアに触れる前に自身で検証する。
#[async_trait]
pub trait DynamoDbDeletionStrategy: Send + Sync {
    /// 削除キーに一致するアイテムを削除する
    async fn delete(
        &self,
        target: &DynamoDbDeletionTarget,
        key: &DynamoDbDeletionKeyValue,
    ) -> Result<DeletionResult, InfraError>;
}

/// S3 削除戦略トレイト
#[async_trait]
pub trait S3DeletionStrategy: Send + Sync {
    /// 削除キーに一致するオブジェクト（または行）を削除する
    async fn delete(
        &self,
        target: &S3DeletionTarget,
        key: &S3DeletionKeyValue,
    ) -> Result<DeletionResult, InfraError>;
}
