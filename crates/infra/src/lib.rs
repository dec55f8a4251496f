//! # オンデマンド削除 インフラ層
//!
//! 削除ターゲットと削除キーから、DynamoDB / S3 に対する削除操作を実行する。
//!
//! ## 設計方針
//!
//! - **コネクタが唯一の入口**: 呼び出し元は [`DynamoDbDeletionConnector`] /
//!   [`S3DeletionConnector`] の `delete_data` だけを使用する
//! - **ストアはトレイト越し**: [`dynamodb::DynamoDbClient`] / [`s3::S3Client`] の背後に
//!   AWS SDK を隠し、テストではインメモリのモックに差し替える
//! - **検証してから触る**: 各戦略はストアを呼ぶ前に削除ターゲットを検証する
//!
//! ## 依存関係
//!
//! ```text
//! infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`deletion`] - 削除戦略とコネクタ
//! - [`dynamodb`] - DynamoDB クライアント
//! - [`s3`] - S3 クライアント
//! - [`config`] - 接続先の設定
//! - [`error`] - インフラ層エラー定義
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use ondemand_deletion_domain::dynamodb::{DynamoDbDeletionKeyValue, DynamoDbDeletionTarget};
//! use ondemand_deletion_infra::{DeletionConfig, DynamoDbDeletionConnector};
//!
//! async fn delete_customer(target: &DynamoDbDeletionTarget) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DeletionConfig::from_env();
//!     let connector = DynamoDbDeletionConnector::connect(&config, &target.region).await;
//!
//!     let result = connector
//!         .delete_data(target, &DynamoDbDeletionKeyValue::new("Customer123"))
//!         .await?;
//!     println!("{} 件削除しました", result.deleted_count);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod deletion;
pub mod dynamodb;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod s3;

pub use config::DeletionConfig;
pub use deletion::{DeletionResult, DynamoDbDeletionConnector, S3DeletionConnector};
pub use error::{InfraError, InfraErrorKind};
