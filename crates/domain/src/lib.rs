//! # オンデマンド削除 ドメイン層
//!
//! 削除ターゲット（データストアごとの削除設定）と削除キー（リクエストごとの値）の
//! モデル、および戦略ごとのバリデーションを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: すべてのモデルは構造的等価性のみを持つ不変値
//! - **検証してから絞り込む**: 生の削除ターゲットは戦略ごとの `Validated*` 型に
//!   変換してから使用する。`Validated*` 型は変換関数経由でしか構築できない
//! - **ネットワーク非依存**: このクレートは AWS SDK に依存しない
//!
//! ## 依存関係の方向
//!
//! ```text
//! infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`dynamodb`] - DynamoDB 削除ターゲット・削除キー・検証済みターゲット
//! - [`s3`] - S3 削除ターゲット・削除キー・検証済みターゲット
//! - [`pattern`] - オブジェクトキーパターンとキャプチャグループ置換
//! - [`error`] - ドメイン層エラー定義
//!
//! ## 使用例
//!
//! ```rust
//! use ondemand_deletion_domain::dynamodb::{
//!     DynamoDbDeletionKeySchema,
//!     DynamoDbDeletionStrategyType,
//!     DynamoDbDeletionTarget,
//!     validated::ValidatedDynamoDbTableKeyDeletionTarget,
//! };
//!
//! let target = DynamoDbDeletionTarget {
//!     strategy:            DynamoDbDeletionStrategyType::TableKey,
//!     region:              "us-west-2".to_string(),
//!     table_name:          "Customers".to_string(),
//!     partition_key_name:  "CustomerId".to_string(),
//!     sort_key_name:       None,
//!     deletion_key_schema: DynamoDbDeletionKeySchema::new("CustomerId"),
//!     gsi_name:            None,
//! };
//!
//! let validated = ValidatedDynamoDbTableKeyDeletionTarget::from_deletion_target(&target);
//! assert!(validated.is_ok());
//! ```

pub mod dynamodb;
pub mod error;
pub mod pattern;
pub mod s3;

pub use error::DomainError;
