//! # 削除エンジン設定
//!
//! 環境変数からストアの接続先を読み込む。
//!
//! リージョンは削除ターゲットごとに決まるため、ここでは扱わない。

use std::env;

/// DynamoDB エンドポイントを上書きする環境変数
pub const DYNAMODB_ENDPOINT_VAR: &str = "DYNAMODB_ENDPOINT";
/// S3 エンドポイントを上書きする環境変数
pub const S3_ENDPOINT_URL_VAR: &str = "S3_ENDPOINT_URL";

/// 削除エンジンの設定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionConfig {
    /// DynamoDB エンドポイント URL（DynamoDB Local 使用時に設定、未設定で AWS デフォルト）
    pub dynamodb_endpoint: Option<String>,
    /// S3 エンドポイント URL（MinIO 等の使用時に設定、未設定で AWS S3 デフォルト）
    pub s3_endpoint_url:   Option<String>,
}

impl DeletionConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            dynamodb_endpoint: read(DYNAMODB_ENDPOINT_VAR),
            s3_endpoint_url:   read(S3_ENDPOINT_URL_VAR),
        }
    }
}
