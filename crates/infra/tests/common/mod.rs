//! テスト共通フィクスチャ
//!
//! DynamoDB Local / MinIO を使用する統合テストで共通利用する接続ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use ondemand_deletion_infra::DeletionConfig;

/// テストで使用するリージョン
pub const REGION: &str = "us-west-2";

/// テスト用の接続設定
///
/// `.env` から環境変数を読み込み、未設定のエンドポイントはローカルの既定値で補う:
/// - `DYNAMODB_ENDPOINT`: `http://localhost:18000`
/// - `S3_ENDPOINT_URL`: `http://localhost:19000`
pub fn test_config() -> DeletionConfig {
    dotenvy::dotenv().ok();

    let config = DeletionConfig::from_env();
    DeletionConfig {
        dynamodb_endpoint: config
            .dynamodb_endpoint
            .or_else(|| Some("http://localhost:18000".to_string())),
        s3_endpoint_url:   config
            .s3_endpoint_url
            .or_else(|| Some("http://localhost:19000".to_string())),
    }
}

/// テストごとに一意な名前を生成する（UUID v7 で分離）
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::now_v7())
}
