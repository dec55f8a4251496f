//! # S3 接続管理
//!
//! 削除戦略が使用する S3 操作のインターフェースと、AWS SDK による実装。
//!
//! ## 設計方針
//!
//! - **ローカル開発**: MinIO 等の互換ストレージを使用（`S3_ENDPOINT_URL` で接続先を指定）
//! - **本番環境**: IAM ロールによる認証で Amazon S3 に接続（`S3_ENDPOINT_URL` 未設定）
//! - **バケットは引数で渡す**: 削除ターゲットごとにバケットが異なるため、
//!   クライアントはバケット名を保持しない
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use ondemand_deletion_infra::s3;
//!
//! async fn setup() {
//!     // ローカル（MinIO）
//!     let client = s3::create_client("us-west-2", Some("http://localhost:19000")).await;
//!     let s3 = s3::AwsS3Client::new(client);
//!
//!     // 本番（AWS S3）
//!     let client = s3::create_client("us-west-2", None).await;
//!     let s3 = s3::AwsS3Client::new(client);
//! }
//! ```

use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    types::{Delete, ObjectIdentifier},
};
use bytes::Bytes;

use crate::InfraError;

/// ListObjectsV2 の 1 ページ分の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// ページ内のオブジェクトキー（一覧の順序を保持する）
    pub keys:                    Vec<String>,
    /// 続きのページがあるか
    pub is_truncated:            bool,
    /// 次ページの継続トークン
    pub next_continuation_token: Option<String>,
}

/// DeleteObjects のレスポンスに含まれるオブジェクト単位のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDeletionError {
    pub key:     Option<String>,
    pub code:    Option<String>,
    pub message: Option<String>,
}

/// S3 クライアントのインターフェース
///
/// テスト時はモックに差し替え可能。
#[async_trait]
pub trait S3Client: Send + Sync {
    /// オブジェクトキーを 1 ページ分取得する（ListObjectsV2）
    ///
    /// # 引数
    ///
    /// * `bucket` - バケット名
    /// * `prefix` - キープレフィックス。`None` の場合はバケット全体
    /// * `continuation_token` - 前ページの継続トークン。先頭ページでは `None`
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, InfraError>;

    /// オブジェクトを一括削除する（DeleteObjects）
    ///
    /// リクエスト自体の失敗は `Err` を返す。オブジェクト単位の失敗は
    /// 戻り値のリストで返す（空なら全件成功）。
    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<ObjectDeletionError>, InfraError>;

    /// オブジェクトの内容を取得する（GetObject）
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, InfraError>;
}

/// AWS S3 クライアント
///
/// `aws-sdk-s3` を使用した [`S3Client`] の実装。
/// MinIO とも互換動作する。
#[derive(Debug, Clone)]
pub struct AwsS3Client {
    client: Client,
}

impl AwsS3Client {
    /// 新しい S3 クライアントを作成する
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl S3Client for AwsS3Client {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, InfraError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(String::from))
            .set_continuation_token(continuation_token.map(String::from))
            .send()
            .await
            .map_err(|e| InfraError::s3(format!("オブジェクト一覧の取得に失敗: {e}")))?;

        Ok(ObjectPage {
            keys:                    output
                .contents()
                .iter()
                .filter_map(|obj| obj.key().map(String::from))
                .collect(),
            is_truncated:            output.is_truncated() == Some(true),
            next_continuation_token: output.next_continuation_token().map(String::from),
        })
    }

    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<ObjectDeletionError>, InfraError> {
        let objects = keys
            .iter()
            .map(|key| {
                ObjectIdentifier::builder()
                    .key(key)
                    .build()
                    .map_err(|e| InfraError::s3(format!("ObjectIdentifier の構築に失敗: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| InfraError::s3(format!("Delete リクエストの構築に失敗: {e}")))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| InfraError::s3(format!("オブジェクトの削除に失敗: {e}")))?;

        Ok(output
            .errors()
            .iter()
            .map(|error| ObjectDeletionError {
                key:     error.key().map(String::from),
                code:    error.code().map(String::from),
                message: error.message().map(String::from),
            })
            .collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, InfraError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| InfraError::s3(format!("オブジェクト '{key}' の取得に失敗: {e}")))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| InfraError::s3(format!("オブジェクト '{key}' の読み込みに失敗: {e}")))?;

        Ok(body.into_bytes())
    }
}

/// S3 クライアントを作成する
///
/// `endpoint` が `Some` の場合は MinIO 等のカスタムエンドポイントに接続する。
/// `None` の場合は AWS S3 のデフォルトエンドポイントを使用する。
///
/// 認証情報は SDK のデフォルト認証チェーンで解決する:
/// - ローカル: 環境変数 `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`（`.env` で設定）
/// - 本番: IAM ロール
///
/// # 引数
///
/// * `region` - 削除ターゲットのリージョン（例: `us-west-2`）
/// * `endpoint` - カスタムエンドポイント URL（例: `http://localhost:19000`）
pub async fn create_client(region: &str, endpoint: Option<&str>) -> Client {
    let mut config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()));

    if let Some(endpoint_url) = endpoint {
        config_builder = config_builder.endpoint_url(endpoint_url);
    }

    let config = config_builder.load().await;

    // MinIO はパススタイルが必要（バーチャルホスト型 URL を使わない）
    let s3_config_builder = aws_sdk_s3::config::Builder::from(&config);
    let s3_config = if endpoint.is_some() {
        s3_config_builder.force_path_style(true).build()
    } else {
        s3_config_builder.build()
    };

    Client::from_conf(s3_config)
}
