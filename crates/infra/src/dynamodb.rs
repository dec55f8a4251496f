//! # DynamoDB 接続管理
//!
//! 削除戦略が使用する DynamoDB 操作のインターフェースと、AWS SDK による実装。
//!
//! ## 設計方針
//!
//! - **最小限の操作**: 削除戦略が必要とする DeleteItem / Query / Scan のみを公開する
//! - **ページ単位**: Query / Scan は 1 ページ分の結果を返し、ページネーションは呼び出し側で行う
//! - **ローカル開発**: DynamoDB Local を使用（`DYNAMODB_ENDPOINT` で接続先を指定）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use ondemand_deletion_infra::dynamodb;
//!
//! async fn setup() {
//!     let client = dynamodb::create_client("us-west-2", Some("http://localhost:18000")).await;
//!     let dynamodb = dynamodb::AwsDynamoDbClient::new(client);
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types::AttributeValue};

use crate::InfraError;

/// DynamoDB のアイテム（属性名 → 属性値）
pub type Item = HashMap<String, AttributeValue>;

/// Query / Scan の 1 ページ分の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPage {
    /// ページ内のアイテム
    pub items:              Vec<Item>,
    /// 次ページの開始位置。`None` または空の場合は最終ページ
    pub last_evaluated_key: Option<Item>,
}

impl ItemPage {
    /// 次ページの開始位置を返す
    ///
    /// `last_evaluated_key` が空のマップの場合も最終ページとして扱う。
    pub fn next_start_key(&self) -> Option<&Item> {
        self.last_evaluated_key.as_ref().filter(|key| !key.is_empty())
    }
}

/// GSI に対する Query リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub table_name:                  String,
    pub index_name:                  String,
    pub key_condition_expression:    String,
    pub expression_attribute_names:  HashMap<String, String>,
    pub expression_attribute_values: HashMap<String, AttributeValue>,
    pub exclusive_start_key:         Option<Item>,
}

/// フィルタ式付きのテーブル全体 Scan リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredScan {
    pub table_name:                  String,
    pub filter_expression:           String,
    pub expression_attribute_names:  HashMap<String, String>,
    pub expression_attribute_values: HashMap<String, AttributeValue>,
    pub exclusive_start_key:         Option<Item>,
}

/// DynamoDB クライアントのインターフェース
///
/// テスト時はモックに差し替え可能。
#[async_trait]
pub trait DynamoDbClient: Send + Sync {
    /// 主キーを指定してアイテムを 1 件削除する
    ///
    /// アイテムが存在しない場合も成功する。
    async fn delete_item(&self, table_name: &str, key: Item) -> Result<(), InfraError>;

    /// GSI を Query し、1 ページ分の結果を返す
    async fn query(&self, request: IndexQuery) -> Result<ItemPage, InfraError>;

    /// テーブルを Scan し、1 ページ分の結果を返す
    async fn scan(&self, request: FilteredScan) -> Result<ItemPage, InfraError>;
}

/// AWS DynamoDB クライアント
///
/// `aws-sdk-dynamodb` を使用した [`DynamoDbClient`] の実装。
/// DynamoDB Local とも互換動作する。
#[derive(Debug, Clone)]
pub struct AwsDynamoDbClient {
    client: Client,
}

impl AwsDynamoDbClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DynamoDbClient for AwsDynamoDbClient {
    async fn delete_item(&self, table_name: &str, key: Item) -> Result<(), InfraError> {
        self.client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| {
                InfraError::dynamo_db(format!(
                    "テーブル '{table_name}' のアイテム削除に失敗: {e}"
                ))
            })?;

        Ok(())
    }

    async fn query(&self, request: IndexQuery) -> Result<ItemPage, InfraError> {
        let output = self
            .client
            .query()
            .table_name(&request.table_name)
            .index_name(&request.index_name)
            .key_condition_expression(request.key_condition_expression)
            .set_expression_attribute_names(Some(request.expression_attribute_names))
            .set_expression_attribute_values(Some(request.expression_attribute_values))
            .set_exclusive_start_key(request.exclusive_start_key)
            .send()
            .await
            .map_err(|e| {
                InfraError::dynamo_db(format!(
                    "インデックス '{}' の Query に失敗: {e}",
                    request.index_name
                ))
            })?;

        Ok(ItemPage {
            items:              output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn scan(&self, request: FilteredScan) -> Result<ItemPage, InfraError> {
        let output = self
            .client
            .scan()
            .table_name(&request.table_name)
            .filter_expression(request.filter_expression)
            .set_expression_attribute_names(Some(request.expression_attribute_names))
            .set_expression_attribute_values(Some(request.expression_attribute_values))
            .set_exclusive_start_key(request.exclusive_start_key)
            .send()
            .await
            .map_err(|e| {
                InfraError::dynamo_db(format!(
                    "テーブル '{}' の Scan に失敗: {e}",
                    request.table_name
                ))
            })?;

        Ok(ItemPage {
            items:              output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }
}

/// DynamoDB クライアントを作成する
///
/// 認証情報は SDK のデフォルト認証チェーンで解決する。
/// `endpoint` を指定した場合は DynamoDB Local 向けにダミーの認証情報を使用する
/// （DynamoDB Local は認証情報を検証しない）。
///
/// # 引数
///
/// * `region` - 削除ターゲットのリージョン（例: `us-west-2`）
/// * `endpoint` - カスタムエンドポイント URL（例: `http://localhost:18000`）。
///   `None` の場合は AWS のデフォルトエンドポイントを使用する。
pub async fn create_client(region: &str, endpoint: Option<&str>) -> Client {
    let mut config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()));

    if let Some(endpoint_url) = endpoint {
        config_builder = config_builder
            .endpoint_url(endpoint_url)
            // DynamoDB Local はクレデンシャルを検証しないが、SDK はプロバイダが必要
            .credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
                "local", "local", None, None, "local",
            ));
    }

    let config = config_builder.load().await;

    Client::new(&config)
}
