//! # S3 削除ターゲット
//!
//! オンボード済み S3 バケットの削除設定と、削除リクエストの値を表現する。
//!
//! ## 削除戦略
//!
//! - `OBJECT_KEY`: キーパターンに一致するオブジェクトを丸ごと削除する
//! - `ROW_LEVEL`: 複数顧客のデータが混在するファイルから該当行だけを取り除く
//!
//! ## 例
//!
//! バケット内のオブジェクトが `data/customers/{customer_id}/...` に格納されている場合、
//! ターゲットに `deletionKeyPattern = "data/customers/(\w+)/.*"` を設定し、
//! 削除キーの `deletionKeyPatternCaptureValue` に顧客 ID を指定する。

pub mod validated;

use serde::{Deserialize, Serialize};

use crate::pattern::DeletionKeyPattern;

/// S3 バケットに対する削除戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum S3DeletionStrategyType {
    /// オブジェクトキーのパターンで削除する
    ObjectKey,
    /// ファイル内の行単位で削除する
    RowLevel,
}

/// 行単位削除で解析するファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum FileFormat {
    /// JSON Lines（1 行 1 JSON オブジェクト）
    Jsonl,
    /// Apache Parquet
    Parquet,
}

/// S3 削除ターゲット
///
/// バケットごとに 1 つ作成され、以後のすべての削除リクエストで共有される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3DeletionTarget {
    /// 削除戦略
    pub strategy:                    S3DeletionStrategyType,
    /// バケットが存在する AWS リージョン
    pub region:                      String,
    /// バケット名
    pub bucket_name:                 String,
    /// 一覧取得を絞り込むキープレフィックス（例: `data/customers/`）
    #[serde(default)]
    pub object_key_prefix:           Option<String>,
    /// キャプチャグループをちょうど 1 つ含むオブジェクトキーパターン
    #[serde(default)]
    pub deletion_key_pattern:        Option<DeletionKeyPattern>,
    /// 行単位削除でファイル内の行を絞り込む属性名（`ROW_LEVEL` の場合は必須）
    #[serde(default)]
    pub deletion_row_attribute_name: Option<String>,
    /// 行単位削除で解析するファイル形式（`ROW_LEVEL` の場合は必須）
    #[serde(default)]
    pub object_file_format:          Option<FileFormat>,
}

/// S3 削除キーの値
///
/// `OBJECT_KEY` ではプレフィックスかキャプチャ値の少なくとも一方が必要。
/// `ROW_LEVEL` では行属性値が必要。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3DeletionKeyValue {
    /// ターゲットのプレフィックスより優先されるキープレフィックス（例: `customers/fred/`）
    #[serde(default)]
    pub object_key_prefix:                  Option<String>,
    /// パターンのキャプチャグループを置き換える値（例: 顧客 ID）
    #[serde(default)]
    pub deletion_key_pattern_capture_value: Option<String>,
    /// 行単位削除で削除対象の行を特定する属性値
    #[serde(default)]
    pub deletion_row_attribute_value:       Option<String>,
}
