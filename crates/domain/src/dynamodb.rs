//! # DynamoDB 削除ターゲット
//!
//! オンボード済み DynamoDB テーブルの削除設定と、削除リクエストの値を表現する。
//!
//! ## 削除戦略
//!
//! | 戦略 | 概要 | 効率 |
//! |------|------|------|
//! | `TABLE_KEY` | テーブルの主キーで 1 件削除 | 最も効率的 |
//! | `GSI_QUERY` | GSI を Query し、該当アイテムを 1 件ずつ削除 | 中 |
//! | `SCAN` | テーブル全体を Scan し、該当アイテムを 1 件ずつ削除 | 最も非効率（最終手段） |
//!
//! ## 削除キースキーマ
//!
//! [`DynamoDbDeletionKeySchema`] の属性名は戦略によって意味が変わる:
//!
//! - `TABLE_KEY`: テーブルのパーティションキー / ソートキー
//! - `GSI_QUERY`: GSI のパーティションキー / ソートキー
//! - `SCAN`: 任意の属性（キー属性である必要はない）

pub mod validated;

use serde::{Deserialize, Serialize};

/// DynamoDB テーブルに対する削除戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DynamoDbDeletionStrategyType {
    /// テーブルの主キー（パーティションキー + ソートキー）で削除する
    TableKey,
    /// GSI を Query して該当アイテムをすべて削除する
    GsiQuery,
    /// テーブル全体を Scan して該当アイテムをすべて削除する
    Scan,
}

/// 削除キースキーマ
///
/// 削除キーの値がどの属性名に対応するかを表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamoDbDeletionKeySchema {
    /// プライマリ属性名（パーティションキー、GSI パーティションキー、または Scan 対象属性）
    pub primary_key_name:   String,
    /// セカンダリ属性名（ソートキー、GSI ソートキー、または Scan 対象の第 2 属性）
    #[serde(default)]
    pub secondary_key_name: Option<String>,
}

impl DynamoDbDeletionKeySchema {
    /// プライマリ属性のみのスキーマを作成する
    pub fn new(primary_key_name: impl Into<String>) -> Self {
        Self {
            primary_key_name:   primary_key_name.into(),
            secondary_key_name: None,
        }
    }

    /// プライマリ属性とセカンダリ属性を持つスキーマを作成する
    pub fn with_secondary(
        primary_key_name: impl Into<String>,
        secondary_key_name: impl Into<String>,
    ) -> Self {
        Self {
            primary_key_name:   primary_key_name.into(),
            secondary_key_name: Some(secondary_key_name.into()),
        }
    }
}

/// 削除キーの値
///
/// 削除リクエストごとの値。実行時にターゲットのスキーマの属性名に位置で対応付けられる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamoDbDeletionKeyValue {
    pub primary_key_value:   String,
    #[serde(default)]
    pub secondary_key_value: Option<String>,
}

impl DynamoDbDeletionKeyValue {
    pub fn new(primary_key_value: impl Into<String>) -> Self {
        Self {
            primary_key_value:   primary_key_value.into(),
            secondary_key_value: None,
        }
    }

    pub fn with_secondary(
        primary_key_value: impl Into<String>,
        secondary_key_value: impl Into<String>,
    ) -> Self {
        Self {
            primary_key_value:   primary_key_value.into(),
            secondary_key_value: Some(secondary_key_value.into()),
        }
    }
}

/// DynamoDB 削除ターゲット
///
/// オンボード時にテーブルごとに 1 つ作成され、以後変更されない。
/// 戦略ごとの必須項目は [`validated`] の変換関数で検証する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamoDbDeletionTarget {
    /// 削除戦略
    pub strategy:            DynamoDbDeletionStrategyType,
    /// テーブルが存在する AWS リージョン
    pub region:              String,
    /// テーブル名
    pub table_name:          String,
    /// テーブルのパーティションキー属性名
    pub partition_key_name:  String,
    /// テーブルのソートキー属性名
    #[serde(default)]
    pub sort_key_name:       Option<String>,
    /// 削除キースキーマ
    pub deletion_key_schema: DynamoDbDeletionKeySchema,
    /// Query 対象の GSI 名（`GSI_QUERY` の場合のみ必須）
    #[serde(default)]
    pub gsi_name:            Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DynamoDbDeletionStrategyType::TableKey, "TABLE_KEY")]
    #[case(DynamoDbDeletionStrategyType::GsiQuery, "GSI_QUERY")]
    #[case(DynamoDbDeletionStrategyType::Scan, "SCAN")]
    fn test_strategy_typeの表示名(
        #[case] strategy: DynamoDbDeletionStrategyType,
        #[case] expected: &str,
    ) {
        assert_eq!(strategy.to_string(), expected);
    }

    #[test]
    fn test_削除ターゲットをjsonから読み込める() {
        let json = r#"{
            "strategy": "GSI_QUERY",
            "region": "us-west-2",
            "tableName": "TestTable",
            "partitionKeyName": "CustomerId",
            "sortKeyName": "SortKey",
            "deletionKeySchema": { "primaryKeyName": "GsiPartitionKey" },
            "gsiName": "GsiIndex"
        }"#;

        let target: DynamoDbDeletionTarget = serde_json::from_str(json).unwrap();

        assert_eq!(
            target,
            DynamoDbDeletionTarget {
                strategy:            DynamoDbDeletionStrategyType::GsiQuery,
                region:              "us-west-2".to_string(),
                table_name:          "TestTable".to_string(),
                partition_key_name:  "CustomerId".to_string(),
                sort_key_name:       Some("SortKey".to_string()),
                deletion_key_schema: DynamoDbDeletionKeySchema::new("GsiPartitionKey"),
                gsi_name:            Some("GsiIndex".to_string()),
            }
        );
    }

    #[test]
    fn test_省略可能な項目がないjsonも読み込める() {
        let json = r#"{
            "strategy": "TABLE_KEY",
            "region": "us-west-2",
            "tableName": "TestTable",
            "partitionKeyName": "CustomerId",
            "deletionKeySchema": { "primaryKeyName": "CustomerId" }
        }"#;

        let target: DynamoDbDeletionTarget = serde_json::from_str(json).unwrap();

        assert!(target.sort_key_name.is_none());
        assert!(target.gsi_name.is_none());
        assert!(target.deletion_key_schema.secondary_key_name.is_none());
    }

    #[test]
    fn test_削除キーの値はセカンダリ値を省略できる() {
        let key: DynamoDbDeletionKeyValue =
            serde_json::from_str(r#"{ "primaryKeyValue": "customer1" }"#).unwrap();
        assert_eq!(key, DynamoDbDeletionKeyValue::new("customer1"));
    }
}
