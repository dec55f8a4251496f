//! # 検証済み DynamoDB 削除ターゲット
//!
//! [`DynamoDbDeletionTarget`] を戦略ごとに検証し、その戦略が必要とする項目の
//! 存在と整合性を型で保証する。
//!
//! 各型のフィールドは非公開で、`from_deletion_target` 経由でのみ構築できる。
//! 検証はリクエストごとに行い、ネットワーク呼び出しは発生しない。

use super::{
    DynamoDbDeletionKeySchema,
    DynamoDbDeletionKeyValue,
    DynamoDbDeletionStrategyType,
    DynamoDbDeletionTarget,
};
use crate::DomainError;

fn ensure_strategy(
    target: &DynamoDbDeletionTarget,
    expected: DynamoDbDeletionStrategyType,
) -> Result<(), DomainError> {
    DomainError::ensure(target.strategy == expected, || {
        format!("Deletion target strategy must be {expected}")
    })
}

/// スキーマがセカンダリ属性名を宣言している場合、削除キーにセカンダリ値がなければ
/// エラーを返す
fn uses_secondary_key(
    schema: &DynamoDbDeletionKeySchema,
    key: &DynamoDbDeletionKeyValue,
) -> Result<bool, DomainError> {
    if schema.secondary_key_name.is_none() {
        return Ok(false);
    }
    DomainError::ensure(key.secondary_key_value.is_some(), || {
        format!(
            "Mismatch between deletion key and deletion key schema {schema:?}, missing secondary key value"
        )
    })?;
    Ok(true)
}

// ============================================================================
// TABLE_KEY
// ============================================================================

/// `TABLE_KEY` 戦略用の検証済みターゲット
///
/// テーブルのソートキー名と削除キースキーマのセカンダリ属性名が
/// 両方あるか両方ないかのどちらかであることを保証する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDynamoDbTableKeyDeletionTarget {
    region:              String,
    table_name:          String,
    partition_key_name:  String,
    sort_key_name:       Option<String>,
    deletion_key_schema: DynamoDbDeletionKeySchema,
}

impl ValidatedDynamoDbTableKeyDeletionTarget {
    pub fn from_deletion_target(target: &DynamoDbDeletionTarget) -> Result<Self, DomainError> {
        ensure_strategy(target, DynamoDbDeletionStrategyType::TableKey)?;

        let has_secondary = target.deletion_key_schema.secondary_key_name.is_some();
        DomainError::ensure(target.sort_key_name.is_none() || has_secondary, || {
            "If sortKeyName is provided, deletionKeySchema.secondaryKeyName must also be provided"
                .to_string()
        })?;
        DomainError::ensure(target.sort_key_name.is_some() || !has_secondary, || {
            "If deletionKeySchema.secondaryKeyName is provided, sortKeyName must also be provided"
                .to_string()
        })?;

        Ok(Self {
            region:              target.region.clone(),
            table_name:          target.table_name.clone(),
            partition_key_name:  target.partition_key_name.clone(),
            sort_key_name:       target.sort_key_name.clone(),
            deletion_key_schema: target.deletion_key_schema.clone(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn partition_key_name(&self) -> &str {
        &self.partition_key_name
    }

    pub fn sort_key_name(&self) -> Option<&str> {
        self.sort_key_name.as_deref()
    }

    pub fn deletion_key_schema(&self) -> &DynamoDbDeletionKeySchema {
        &self.deletion_key_schema
    }
}

// ============================================================================
// GSI_QUERY
// ============================================================================

/// `GSI_QUERY` 戦略用の検証済みターゲット
///
/// GSI 名の存在を保証する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDynamoDbGsiDeletionTarget {
    region:              String,
    table_name:          String,
    partition_key_name:  String,
    sort_key_name:       Option<String>,
    gsi_name:            String,
    deletion_key_schema: DynamoDbDeletionKeySchema,
}

impl ValidatedDynamoDbGsiDeletionTarget {
    pub fn from_deletion_target(target: &DynamoDbDeletionTarget) -> Result<Self, DomainError> {
        ensure_strategy(target, DynamoDbDeletionStrategyType::GsiQuery)?;

        let Some(gsi_name) = target.gsi_name.clone() else {
            return Err(DomainError::validation("GSI name must not be null"));
        };

        Ok(Self {
            region: target.region.clone(),
            table_name: target.table_name.clone(),
            partition_key_name: target.partition_key_name.clone(),
            sort_key_name: target.sort_key_name.clone(),
            gsi_name,
            deletion_key_schema: target.deletion_key_schema.clone(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// テーブル（GSI ではない）のパーティションキー属性名
    pub fn partition_key_name(&self) -> &str {
        &self.partition_key_name
    }

    /// テーブル（GSI ではない）のソートキー属性名
    pub fn sort_key_name(&self) -> Option<&str> {
        self.sort_key_name.as_deref()
    }

    pub fn gsi_name(&self) -> &str {
        &self.gsi_name
    }

    /// 削除キーがスキーマのセカンダリ属性を満たすか検証する
    ///
    /// キー条件式にセカンダリ条件を含めるべきかどうかを返す。
    pub fn uses_secondary_key(&self, key: &DynamoDbDeletionKeyValue) -> Result<bool, DomainError> {
        uses_secondary_key(&self.deletion_key_schema, key)
    }

    pub fn deletion_key_schema(&self) -> &DynamoDbDeletionKeySchema {
        &self.deletion_key_schema
    }
}

// ============================================================================
// SCAN
// ============================================================================

/// `SCAN` 戦略用の検証済みターゲット
///
/// スキーマの属性名はキー属性である必要がないため、戦略の一致以外に追加の制約はない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDynamoDbScanDeletionTarget {
    region:              String,
    table_name:          String,
    partition_key_name:  String,
    sort_key_name:       Option<String>,
    deletion_key_schema: DynamoDbDeletionKeySchema,
}

impl ValidatedDynamoDbScanDeletionTarget {
    pub fn from_deletion_target(target: &DynamoDbDeletionTarget) -> Result<Self, DomainError> {
        ensure_strategy(target, DynamoDbDeletionStrategyType::Scan)?;

        Ok(Self {
            region:              target.region.clone(),
            table_name:          target.table_name.clone(),
            partition_key_name:  target.partition_key_name.clone(),
            sort_key_name:       target.sort_key_name.clone(),
            deletion_key_schema: target.deletion_key_schema.clone(),
        })
    }

    /// 削除キーがスキーマのセカンダリ属性を満たすか検証する
    ///
    /// フィルタ式にセカンダリ条件を含めるべきかどうかを返す。
    pub fn uses_secondary_key(&self, key: &DynamoDbDeletionKeyValue) -> Result<bool, DomainError> {
        uses_secondary_key(&self.deletion_key_schema, key)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn partition_key_name(&self) -> &str {
        &self.partition_key_name
    }

    pub fn sort_key_name(&self) -> Option<&str> {
        self.sort_key_name.as_deref()
    }

    pub fn deletion_key_schema(&self) -> &DynamoDbDeletionKeySchema {
        &self.deletion_key_schema
    }
}
