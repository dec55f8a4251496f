//! # 検証済み S3 削除ターゲット・削除キー
//!
//! [`S3DeletionTarget`] / [`S3DeletionKeyValue`] を戦略ごとに検証し、必要な項目の
//! 存在を型で保証する。すべての型は変換関数経由でのみ構築できる。

use super::{FileFormat, S3DeletionKeyValue, S3DeletionStrategyType, S3DeletionTarget};
use crate::{DomainError, pattern::DeletionKeyPattern};

fn ensure_strategy(
    target: &S3DeletionTarget,
    expected: S3DeletionStrategyType,
) -> Result<(), DomainError> {
    DomainError::ensure(target.strategy == expected, || {
        format!("Deletion target strategy must be {expected}")
    })
}

// ============================================================================
// OBJECT_KEY
// ============================================================================

/// `OBJECT_KEY` 戦略用の検証済みターゲット
///
/// キャプチャグループをちょうど 1 つ含むパターンの存在を保証する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedS3ObjectKeyDeletionTarget {
    region:               String,
    bucket_name:          String,
    object_key_prefix:    Option<String>,
    deletion_key_pattern: DeletionKeyPattern,
}

impl ValidatedS3ObjectKeyDeletionTarget {
    pub fn from_deletion_target(target: &S3DeletionTarget) -> Result<Self, DomainError> {
        ensure_strategy(target, S3DeletionStrategyType::ObjectKey)?;

        let Some(deletion_key_pattern) = target.deletion_key_pattern.clone() else {
            return Err(DomainError::validation("Deletion key pattern must not be null"));
        };
        deletion_key_pattern.ensure_single_capture_group()?;

        Ok(Self {
            region: target.region.clone(),
            bucket_name: target.bucket_name.clone(),
            object_key_prefix: target.object_key_prefix.clone(),
            deletion_key_pattern,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn object_key_prefix(&self) -> Option<&str> {
        self.object_key_prefix.as_deref()
    }

    pub fn deletion_key_pattern(&self) -> &DeletionKeyPattern {
        &self.deletion_key_pattern
    }
}

/// `OBJECT_KEY` 戦略用の検証済み削除キー
///
/// プレフィックスとキャプチャ値の少なくとも一方があることを保証する。
/// どちらもない削除キーはバケット全体に一致しうるため受け付けない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedS3ObjectKeyDeletionKeyValue {
    object_key_prefix: Option<String>,
    capture_value:     Option<String>,
}

impl ValidatedS3ObjectKeyDeletionKeyValue {
    pub fn from_deletion_key_value(key: &S3DeletionKeyValue) -> Result<Self, DomainError> {
        DomainError::ensure(
            key.deletion_key_pattern_capture_value.is_some() || key.object_key_prefix.is_some(),
            || {
                "S3 deletion key must provide deletionKeyPatternCaptureValue or objectKeyPrefix"
                    .to_string()
            },
        )?;

        Ok(Self {
            object_key_prefix: key.object_key_prefix.clone(),
            capture_value:     key.deletion_key_pattern_capture_value.clone(),
        })
    }

    pub fn object_key_prefix(&self) -> Option<&str> {
        self.object_key_prefix.as_deref()
    }

    pub fn deletion_key_pattern_capture_value(&self) -> Option<&str> {
        self.capture_value.as_deref()
    }
}

// ============================================================================
// ROW_LEVEL
// ============================================================================

/// `ROW_LEVEL` 戦略用の検証済みターゲット
///
/// 行属性名とファイル形式の存在を保証する。パターンは任意だが、
/// 指定されている場合はキャプチャグループがちょうど 1 つでなければならない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedS3RowLevelDeletionTarget {
    region:                      String,
    bucket_name:                 String,
    object_key_prefix:           Option<String>,
    deletion_key_pattern:        Option<DeletionKeyPattern>,
    deletion_row_attribute_name: String,
    object_file_format:          FileFormat,
}

impl ValidatedS3RowLevelDeletionTarget {
    pub fn from_deletion_target(target: &S3DeletionTarget) -> Result<Self, DomainError> {
        ensure_strategy(target, S3DeletionStrategyType::RowLevel)?;

        let Some(deletion_row_attribute_name) = target.deletion_row_attribute_name.clone() else {
            return Err(DomainError::validation(
                "Deletion row attribute name must not be null",
            ));
        };
        let Some(object_file_format) = target.object_file_format else {
            return Err(DomainError::validation("Object file format must not be null"));
        };
        if let Some(pattern) = &target.deletion_key_pattern {
            pattern.ensure_single_capture_group()?;
        }

        Ok(Self {
            region: target.region.clone(),
            bucket_name: target.bucket_name.clone(),
            object_key_prefix: target.object_key_prefix.clone(),
            deletion_key_pattern: target.deletion_key_pattern.clone(),
            deletion_row_attribute_name,
            object_file_format,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn object_key_prefix(&self) -> Option<&str> {
        self.object_key_prefix.as_deref()
    }

    pub fn deletion_key_pattern(&self) -> Option<&DeletionKeyPattern> {
        self.deletion_key_pattern.as_ref()
    }

    pub fn deletion_row_attribute_name(&self) -> &str {
        &self.deletion_row_attribute_name
    }

    pub fn object_file_format(&self) -> FileFormat {
        self.object_file_format
    }
}

/// `ROW_LEVEL` 戦略用の検証済み削除キー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedS3RowLevelDeletionKeyValue {
    object_key_prefix:            Option<String>,
    capture_value:                Option<String>,
    deletion_row_attribute_value: String,
}

impl ValidatedS3RowLevelDeletionKeyValue {
    pub fn from_deletion_key_value(key: &S3DeletionKeyValue) -> Result<Self, DomainError> {
        let Some(deletion_row_attribute_value) = key.deletion_row_attribute_value.clone() else {
            return Err(DomainError::validation(
                "Deletion row attribute value must be non-null",
            ));
        };

        Ok(Self {
            object_key_prefix: key.object_key_prefix.clone(),
            capture_value: key.deletion_key_pattern_capture_value.clone(),
            deletion_row_attribute_value,
        })
    }

    pub fn object_key_prefix(&self) -> Option<&str> {
        self.object_key_prefix.as_deref()
    }

    pub fn deletion_key_pattern_capture_value(&self) -> Option<&str> {
        self.capture_value.as_deref()
    }

    pub fn deletion_row_attribute_value(&self) -> &str {
        &self.deletion_row_attribute_value
    }
}
