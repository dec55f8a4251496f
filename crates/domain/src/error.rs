//! # ドメイン層エラー定義
//!
//! 削除ターゲット・削除キーの検証で発生するエラー型。
//!
//! ## 設計方針
//!
//! - **メッセージは外部契約**: 呼び出し元やテストがメッセージ文字列を直接比較するため、
//!   `Display` はプレフィックスを付けずにメッセージそのものを出力する
//! - **ネットワーク前に失敗**: このエラーはすべてストア呼び出しの前に発生する
//!
//! ## 使用例
//!
//! ```rust
//! use ondemand_deletion_domain::DomainError;
//!
//! let error = DomainError::Validation("GSI name must not be null".to_string());
//! assert_eq!(error.to_string(), "GSI name must not be null");
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 削除ターゲットの設定不備、または削除キーとターゲットの不整合。
    /// リトライしても成功しない。
    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    /// メッセージからバリデーションエラーを生成する
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `condition` が偽の場合にバリデーションエラーを返す
    pub(crate) fn ensure(condition: bool, msg: impl FnOnce() -> String) -> Result<(), Self> {
        if condition {
            Ok(())
        } else {
            Err(Self::Validation(msg()))
        }
    }
}
