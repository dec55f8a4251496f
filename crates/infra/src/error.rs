//! # インフラ層エラー定義
//!
//! 削除の実行中に発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **メッセージは外部契約**: バリデーション・データ不整合・部分失敗・未実装の
//!   各エラーは `Display` でメッセージをそのまま出力する
//! - **リトライしない**: どのエラーも発生した時点で呼び出し元へ伝播する。
//!   それまでに発行した削除は取り消さない
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Validation, DataInconsistency 等）

use std::fmt;

use derive_more::Display;
use ondemand_deletion_domain::DomainError;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
///
/// ## パターンマッチ
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::Validation(_) => { /* 設定の見直しが必要 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// バリデーションエラー
    ///
    /// 削除ターゲットの設定不備、または削除キーとの不整合。
    /// ストアへの呼び出しより前に発生する。
    #[error("{0}")]
    Validation(#[source] DomainError),

    /// データ不整合
    ///
    /// GSI / Scan の結果アイテムにテーブルのキー属性がない、または文字列でない場合。
    #[error("{0}")]
    DataInconsistency(String),

    /// 一括削除の部分失敗
    ///
    /// DeleteObjects のレスポンスにオブジェクト単位のエラーが含まれる場合。
    /// 同じバッチ内で削除に成功したオブジェクトは削除されたままになる。
    #[error("{0}")]
    PartialBatchFailure(String),

    /// 未実装の削除処理
    #[error("{0}")]
    NotImplemented(String),

    /// DynamoDB エラー
    ///
    /// AWS SDK のエラー型はジェネリクスが深く `#[from]` が困難なため、
    /// 手動で String にマップする。
    #[error("DynamoDB エラー: {0}")]
    DynamoDb(String),

    /// S3 エラー
    ///
    /// AWS SDK のエラー型はジェネリクスが深く `#[from]` が困難なため、
    /// 手動で String にマップする。
    #[error("S3 エラー: {0}")]
    S3(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// InfraError を分解して InfraErrorKind と SpanTrace を取り出す
    pub fn into_parts(self) -> (InfraErrorKind, SpanTrace) {
        (self.kind, self.span_trace)
    }

    // ===== Convenience constructors =====

    fn capture(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    /// データ不整合エラーを生成する
    pub fn data_inconsistency(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::DataInconsistency(msg.into()))
    }

    /// 一括削除の部分失敗エラーを生成する
    pub fn partial_batch_failure(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::PartialBatchFailure(msg.into()))
    }

    /// 未実装エラーを生成する
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::NotImplemented(msg.into()))
    }

    /// DynamoDB エラーを生成する
    pub fn dynamo_db(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::DynamoDb(msg.into()))
    }

    /// S3 エラーを生成する
    pub fn s3(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::S3(msg.into()))
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<DomainError> for InfraError {
    fn from(source: DomainError) -> Self {
        Self::capture(InfraErrorKind::Validation(source))
    }
}
