//! # 削除キーパターン
//!
//! S3 オブジェクトキーのうち削除に関係する部分（例: 顧客 ID のパスセグメント）を
//! 特定するための正規表現。
//!
//! ## マッチング
//!
//! マッチングは常に完全一致（オブジェクトキー全体がパターンに一致する）で行う。
//! 部分一致検索は行わない。
//!
//! ## キャプチャグループの置換
//!
//! [`effective_pattern`] はパターン中の唯一のキャプチャグループを削除キーの値で
//! 置き換え、特定の顧客だけに一致するパターンを作る。
//!
//! ```rust
//! use ondemand_deletion_domain::pattern::{DeletionKeyPattern, effective_pattern};
//!
//! let base = DeletionKeyPattern::new(r"data/customers/(\w+)/.*").unwrap();
//! let pattern = effective_pattern(&base, Some("fred")).unwrap();
//!
//! assert_eq!(pattern.as_str(), "data/customers/fred/.*");
//! assert!(pattern.is_full_match("data/customers/fred/file.json"));
//! assert!(!pattern.is_full_match("data/customers/bob/file.json"));
//! ```
//!
//! グループの位置はパターンの構文木から求めるため、名前付きグループ `(?P<id>...)` や
//! エスケープされた括弧 `\(`、文字クラス内の `[)]` も正しく扱う。
//!
//! 置換値の正規表現メタ文字はエスケープしない。置換値に `.` や `*` が含まれると
//! 意図より広い（または狭い）キーに一致しうる点に注意。

use regex::Regex;
use regex_syntax::ast::{self, Ast, GroupKind, Span};
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// 削除キーパターン
///
/// パターン文字列と、完全一致用にアンカーを付けてコンパイルした正規表現を保持する。
/// 等価性はパターン文字列で判定する。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeletionKeyPattern {
    source:     String,
    full_match: Regex,
}

impl DeletionKeyPattern {
    /// パターン文字列をコンパイルする
    ///
    /// 正規表現として不正な場合はバリデーションエラーを返す。
    /// キャプチャグループ数の検証は戦略ごとのバリデーションで行う。
    pub fn new(source: impl Into<String>) -> Result<Self, DomainError> {
        let source = source.into();
        let invalid = |e: regex::Error| {
            DomainError::validation(format!(
                "Deletion key pattern is not a valid regular expression: {e}"
            ))
        };

        Regex::new(&source).map_err(invalid)?;
        let full_match = Regex::new(&format!(r"\A(?:{source})\z")).map_err(invalid)?;

        Ok(Self { source, full_match })
    }

    /// パターン文字列を取得する
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// キャプチャグループの数（グループ 0 を除く）
    pub fn capture_group_count(&self) -> usize {
        self.full_match.captures_len() - 1
    }

    /// オブジェクトキー全体がパターンに一致するか
    pub fn is_full_match(&self, object_key: &str) -> bool {
        self.full_match.is_match(object_key)
    }

    /// キャプチャグループがちょうど 1 つであることを検証する
    pub fn ensure_single_capture_group(&self) -> Result<(), DomainError> {
        DomainError::ensure(self.capture_group_count() == 1, || {
            "Deletion key pattern must have exactly one capture group".to_string()
        })
    }
}

impl PartialEq for DeletionKeyPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for DeletionKeyPattern {}

impl std::fmt::Display for DeletionKeyPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for DeletionKeyPattern {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeletionKeyPattern> for String {
    fn from(pattern: DeletionKeyPattern) -> Self {
        pattern.source
    }
}

/// 削除リクエストに適用するパターンを組み立てる
///
/// `capture_value` が `None` の場合は `base` をそのまま返す（キャプチャグループは
/// その位置の任意の値に一致する）。`Some` の場合は唯一のキャプチャグループを
/// `capture_value` の文字列でそのまま置き換えたパターンを返す。
///
/// キャプチャグループがちょうど 1 つでない場合と、置換値はエスケープしないため
/// 置換後のパターンが正規表現として不正になった場合はバリデーションエラーを返す。
pub fn effective_pattern(
    base: &DeletionKeyPattern,
    capture_value: Option<&str>,
) -> Result<DeletionKeyPattern, DomainError> {
    let Some(capture_value) = capture_value else {
        return Ok(base.clone());
    };

    let source = base.as_str();
    let span = sole_capture_group_span(source)?;
    DeletionKeyPattern::new(format!(
        "{}{capture_value}{}",
        &source[..span.start.offset],
        &source[span.end.offset..]
    ))
}

/// 唯一のキャプチャグループ（括弧を含む）の位置を求める
fn sole_capture_group_span(source: &str) -> Result<Span, DomainError> {
    let ast = ast::parse::Parser::new().parse(source).map_err(|e| {
        DomainError::validation(format!(
            "Deletion key pattern is not a valid regular expression: {e}"
        ))
    })?;

    let mut spans = Vec::new();
    collect_capture_group_spans(&ast, &mut spans);

    match spans.as_slice() {
        [span] => Ok(*span),
        _ => Err(DomainError::validation(
            "Deletion key pattern must have exactly one capture group",
        )),
    }
}

fn collect_capture_group_spans(ast: &Ast, spans: &mut Vec<Span>) {
    match ast {
        Ast::Group(group) => {
            if matches!(
                group.kind,
                GroupKind::CaptureIndex(_) | GroupKind::CaptureName { .. }
            ) {
                spans.push(group.span);
            }
            collect_capture_group_spans(&group.ast, spans);
        }
        Ast::Repetition(repetition) => collect_capture_group_spans(&repetition.ast, spans),
        Ast::Alternation(alternation) => alternation
            .asts
            .iter()
            .for_each(|ast| collect_capture_group_spans(ast, spans)),
        Ast::Concat(concat) => concat
            .asts
            .iter()
            .for_each(|ast| collect_capture_group_spans(ast, spans)),
        _ => {}
    }
}
