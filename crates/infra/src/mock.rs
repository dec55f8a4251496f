//! # テスト用モッククライアント
//!
//! 削除戦略のテストで使用するインメモリのモッククライアント。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! ondemand-deletion-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! Query / Scan / ListObjectsV2 の結果は事前に積んだページを順に返す。
//! 積んだページを使い切った後は空の最終ページを返す。

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    dynamodb::{DynamoDbClient, FilteredScan, IndexQuery, Item, ItemPage},
    error::InfraError,
    s3::{ObjectDeletionError, ObjectPage, S3Client},
};

// ===== MockDynamoDbClient =====

/// DynamoDB 呼び出しの記録
#[derive(Debug, Clone, PartialEq)]
pub enum DynamoDbCall {
    DeleteItem { table_name: String, key: Item },
    Query(IndexQuery),
    Scan(FilteredScan),
}

#[derive(Clone, Default)]
pub struct MockDynamoDbClient {
    items:        Arc<Mutex<Vec<Item>>>,
    query_pages:  Arc<Mutex<VecDeque<ItemPage>>>,
    scan_pages:   Arc<Mutex<VecDeque<ItemPage>>>,
    calls:        Arc<Mutex<Vec<DynamoDbCall>>>,
    delete_error: Arc<Mutex<Option<String>>>,
}

impl MockDynamoDbClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// テーブルにアイテムを追加する
    pub fn add_item(&self, item: Item) {
        self.items.lock().unwrap().push(item);
    }

    /// 次の Query で返すページを積む
    pub fn push_query_page(&self, page: ItemPage) {
        self.query_pages.lock().unwrap().push_back(page);
    }

    /// 次の Scan で返すページを積む
    pub fn push_scan_page(&self, page: ItemPage) {
        self.scan_pages.lock().unwrap().push_back(page);
    }

    /// 以後の DeleteItem を失敗させる
    pub fn fail_delete_item(&self, msg: impl Into<String>) {
        *self.delete_error.lock().unwrap() = Some(msg.into());
    }

    /// テーブルに残っているアイテム
    pub fn items(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }

    /// すべての呼び出し（呼び出し順）
    pub fn calls(&self) -> Vec<DynamoDbCall> {
        self.calls.lock().unwrap().clone()
    }

    /// DeleteItem に渡されたキー（呼び出し順）
    pub fn deleted_keys(&self) -> Vec<Item> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DynamoDbCall::DeleteItem { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    /// Query リクエスト（呼び出し順）
    pub fn queries(&self) -> Vec<IndexQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DynamoDbCall::Query(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Scan リクエスト（呼び出し順）
    pub fn scans(&self) -> Vec<FilteredScan> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DynamoDbCall::Scan(request) => Some(request),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DynamoDbClient for MockDynamoDbClient {
    async fn delete_item(&self, table_name: &str, key: Item) -> Result<(), InfraError> {
        self.calls.lock().unwrap().push(DynamoDbCall::DeleteItem {
            table_name: table_name.to_string(),
            key:        key.clone(),
        });

        if let Some(msg) = self.delete_error.lock().unwrap().clone() {
            return Err(InfraError::dynamo_db(msg));
        }

        // キー属性がすべて一致するアイテムを削除する（存在しなければ何もしない）
        self.items
            .lock()
            .unwrap()
            .retain(|item| !key.iter().all(|(name, value)| item.get(name) == Some(value)));
        Ok(())
    }

    async fn query(&self, request: IndexQuery) -> Result<ItemPage, InfraError> {
        self.calls.lock().unwrap().push(DynamoDbCall::Query(request));
        Ok(self
            .query_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn scan(&self, request: FilteredScan) -> Result<ItemPage, InfraError> {
        self.calls.lock().unwrap().push(DynamoDbCall::Scan(request));
        Ok(self.scan_pages.lock().unwrap().pop_front().unwrap_or_default())
    }
}

// ===== MockS3Client =====

/// ListObjectsV2 呼び出しの記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObjectsCall {
    pub bucket:             String,
    pub prefix:             Option<String>,
    pub continuation_token: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockS3Client {
    list_pages:     Arc<Mutex<VecDeque<ObjectPage>>>,
    objects:        Arc<Mutex<HashMap<String, Bytes>>>,
    delete_errors:  Arc<Mutex<VecDeque<Vec<ObjectDeletionError>>>>,
    list_calls:     Arc<Mutex<Vec<ListObjectsCall>>>,
    delete_batches: Arc<Mutex<Vec<Vec<String>>>>,
    fetched_keys:   Arc<Mutex<Vec<String>>>,
}

impl MockS3Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の ListObjectsV2 で返すページを積む
    pub fn push_list_page(&self, page: ObjectPage) {
        self.list_pages.lock().unwrap().push_back(page);
    }

    /// GetObject で返すオブジェクトを登録する
    pub fn put_object(&self, key: impl Into<String>, body: impl Into<Bytes>) {
        self.objects.lock().unwrap().insert(key.into(), body.into());
    }

    /// 次の DeleteObjects のレスポンスに含めるオブジェクト単位のエラーを積む
    pub fn push_delete_errors(&self, errors: Vec<ObjectDeletionError>) {
        self.delete_errors.lock().unwrap().push_back(errors);
    }

    /// ListObjectsV2 の呼び出し（呼び出し順）
    pub fn list_calls(&self) -> Vec<ListObjectsCall> {
        self.list_calls.lock().unwrap().clone()
    }

    /// DeleteObjects に渡されたキーのバッチ（呼び出し順）
    pub fn delete_batches(&self) -> Vec<Vec<String>> {
        self.delete_batches.lock().unwrap().clone()
    }

    /// GetObject で取得されたキー（呼び出し順）
    pub fn fetched_keys(&self) -> Vec<String> {
        self.fetched_keys.lock().unwrap().clone()
    }

    /// 登録済みオブジェクトが残っているか
    pub fn contains_object(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl S3Client for MockS3Client {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, InfraError> {
        self.list_calls.lock().unwrap().push(ListObjectsCall {
            bucket:             bucket.to_string(),
            prefix:             prefix.map(String::from),
            continuation_token: continuation_token.map(String::from),
        });
        Ok(self.list_pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn delete_objects(
        &self,
        _bucket: &str,
        keys: &[String],
    ) -> Result<Vec<ObjectDeletionError>, InfraError> {
        self.delete_batches.lock().unwrap().push(keys.to_vec());

        let errors = self
            .delete_errors
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();

        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            let failed = errors.iter().any(|e| e.key.as_deref() == Some(key.as_str()));
            if !failed {
                objects.remove(key);
            }
        }
        Ok(errors)
    }

    async fn get_object(&self, _bucket: &str, key: &str) -> Result<Bytes, InfraError> {
        self.fetched_keys.lock().unwrap().push(key.to_string());
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| InfraError::s3(format!("オブジェクト '{key}' が存在しません")))
    }
}
