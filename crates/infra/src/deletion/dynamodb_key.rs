//! DynamoDB のテーブルキー組み立てと、ページ単位の逐次削除。

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use ondemand_deletion_domain::dynamodb::DynamoDbDeletionKeyValue;

use crate::{
    InfraError,
    dynamodb::{DynamoDbClient, Item},
};

/// 削除キーの値からテーブルの主キーを組み立てる
///
/// ソートキーは、テーブルがソートキーを持ち、かつ削除キーにセカンダリ値がある場合のみ含める。
pub(super) fn table_key(
    partition_key_name: &str,
    sort_key_name: Option<&str>,
    key: &DynamoDbDeletionKeyValue,
) -> Item {
    let mut item_key = HashMap::from([(
        partition_key_name.to_string(),
        AttributeValue::S(key.primary_key_value.clone()),
    )]);

    if let (Some(sort_key_name), Some(secondary)) = (sort_key_name, &key.secondary_key_value) {
        item_key.insert(
            sort_key_name.to_string(),
            AttributeValue::S(secondary.clone()),
        );
    }

    item_key
}

/// Query / Scan の結果アイテムからテーブルの主キーを取り出す
///
/// キー属性がない、または文字列でない場合はデータ不整合エラーを返す。
/// `source` はエラーメッセージの主語（例: `"GSI query result"`）。
pub(super) fn table_key_from_item(
    item: &Item,
    partition_key_name: &str,
    sort_key_name: Option<&str>,
    source: &str,
) -> Result<Item, InfraError> {
    let mut item_key = HashMap::new();

    let partition = string_attribute(item, partition_key_name).ok_or_else(|| {
        InfraError::data_inconsistency(format!(
            "{source} partition key missing or not a string: {:?}",
            item.get(partition_key_name)
        ))
    })?;
    item_key.insert(
        partition_key_name.to_string(),
        AttributeValue::S(partition.to_string()),
    );

    if let Some(sort_key_name) = sort_key_name {
        let sort = string_attribute(item, sort_key_name).ok_or_else(|| {
            InfraError::data_inconsistency(format!(
                "{source} sort key missing or not a string: {:?}",
                item.get(sort_key_name)
            ))
        })?;
        item_key.insert(sort_key_name.to_string(), AttributeValue::S(sort.to_string()));
    }

    Ok(item_key)
}

fn string_attribute<'a>(item: &'a Item, name: &str) -> Option<&'a str> {
    item.get(name)?.as_s().ok().map(String::as_str)
}

/// 1 ページ分のアイテムを 1 件ずつ削除し、削除件数を返す
///
/// キーの取り出しに失敗した時点で中断する。それまでの削除は取り消さない。
pub(super) async fn delete_page_items(
    client: &dyn DynamoDbClient,
    table_name: &str,
    partition_key_name: &str,
    sort_key_name: Option<&str>,
    items: &[Item],
    source: &str,
) -> Result<u64, InfraError> {
    let mut deleted_count: u64 = 0;

    for item in items {
        let item_key = table_key_from_item(item, partition_key_name, sort_key_name, source)?;
        client.delete_item(table_name, item_key).await?;
        deleted_count += 1;
    }

    Ok(deleted_count)
}
