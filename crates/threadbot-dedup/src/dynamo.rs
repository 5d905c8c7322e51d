//! DynamoDB dedup store over the JSON 1.0 protocol.
//!
//! Table layout: partition key `event_id` (S); attributes `processed_at` (N),
//! `ttl` (N, configured as the table's TTL attribute) and `status` (S).
//! The claim is a `PutItem` guarded by `attribute_not_exists(event_id)`.

use async_trait::async_trait;
use serde_json::{json, Value};
use threadbot_aws::AwsClient;
use threadbot_core::{DedupRecord, EventStatus};
use tracing::{instrument, warn};

use crate::error::{DedupError, Result};
use crate::store::{DedupStore, InsertOutcome};

const CONTENT_TYPE: &str = "application/x-amz-json-1.0";
const TARGET_PREFIX: &str = "DynamoDB_20120810";
const CONDITIONAL_FAILED: &str = "ConditionalCheckFailedException";

pub struct DynamoDedupStore {
    client: AwsClient,
    table: String,
    endpoint: String,
}

impl DynamoDedupStore {
    /// `endpoint` overrides the regional endpoint (e.g. DynamoDB Local).
    pub fn new(client: AwsClient, table: impl Into<String>, endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .unwrap_or_else(|| format!("https://dynamodb.{}.amazonaws.com/", client.region()));
        Self {
            client,
            table: table.into(),
            endpoint,
        }
    }

    /// Invoke one DynamoDB operation, returning the parsed success body.
    ///
    /// A failed condition is reported as `Ok(None)`; every other error
    /// status is a `DedupError::Api`.
    async fn call(&self, operation: &str, body: &Value) -> Result<Option<Value>> {
        let target = format!("{TARGET_PREFIX}.{operation}");
        let headers = [("content-type", CONTENT_TYPE), ("x-amz-target", target.as_str())];
        let resp = self
            .client
            .post(&self.endpoint, &headers, serde_json::to_vec(body)?)
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(threadbot_aws::AwsError::from)?;
        if (200..300).contains(&status) {
            let parsed = if text.trim().is_empty() {
                json!({})
            } else {
                serde_json::from_str(&text)?
            };
            return Ok(Some(parsed));
        }

        let (kind, message) = parse_error(&text);
        if kind.ends_with(CONDITIONAL_FAILED) {
            return Ok(None);
        }
        warn!(operation, status, kind = %kind, "DynamoDB request failed");
        Err(DedupError::Api {
            status,
            kind,
            message,
        })
    }
}

#[async_trait]
impl DedupStore for DynamoDedupStore {
    fn name(&self) -> &str {
        "dynamodb"
    }

    #[instrument(skip(self, record), fields(event_id = %record.event_id, table = %self.table))]
    async fn insert_if_absent(&self, record: &DedupRecord) -> Result<InsertOutcome> {
        let body = put_item_request(&self.table, record);
        Ok(match self.call("PutItem", &body).await? {
            Some(_) => InsertOutcome::Inserted,
            None => InsertOutcome::AlreadyExists,
        })
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn update_status(&self, event_id: &str, status: EventStatus) -> Result<()> {
        let body = update_status_request(&self.table, event_id, status);
        match self.call("UpdateItem", &body).await? {
            Some(_) => Ok(()),
            None => Err(DedupError::NotFound {
                event_id: event_id.to_string(),
            }),
        }
    }

    #[instrument(skip(self), fields(table = %self.table))]
    async fn get(&self, event_id: &str) -> Result<Option<DedupRecord>> {
        let body = json!({
            "TableName": self.table,
            "Key": { "event_id": { "S": event_id } },
            "ConsistentRead": true,
        });
        match self.call("GetItem", &body).await? {
            Some(resp) => match resp.get("Item") {
                Some(item) => parse_item(item).map(Some),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }
}

// ── Request builders ─────────────────────────────────────────────────────────

fn put_item_request(table: &str, record: &DedupRecord) -> Value {
    json!({
        "TableName": table,
        "Item": {
            "event_id": { "S": record.event_id },
            "processed_at": { "N": record.processed_at.to_string() },
            "ttl": { "N": record.ttl.to_string() },
            "status": { "S": record.status.as_str() },
        },
        "ConditionExpression": "attribute_not_exists(event_id)",
    })
}

// `status` is a DynamoDB reserved word, hence the placeholder name.
fn update_status_request(table: &str, event_id: &str, status: EventStatus) -> Value {
    json!({
        "TableName": table,
        "Key": { "event_id": { "S": event_id } },
        "UpdateExpression": "SET #status = :status",
        "ConditionExpression": "attribute_exists(event_id)",
        "ExpressionAttributeNames": { "#status": "status" },
        "ExpressionAttributeValues": { ":status": { "S": status.as_str() } },
    })
}

// ── Response parsing ─────────────────────────────────────────────────────────

fn parse_item(item: &Value) -> Result<DedupRecord> {
    let s = |name: &str| -> Result<String> {
        item.get(name)
            .and_then(|v| v.get("S"))
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| DedupError::Malformed(format!("missing string attribute {name}")))
    };
    let n = |name: &str| -> Result<i64> {
        item.get(name)
            .and_then(|v| v.get("N"))
            .and_then(Value::as_str)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| DedupError::Malformed(format!("missing number attribute {name}")))
    };

    Ok(DedupRecord {
        event_id: s("event_id")?,
        processed_at: n("processed_at")?,
        ttl: n("ttl")?,
        status: s("status")?
            .parse()
            .map_err(|e: threadbot_core::ThreadbotError| DedupError::Malformed(e.to_string()))?,
    })
}

/// Extract `(__type, message)` from a DynamoDB error body.
fn parse_error(body: &str) -> (String, String) {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let kind = parsed
        .get("__type")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let message = parsed
        .get("message")
        .or_else(|| parsed.get("Message"))
        .and_then(Value::as_str)
        .unwrap_or(body)
        .to_string();
    (kind, message)
}
