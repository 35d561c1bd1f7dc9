//! Remote message queue seam.
//!
//! The poller drives a [`MessageQueue`] so the state machine can be tested
//! against fakes; the real implementation wraps the AWS SQS client.

pub mod sqs;

pub use sqs::SqsQueue;

/// Fallback region when neither the environment nor the queue URL name one.
pub const DEFAULT_REGION: &str = "eu-west-2";

/// One received message, reduced to what the display path needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
    pub receipt_handle: Option<String>,
}

/// Queue failures split by retry policy: transient errors back off and
/// resume polling, fatal ones hand control back to the orchestrator.
#[derive(Debug)]
pub enum QueueError {
    Transient(String),
    Fatal(String),
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Transient(msg) => write!(f, "transient queue error: {msg}"),
            QueueError::Fatal(msg) => write!(f, "queue error: {msg}"),
        }
    }
}

pub trait MessageQueue {
    /// Request at most one message, without long-polling.
    fn receive_one(&mut self) -> std::result::Result<Vec<QueueMessage>, QueueError>;

    /// Delete a message by receipt handle.
    fn delete(&mut self, receipt_handle: &str) -> std::result::Result<(), QueueError>;
}

/// Region for the queue client: explicit environment override, else parsed
/// from the queue URL host, else the hardcoded default.
pub fn resolve_region(queue_url: &str) -> String {
    let env_region = std::env::var("AWS_REGION")
        .ok()
        .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok())
        .filter(|region| !region.is_empty());
    resolve_region_from(env_region, queue_url)
}

fn resolve_region_from(env_region: Option<String>, queue_url: &str) -> String {
    env_region
        .or_else(|| region_from_queue_url(queue_url))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

/// Parse `https://sqs.<region>.amazonaws.com/...` host naming.
fn region_from_queue_url(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let host = rest.split('/').next()?;
    let after_sqs = host.strip_prefix("sqs.")?;
    let (region, tail) = after_sqs.split_once('.')?;
    if !tail.starts_with("amazonaws.com") || region.is_empty() {
        return None;
    }
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return None;
    }
    Some(region.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_wins() {
        let region = resolve_region_from(
            Some("us-west-1".into()),
            "https://sqs.eu-west-2.amazonaws.com/1/q",
        );
        assert_eq!(region, "us-west-1");
    }

    #[test]
    fn region_parsed_from_queue_url() {
        let region = resolve_region_from(None, "https://sqs.eu-west-2.amazonaws.com/567/xmas");
        assert_eq!(region, "eu-west-2");
    }

    #[test]
    fn plain_http_url_also_parses() {
        let region = resolve_region_from(None, "http://sqs.us-east-1.amazonaws.com/1/q");
        assert_eq!(region, "us-east-1");
    }

    #[test]
    fn unrecognized_url_falls_back_to_default() {
        for url in [
            "",
            "https://example.com/q",
            "https://sqs..amazonaws.com/1/q",
            "https://sqs.EU-WEST-2.amazonaws.com/1/q",
            "not a url",
        ] {
            assert_eq!(resolve_region_from(None, url), DEFAULT_REGION, "url {url:?}");
        }
    }
}
