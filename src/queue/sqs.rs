//! AWS SQS client behind a blocking facade.
//!
//! The SDK is async; the rest of the program is a single cooperative
//! thread. A dedicated current-thread runtime lives inside the queue handle
//! so the poll loop stays synchronous.

use aws_sdk_sqs::error::SdkError;

use crate::queue::{resolve_region, MessageQueue, QueueError, QueueMessage};
use crate::{Error, Result};

pub struct SqsQueue {
    runtime: tokio::runtime::Runtime,
    client: aws_sdk_sqs::Client,
    queue_url: String,
    visibility_timeout_secs: u64,
}

impl SqsQueue {
    /// Build the client for `queue_url`. The visibility timeout mirrors the
    /// message hold duration so a displayed-but-undeleted message does not
    /// reappear to another consumer mid-hold.
    pub fn connect(queue_url: &str, visibility_timeout_secs: u64) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Io)?;

        let region = resolve_region(queue_url);
        let sdk_config = runtime.block_on(
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(region))
                .load(),
        );
        let client = aws_sdk_sqs::Client::new(&sdk_config);

        Ok(Self {
            runtime,
            client,
            queue_url: queue_url.to_string(),
            visibility_timeout_secs,
        })
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

impl MessageQueue for SqsQueue {
    fn receive_one(&mut self) -> std::result::Result<Vec<QueueMessage>, QueueError> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .receive_message()
                    .queue_url(&self.queue_url)
                    .max_number_of_messages(1)
                    .wait_time_seconds(0)
                    .visibility_timeout(self.visibility_timeout_secs as i32)
                    .message_attribute_names("All")
                    .send(),
            )
            .map_err(classify_sdk_error)?;

        Ok(output
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|msg| QueueMessage {
                body: msg.body.unwrap_or_default(),
                receipt_handle: msg.receipt_handle,
            })
            .collect())
    }

    fn delete(&mut self, receipt_handle: &str) -> std::result::Result<(), QueueError> {
        self.runtime
            .block_on(
                self.client
                    .delete_message()
                    .queue_url(&self.queue_url)
                    .receipt_handle(receipt_handle)
                    .send(),
            )
            .map_err(classify_sdk_error)?;
        Ok(())
    }
}

/// Service responses, dispatch failures, and timeouts are worth a bounded
/// retry; anything else (request construction, unknown variants) is not.
fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> QueueError
where
    SdkError<E, R>: std::error::Error,
{
    let detail = err.to_string();
    match err {
        SdkError::ServiceError(_)
        | SdkError::DispatchFailure(_)
        | SdkError::TimeoutError(_)
        | SdkError::ResponseError(_) => QueueError::Transient(detail),
        _ => QueueError::Fatal(detail),
    }
}
