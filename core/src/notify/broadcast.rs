// core/src/notify/broadcast.rs

use futures::future::join_all;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument};

use super::whatsapp::{MessageContent, WhatsAppNotifier};
use super::Channel;

/// Successful recipients echoed back to the operator.
pub const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastSettings {
  pub batch_size: usize,
  /// Pause between consecutive batches, to stay under provider rate limits.
  pub pause: Duration,
}

impl Default for BroadcastSettings {
  fn default() -> Self {
    Self {
      batch_size: 10,
      pause: Duration::from_millis(1000),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastSummary {
  pub total: usize,
  pub sent: usize,
  pub failed: usize,
  pub sample: Vec<String>,
}

/// Sends `content` to every recipient, one batch at a time. Sends within a
/// batch run concurrently.
#[instrument(name = "broadcast::run", skip_all, fields(total = recipients.len(), batch_size = settings.batch_size))]
pub async fn run(
  notifier: &WhatsAppNotifier,
  recipients: &[String],
  content: &MessageContent,
  settings: &BroadcastSettings,
) -> BroadcastSummary {
  let mut summary = BroadcastSummary {
    total: recipients.len(),
    ..BroadcastSummary::default()
  };
  let batches: Vec<&[String]> = recipients.chunks(settings.batch_size.max(1)).collect();

  for (idx, batch) in batches.iter().enumerate() {
    if idx > 0 && !settings.pause.is_zero() {
      tokio::time::sleep(settings.pause).await;
    }
    let results = join_all(
      batch
        .iter()
        .map(|recipient| notifier.send(Channel::WhatsappBroadcast, recipient, content.clone())),
    )
    .await;

    for (recipient, result) in batch.iter().zip(results) {
      if result.ok {
        summary.sent += 1;
        if summary.sample.len() < SAMPLE_SIZE {
          summary.sample.push(recipient.clone());
        }
      } else {
        summary.failed += 1;
      }
    }
  }

  info!(sent = summary.sent, failed = summary.failed, "Broadcast finished.");
  summary
}
