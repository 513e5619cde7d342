// core/src/config.rs

use std::path::PathBuf;

use crate::lifecycle::TransitionPolicy;
use crate::notify::{NotifyConfig, PhoneRule, SmtpConfig, TwilioConfig};

pub const DEFAULT_BACKUP_FILE: &str = "backup_orders.jsonl";

/// Everything the desk needs, resolved by the host process before
/// construction. Nothing below reads the environment.
#[derive(Debug, Clone)]
pub struct DeskConfig {
  pub backup_file: PathBuf,
  pub transition_policy: TransitionPolicy,
  pub phone_rule: PhoneRule,
  pub notify: NotifyConfig,
  /// `None` disables every WhatsApp channel.
  pub twilio: Option<TwilioConfig>,
  /// `None` disables admin email.
  pub smtp: Option<SmtpConfig>,
}

impl Default for DeskConfig {
  fn default() -> Self {
    Self {
      backup_file: PathBuf::from(DEFAULT_BACKUP_FILE),
      transition_policy: TransitionPolicy::default(),
      phone_rule: PhoneRule::default(),
      notify: NotifyConfig::default(),
      twilio: None,
      smtp: None,
    }
  }
}
