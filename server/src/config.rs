// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use partsdesk::notify::{BroadcastSettings, NotifyConfig, SmtpConfig, TemplateIds, TwilioConfig};
use partsdesk::{DeskConfig, PhoneRule, TransitionPolicy};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Absent means the in-memory store.
  pub database_url: Option<String>,
  pub upload_dir: PathBuf,
  /// Absent disables the admin guard.
  pub admin_jwt_secret: Option<String>,
  pub desk: DeskConfig,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source. Blank values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| lookup(var_name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let parse_env = |var_name: &str, default: u64| -> Result<u64> {
      match get_env(var_name) {
        None => Ok(default),
        Some(raw) => raw
          .parse::<u64>()
          .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
      }
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = u16::try_from(parse_env("SERVER_PORT", 10000)?)
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL");
    let public_base_url =
      get_env("PUBLIC_BASE_URL").unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));
    let upload_dir = PathBuf::from(get_env("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()));
    let admin_jwt_secret = get_env("ADMIN_JWT_SECRET");

    let transition_policy = match get_env("STATUS_TRANSITIONS") {
      None => TransitionPolicy::default(),
      Some(raw) => TransitionPolicy::parse(&raw)
        .ok_or_else(|| AppError::Config(format!("Invalid STATUS_TRANSITIONS '{}': expected permissive or strict", raw)))?,
    };
    let phone_rule = PhoneRule::new(
      get_env("WHATSAPP_COUNTRY_CODE").unwrap_or_else(|| "966".to_string()),
      PhoneRule::default().local_length,
    );

    // Admin numbers: list first, then the two single slots. Two spellings of
    // the same number count as one.
    let mut admin_numbers: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let listed = get_env("ADMIN_WHATSAPP_NUMBERS").unwrap_or_default();
    let singles = [get_env("ADMIN_WHATSAPP_1"), get_env("ADMIN_WHATSAPP_2")];
    for number in listed
      .split(',')
      .map(|n| n.trim().to_string())
      .chain(singles.into_iter().flatten())
    {
      if number.is_empty() {
        continue;
      }
      let key = phone_rule.normalize(&number).unwrap_or_else(|| number.clone());
      if !seen.contains(&key) {
        seen.push(key);
        admin_numbers.push(number);
      }
    }

    let email_user = get_env("EMAIL_USER");
    let mut admin_emails: Vec<String> = [get_env("ADMIN_EMAIL_1"), get_env("ADMIN_EMAIL_2")]
      .into_iter()
      .flatten()
      .collect();
    admin_emails.dedup();
    if admin_emails.is_empty() {
      admin_emails.extend(email_user.clone());
    }

    let notify = NotifyConfig {
      admin_numbers,
      delivery_number: get_env("DELIVERY_WHATSAPP"),
      admin_emails,
      templates: TemplateIds {
        order_created: get_env("WA_TEMPLATE_ORDER_CREATED"),
        status_updated: get_env("WA_TEMPLATE_STATUS_UPDATED"),
        broadcast: get_env("WA_TEMPLATE_BROADCAST"),
      },
      public_base_url,
      broadcast: BroadcastSettings {
        batch_size: parse_env("BROADCAST_BATCH_SIZE", 10)? as usize,
        pause: Duration::from_millis(parse_env("BROADCAST_BATCH_PAUSE_MS", 1000)?),
      },
      ..NotifyConfig::default()
    };

    let twilio = match (
      get_env("TWILIO_ACCOUNT_SID"),
      get_env("TWILIO_AUTH_TOKEN"),
      get_env("TWILIO_FROM_WHATSAPP"),
    ) {
      (Some(sid), Some(token), Some(from)) => {
        let mut twilio = TwilioConfig::new(sid, token, from);
        if let Some(base) = get_env("TWILIO_API_BASE") {
          twilio.api_base = base;
        }
        Some(twilio)
      }
      _ => None,
    };

    let smtp = match (email_user, get_env("EMAIL_PASS")) {
      (Some(username), Some(password)) => Some(SmtpConfig {
        host: get_env("EMAIL_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
        port: u16::try_from(parse_env("EMAIL_PORT", 587)?)
          .map_err(|e| AppError::Config(format!("Invalid EMAIL_PORT: {}", e)))?,
        username,
        password,
        from_name: get_env("EMAIL_FROM_NAME").unwrap_or_else(|| "Parts Desk".to_string()),
      }),
      _ => None,
    };

    let desk = DeskConfig {
      backup_file: PathBuf::from(get_env("BACKUP_FILE").unwrap_or_else(|| partsdesk::config::DEFAULT_BACKUP_FILE.to_string())),
      transition_policy,
      phone_rule,
      notify,
      twilio,
      smtp,
    };

    tracing::info!(
      store = if database_url.is_some() { "postgres" } else { "memory" },
      whatsapp = desk.twilio.is_some(),
      email = desk.smtp.is_some(),
      admin_numbers = desk.notify.admin_numbers.len(),
      admin_guard = admin_jwt_secret.is_some(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      upload_dir,
      admin_jwt_secret,
      desk,
    })
  }
}
