// tests/config_env_tests.rs
use partsdesk::TransitionPolicy;
use partsdesk_server::config::AppConfig;
use serial_test::serial;
use std::env;

const VARS: [&str; 4] = ["SERVER_PORT", "STATUS_TRANSITIONS", "ADMIN_WHATSAPP_1", "DATABASE_URL"];

fn clear() {
  for var in VARS {
    env::remove_var(var);
  }
}

#[test]
#[serial]
fn reads_process_environment() {
  clear();
  env::set_var("SERVER_PORT", "8088");
  env::set_var("STATUS_TRANSITIONS", "strict");
  env::set_var("ADMIN_WHATSAPP_1", "0500000001");
  let config = AppConfig::from_env().unwrap();
  clear();

  assert_eq!(config.server_port, 8088);
  assert_eq!(config.desk.transition_policy, TransitionPolicy::Strict);
  assert_eq!(config.desk.notify.admin_numbers, vec!["0500000001"]);
  assert!(config.database_url.is_none());
}

#[test]
#[serial]
fn invalid_port_in_environment_fails_startup() {
  clear();
  env::set_var("SERVER_PORT", "99999");
  let result = AppConfig::from_env();
  clear();
  assert!(result.is_err());
}
