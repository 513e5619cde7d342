// core/src/notify/phone.rs

/// How local numbers are expanded to international form.
///
/// With the default rule (`966`, 10-digit local numbers) `0551234567`
/// becomes `966551234567`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneRule {
  /// Country calling code, digits only.
  pub country_code: String,
  /// Length of a local number including its leading `0`.
  pub local_length: usize,
}

impl Default for PhoneRule {
  fn default() -> Self {
    Self {
      country_code: "966".to_string(),
      local_length: 10,
    }
  }
}

const MIN_DIGITS: usize = 8;
const MAX_DIGITS: usize = 15;

impl PhoneRule {
  pub fn new(country_code: impl Into<String>, local_length: usize) -> Self {
    Self {
      country_code: country_code.into().chars().filter(char::is_ascii_digit).collect(),
      local_length,
    }
  }

  /// Normalises `raw` to `<country-code><subscriber>` digits, without `+`
  /// and without a trunk `0`. Returns `None` when no plausible number remains.
  pub fn normalize(&self, raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if let Some(rest) = digits.strip_prefix("00") {
      digits = rest.to_string();
    } else if digits.len() == self.local_length && digits.starts_with('0') {
      digits = format!("{}{}", self.country_code, &digits[1..]);
    }

    // "9660551234567": country code followed by a trunk zero.
    let trunk_prefix = format!("{}0", self.country_code);
    if digits.starts_with(&trunk_prefix) && digits.len() == self.country_code.len() + self.local_length {
      digits = format!("{}{}", self.country_code, &digits[trunk_prefix.len()..]);
    }

    (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()).then_some(digits)
  }
}

/// `whatsapp:+<digits>` address understood by the provider.
pub fn whatsapp_address(digits: &str) -> String {
  let trimmed = digits.trim_start_matches("whatsapp:").trim_start_matches('+');
  format!("whatsapp:+{trimmed}")
}

/// Keeps the first six characters for logs.
pub fn mask(phone: &str) -> String {
  let visible: String = phone.chars().take(6).collect();
  format!("{visible}****")
}
