// core/src/notify/render.rs

//! Message bodies for order events. Plain string building; the email bodies
//! return `(html, text)` pairs.

use std::collections::BTreeMap;

use super::email::EmailMessage;
use crate::model::{Order, OrderKind, OrderStatus};

#[derive(Debug, Clone)]
pub struct Renderer {
  public_base_url: String,
  currency: String,
}

impl Renderer {
  pub fn new(public_base_url: impl Into<String>, currency: impl Into<String>) -> Self {
    Self {
      public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
      currency: currency.into(),
    }
  }

  pub fn admin_url(&self) -> String {
    format!("{}/admin.html", self.public_base_url)
  }

  /// Turns a stored `/uploads/..` reference into an absolute link.
  pub fn link(&self, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
      path.to_string()
    } else {
      format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }
  }

  pub fn money(&self, amount: f64) -> String {
    format!("{} {}", format_amount(amount), self.currency)
  }

  /// Staff alert for a freshly created order.
  pub fn staff_order_created(&self, order: &Order) -> String {
    let mut lines = vec![match order.order_type {
      OrderKind::Parts => format!("New parts request {}", order.order_number),
      OrderKind::SellCar => format!("New car sale request {}", order.order_number),
    }];
    lines.push(format!("Customer: {} ({})", order.customer_name, order.customer_phone));
    let car = order.car_info.display_name();
    if !car.is_empty() {
      lines.push(format!("Vehicle: {car}"));
    }
    match order.order_type {
      OrderKind::Parts => {
        if let Some(item) = order.primary_item() {
          lines.push(format!("Part: {}", item.part_name));
        }
        lines.push(format!(
          "Delivery: {} ({})",
          order.delivery_option.as_str(),
          self.money(order.delivery_fee)
        ));
      }
      OrderKind::SellCar => {
        if order.total_amount > 0.0 {
          lines.push(format!("Expected price: {}", self.money(order.total_amount)));
        }
        if let Some(mileage) = order.car_info.mileage {
          lines.push(format!("Mileage: {} km", format_amount(mileage)));
        }
      }
    }
    if let Some(city) = order.city() {
      lines.push(format!("City: {city}"));
    }
    if !order.images.is_empty() {
      lines.push(format!("Images: {}", order.images.len()));
    }
    lines.push(self.admin_url());
    lines.join("\n")
  }

  pub fn customer_order_created(&self, order: &Order) -> String {
    format!(
      "Hello {}, we received your request {}. We will contact you with a quote shortly.",
      order.customer_name, order.order_number
    )
  }

  pub fn status_changed(&self, order: &Order, status: OrderStatus) -> String {
    let mut text = format!("Order {}: status is now {}", order.order_number, status_label(status));
    if order.total_amount > 0.0 {
      text.push_str(&format!("\nTotal: {}", self.money(order.total_amount)));
    }
    if let Some(tracking) = &order.tracking_number {
      text.push_str(&format!("\nTracking: {tracking}"));
    }
    text
  }

  pub fn email_order_created(&self, order: &Order, to: Vec<String>) -> EmailMessage {
    let subject = format!("New order #{} - {}", order.order_number, order.customer_name);
    let rows = self.order_rows(order);
    let html = format!(
      r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
<h2>New order {number}</h2>
<table style="width: 100%; border-collapse: collapse;">
{rows}
</table>
<p><a href="{admin}">Open in dashboard</a></p>
</div>"#,
      number = escape_html(&order.order_number),
      rows = rows
        .iter()
        .map(|(k, v)| format!(
          r#"<tr><td style="padding: 8px; border: 1px solid #ddd;"><strong>{}</strong></td><td style="padding: 8px; border: 1px solid #ddd;">{}</td></tr>"#,
          escape_html(k),
          escape_html(v)
        ))
        .collect::<Vec<_>>()
        .join("\n"),
      admin = self.admin_url(),
    );
    let text = rows
      .iter()
      .map(|(k, v)| format!("{k}: {v}"))
      .chain(std::iter::once(self.admin_url()))
      .collect::<Vec<_>>()
      .join("\n");
    EmailMessage { to, subject, html, text }
  }

  pub fn email_status_changed(&self, order: &Order, status: OrderStatus, to: Vec<String>) -> EmailMessage {
    let subject = format!("Order #{} status: {}", order.order_number, status.as_str());
    let text = format!("{}\n{}", self.status_changed(order, status), self.admin_url());
    let html = format!(
      r#"<div style="font-family: Arial, sans-serif;"><p>Order <strong>{}</strong> ({}) is now <strong>{}</strong>.</p><p><a href="{}">Open in dashboard</a></p></div>"#,
      escape_html(&order.order_number),
      escape_html(&order.customer_name),
      status_label(status),
      self.admin_url()
    );
    EmailMessage { to, subject, html, text }
  }

  /// One block of a delivery hand-off message.
  pub fn handoff_block(&self, order: &Order) -> String {
    let mut lines = vec![
      format!("Order: {}", order.order_number),
      format!("Customer: {} ({})", order.customer_name, order.customer_phone),
    ];
    let car = order.car_info.display_name();
    if !car.is_empty() {
      lines.push(format!("Vehicle: {car}"));
    }
    if let Some(item) = order.primary_item() {
      lines.push(format!("Part: {}", item.part_name));
    }
    lines.push(format!("Delivery: {}", order.delivery_option.as_str()));
    if order.total_amount > 0.0 {
      lines.push(format!("Total: {}", self.money(order.total_amount)));
    }
    lines.push(format!("City: {}", order.city().unwrap_or("-")));
    if let Some(notes) = &order.notes {
      lines.push(format!("Notes: {notes}"));
    }
    let images = order
      .images
      .iter()
      .chain(order.items.iter().flat_map(|item| item.images.iter()));
    for image in images {
      lines.push(self.link(image));
    }
    lines.join("\n")
  }

  pub fn handoff_message(&self, orders: &[Order]) -> String {
    let blocks: Vec<String> = orders.iter().map(|o| self.handoff_block(o)).collect();
    format!("Delivery batch: {} order(s)\n\n{}", orders.len(), blocks.join(HANDOFF_SEPARATOR))
  }

  fn order_rows(&self, order: &Order) -> Vec<(&'static str, String)> {
    let mut rows = vec![
      ("Order number", order.order_number.clone()),
      ("Customer", order.customer_name.clone()),
      ("Phone", order.customer_phone.clone()),
      ("Email", order.customer_email.clone().unwrap_or_else(|| "-".to_string())),
      (
        "Type",
        match order.order_type {
          OrderKind::Parts => "parts".to_string(),
          OrderKind::SellCar => "sell car".to_string(),
        },
      ),
      ("Vehicle", order.car_info.display_name()),
    ];
    if let Some(item) = order.primary_item() {
      rows.push(("Part", item.part_name.clone()));
    }
    rows.push(("Delivery", order.delivery_option.as_str().to_string()));
    rows.push(("Total", self.money(order.total_amount)));
    if let Some(notes) = &order.notes {
      rows.push(("Notes", notes.clone()));
    }
    rows.push(("Created", order.created_at.format("%Y-%m-%d %H:%M UTC").to_string()));
    rows
  }
}

pub const HANDOFF_SEPARATOR: &str = "\n\n----------\n\n";

/// Positional variables for the order templates: `{1: number, 2: total, 3: status}`.
pub fn template_variables(order: &Order, status: OrderStatus) -> BTreeMap<String, String> {
  BTreeMap::from([
    ("1".to_string(), order.order_number.clone()),
    ("2".to_string(), format_amount(order.total_amount)),
    ("3".to_string(), status.as_str().to_string()),
  ])
}

pub fn status_label(status: OrderStatus) -> &'static str {
  match status {
    OrderStatus::Pending => "Pending",
    OrderStatus::Confirmed => "Confirmed",
    OrderStatus::Processing => "Processing",
    OrderStatus::Shipped => "Shipped",
    OrderStatus::Delivered => "Delivered",
    OrderStatus::Cancelled => "Cancelled",
  }
}

/// Whole amounts without decimals, everything else with two.
pub fn format_amount(amount: f64) -> String {
  if amount.fract() == 0.0 {
    format!("{amount:.0}")
  } else {
    format!("{amount:.2}")
  }
}

fn escape_html(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for c in raw.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}
