//! Share-message construction for bills and order tracking.
//!
//! The server builds the share payload (message text, tracking link, and a
//! WhatsApp deep link when the customer phone normalizes cleanly); the
//! client decides which channel to hand it to.

use serde::Serialize;

use crate::config::RegionalConfig;

/// Everything a client needs to dispatch a share action.
#[derive(Debug, Clone, Serialize)]
pub struct SharePlan {
    pub title: String,
    pub text: String,
    pub url: String,
    /// Present only when the customer phone number could be normalized.
    pub whatsapp_url: Option<String>,
}

pub struct SharingService {
    regional: RegionalConfig,
    public_base_url: String,
}

impl SharingService {
    pub fn new(regional: RegionalConfig, public_base_url: impl Into<String>) -> Self {
        Self {
            regional,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Public tracking page link for an order code.
    pub fn tracking_link(&self, order_id: &str) -> String {
        format!(
            "{}/track?id={}",
            self.public_base_url,
            urlencode(order_id)
        )
    }

    /// Builds the bill share payload. `bill_url` must already be generated;
    /// sharing never triggers generation.
    pub fn bill_share(
        &self,
        order_id: &str,
        customer_name: &str,
        customer_phone: &str,
        shop_name: &str,
        bill_url: &str,
    ) -> SharePlan {
        let text = format!(
            "Hello {customer_name},\n\n\
             Your tailoring order bill is ready!\n\n\
             Order ID: {order_id}\n\
             Shop: {shop_name}\n\n\
             Download your bill here:\n{bill_url}\n\n\
             Thank you for choosing us!"
        );
        let whatsapp_url = normalize_phone(customer_phone, &self.regional.country_code)
            .map(|phone| whatsapp_link(&phone, &text));

        SharePlan {
            title: format!("Bill {order_id}"),
            text,
            url: bill_url.to_string(),
            whatsapp_url,
        }
    }

    /// Builds the tracking share payload for an order.
    pub fn tracking_share(
        &self,
        order_id: &str,
        customer_name: &str,
        customer_phone: &str,
        shop_name: &str,
    ) -> SharePlan {
        let url = self.tracking_link(order_id);
        let text = format!(
            "Hello {customer_name},\n\n\
             Your order is in progress!\n\n\
             Order ID: {order_id}\n\
             Shop: {shop_name}\n\n\
             Track your order here:\n{url}\n\n\
             Thank you for choosing us!"
        );
        let whatsapp_url = normalize_phone(customer_phone, &self.regional.country_code)
            .map(|phone| whatsapp_link(&phone, &text));

        SharePlan {
            title: format!("Order {order_id}"),
            text,
            url,
            whatsapp_url,
        }
    }
}

/// Normalizes a free-form phone number into international digits-only form
/// (no `+`), suitable for a wa.me link.
///
/// Whitespace, hyphens, and parentheses are stripped; a leading `0` is
/// replaced with the country code; a bare local number gets the country code
/// prefixed. The function is idempotent on its own output.
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
    let mut digits = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            '+' | ' ' | '-' | '(' | ')' | '\t' => {}
            _ => return None,
        }
    }
    if digits.is_empty() {
        return None;
    }

    if raw.trim_start().starts_with('+') {
        return Some(digits);
    }
    if let Some(rest) = digits.strip_prefix('0') {
        return Some(format!("{country_code}{rest}"));
    }
    if digits.starts_with(country_code) {
        return Some(digits);
    }
    Some(format!("{country_code}{digits}"))
}

/// WhatsApp click-to-chat deep link with a prefilled message.
pub fn whatsapp_link(normalized_phone: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        normalized_phone,
        urlencode(message)
    )
}

// Percent-encodes everything outside the RFC 3986 unreserved set.
fn urlencode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
