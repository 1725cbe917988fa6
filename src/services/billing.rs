use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    config::RegionalConfig,
    errors::ServiceError,
    schema,
    storage::ObjectStore,
};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LEFT_COL_MM: f32 = 20.0;
const RIGHT_COL_MM: f32 = PAGE_WIDTH_MM / 2.0 + 10.0;
const ROW_HEIGHT_MM: f32 = 7.0;

/// Immutable snapshot of everything printed on a bill, captured at
/// generation time so later order mutations cannot leak into the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSnapshot {
    pub order_id: String,
    pub token_number: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub gender: String,
    pub stitch_category: String,
    pub measurements: BTreeMap<String, String>,
    pub work_description: Option<String>,
    pub due_date: NaiveDate,
    pub charges: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub shop_name: String,
    pub shop_phone: String,
}

/// Generates bill PDFs and stores them durably.
///
/// The artifact path is deterministic (`bills/{order_id}.pdf`) and uploads
/// are upserts, so regenerating a bill replaces the previous file instead of
/// accumulating duplicates.
pub struct BillingService {
    store: Arc<dyn ObjectStore>,
    regional: RegionalConfig,
}

impl BillingService {
    pub fn new(store: Arc<dyn ObjectStore>, regional: RegionalConfig) -> Self {
        Self { store, regional }
    }

    /// Renders the bill document, uploads it, and returns the public URL.
    /// Storage failure fails the whole operation; no partial URL is
    /// returned.
    #[instrument(skip(self, snapshot), fields(order_id = %snapshot.order_id))]
    pub async fn generate_bill(&self, snapshot: &BillSnapshot) -> Result<String, ServiceError> {
        let bytes = render_bill(snapshot, &self.regional)?;
        let path = artifact_path(&snapshot.order_id);

        self.store
            .upload(&path, bytes, "application/pdf")
            .await?;

        let url = self.store.public_url(&path);
        info!(url = %url, "Bill generated");
        Ok(url)
    }
}

/// Deterministic artifact path for an order's bill.
pub fn artifact_path(order_id: &str) -> String {
    format!("bills/{order_id}.pdf")
}

/// Splits non-empty measurement entries into two columns: the left column
/// takes the ceiling half, the right column the rest. Entries follow the
/// registry field order when one is given; keys outside it (or without an
/// order) keep their stored order.
pub fn split_measurements<'a>(
    measurements: &'a BTreeMap<String, String>,
    field_order: Option<&'static [&'static str]>,
) -> (Vec<(&'a str, &'a str)>, Vec<(&'a str, &'a str)>) {
    let mut entries: Vec<(&str, &str)> = Vec::with_capacity(measurements.len());

    if let Some(order) = field_order {
        for field in order {
            if let Some(value) = measurements.get(*field).filter(|v| !v.is_empty()) {
                entries.push((field, value));
            }
        }
        entries.extend(
            measurements
                .iter()
                .filter(|(k, v)| !v.is_empty() && !order.contains(&k.as_str()))
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
    } else {
        entries.extend(
            measurements
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
    }

    let mid = entries.len().div_ceil(2);
    let right = entries[mid..].to_vec();
    let mut left = entries;
    left.truncate(mid);
    (left, right)
}

/// Formats a calendar date according to the configured locale.
pub fn format_date(date: NaiveDate, locale: &str) -> String {
    match locale {
        "en-IN" | "en-GB" => date.format("%d/%m/%Y").to_string(),
        "en-US" => date.format("%m/%d/%Y").to_string(),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

/// Greedy word wrap bounded by an approximate character budget per line.
/// Words longer than the budget are hard-split so no line overflows.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            for ch in word.chars() {
                if current_len == max_chars {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
            continue;
        }

        if current_len > 0 && current_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Approximate rendered width of Helvetica text, in millimetres. Good
/// enough for centering headings on an A4 page.
fn text_width_mm(text: &str, font_size_pt: f32) -> f32 {
    // Average Helvetica glyph width is close to half the em size;
    // 1 pt = 0.3528 mm.
    text.chars().count() as f32 * font_size_pt * 0.5 * 0.3528
}

struct Page<'a> {
    layer: PdfLayerReference,
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
}

impl Page<'_> {
    // Coordinates are tracked from the top of the page like a text cursor;
    // the PDF origin is bottom-left.
    fn text(&self, s: &str, size: f32, x: f32, y_from_top: f32, bold: bool) {
        let font = if bold { self.bold } else { self.regular };
        self.layer.use_text(
            s,
            size.into(),
            Mm(x.into()),
            Mm((PAGE_HEIGHT_MM - y_from_top).into()),
            font,
        );
    }

    fn text_centered(&self, s: &str, size: f32, y_from_top: f32, bold: bool) {
        let x = (PAGE_WIDTH_MM - text_width_mm(s, size)) / 2.0;
        self.text(s, size, x.max(MARGIN_MM), y_from_top, bold);
    }

    fn divider(&self, y_from_top: f32, thickness: f32) {
        let y = PAGE_HEIGHT_MM - y_from_top;
        self.layer.set_outline_thickness(thickness.into());
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_MM.into()), Mm(y.into())), false),
                (
                    Point::new(Mm((PAGE_WIDTH_MM - MARGIN_MM).into()), Mm(y.into())),
                    false,
                ),
            ],
            is_closed: false,
        });
    }

    fn labeled(&self, label: &str, value: &str, x: f32, y_from_top: f32, value_offset: f32) {
        self.text(label, 10.0, x, y_from_top, true);
        self.text(value, 10.0, x + value_offset, y_from_top, false);
    }
}

/// Deterministic bill layout; see the page structure the tests assert on.
fn render_bill(snapshot: &BillSnapshot, regional: &RegionalConfig) -> Result<Vec<u8>, ServiceError> {
    let (doc, page_idx, layer_idx) = PdfDocument::new(
        format!("Bill {}", snapshot.order_id),
        Mm(PAGE_WIDTH_MM.into()),
        Mm(PAGE_HEIGHT_MM.into()),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ServiceError::DocumentError(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ServiceError::DocumentError(e.to_string()))?;

    let page = Page {
        layer: doc.get_page(page_idx).get_layer(layer_idx),
        regular: &regular,
        bold: &bold,
    };

    let mut y = 20.0;

    // Header: shop identity, centered
    let shop_name = if snapshot.shop_name.is_empty() {
        "Tailor Shop"
    } else {
        &snapshot.shop_name
    };
    page.text_centered(shop_name, 22.0, y, true);
    y += 8.0;
    page.text_centered(&snapshot.shop_phone, 10.0, y, false);
    y += 12.0;

    page.divider(y, 0.5);
    y += 10.0;

    page.text_centered("TAILORING BILL", 16.0, y, true);
    y += 12.0;

    // Order info: two columns
    page.labeled("Order ID:", &snapshot.order_id, LEFT_COL_MM, y, 30.0);
    page.labeled(
        "Token:",
        &format!("#{}", snapshot.token_number),
        RIGHT_COL_MM,
        y,
        25.0,
    );
    y += ROW_HEIGHT_MM;

    let created = format_date(snapshot.created_at.date_naive(), &regional.date_locale);
    let due = format_date(snapshot.due_date, &regional.date_locale);
    page.labeled("Date:", &created, LEFT_COL_MM, y, 30.0);
    page.labeled("Due Date:", &due, RIGHT_COL_MM, y, 25.0);
    y += 12.0;

    // Customer block
    page.divider(y, 0.3);
    y += 8.0;
    page.text("Customer Details", 12.0, LEFT_COL_MM, y, true);
    y += 8.0;
    page.labeled("Name:", &snapshot.customer_name, LEFT_COL_MM, y, 30.0);
    y += ROW_HEIGHT_MM;
    page.labeled("Phone:", &snapshot.customer_phone, LEFT_COL_MM, y, 30.0);
    y += ROW_HEIGHT_MM;
    let category = format!(
        "{} - {}",
        snapshot.gender,
        schema::category_label(&snapshot.stitch_category)
    );
    page.labeled("Category:", &category, LEFT_COL_MM, y, 30.0);
    y += 12.0;

    // Measurements: filtered, split into two parallel columns
    page.divider(y, 0.3);
    y += 8.0;
    page.text("Measurements (inches)", 12.0, LEFT_COL_MM, y, true);
    y += 8.0;

    let field_order = snapshot
        .gender
        .parse::<schema::Gender>()
        .ok()
        .and_then(|gender| schema::fields(gender, &snapshot.stitch_category));
    let (left, right) = split_measurements(&snapshot.measurements, field_order);
    for (row, (key, value)) in left.iter().enumerate() {
        let row_y = y + row as f32 * ROW_HEIGHT_MM;
        page.labeled(&format!("{key}:"), value, LEFT_COL_MM, row_y, 40.0);
    }
    for (row, (key, value)) in right.iter().enumerate() {
        let row_y = y + row as f32 * ROW_HEIGHT_MM;
        page.labeled(&format!("{key}:"), value, RIGHT_COL_MM, row_y, 40.0);
    }
    y += left.len() as f32 * ROW_HEIGHT_MM + 8.0;

    // Work description, wrapped to the content width
    if let Some(description) = snapshot
        .work_description
        .as_deref()
        .filter(|d| !d.is_empty())
    {
        page.divider(y, 0.3);
        y += 8.0;
        page.text("Work Description", 12.0, LEFT_COL_MM, y, true);
        y += 8.0;
        for line in wrap_text(description, 95) {
            page.text(&line, 10.0, LEFT_COL_MM, y, false);
            y += 6.0;
        }
        y += 8.0;
    }

    page.divider(y, 0.5);
    y += 10.0;

    if let Some(charges) = snapshot.charges.filter(|c| !c.is_zero()) {
        let total = format!("Total Charges: {}{}", regional.currency_symbol, charges);
        page.text_centered(&total, 14.0, y, true);
        y += 12.0;
    }

    y += 5.0;
    page.text_centered("Thank you for choosing us!", 8.0, y, false);

    doc.save_to_bytes()
        .map_err(|e| ServiceError::DocumentError(e.to_string()))
}
