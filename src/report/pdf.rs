//! PDF report document
//!
//! A4 pages with a summary block followed by the full per-user table. The
//! table continues on new pages (with its header repeated) as needed.

use crate::errors::{AppError, AppResult};
use crate::types::{ReportSummary, UserStat};
use crate::utils::format::{format_number, format_rate};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

const TITLE: &str = "SMTP2GO Monthly Usage Report";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;

/// Column x positions (mm) and character budgets for the user table
const COLUMNS: [(f32, usize); 6] = [
    (MARGIN, 24),
    (MARGIN + 48.0, 24),
    (MARGIN + 96.0, 12),
    (MARGIN + 117.0, 12),
    (MARGIN + 138.0, 10),
    (MARGIN + 155.0, 9),
];
const TABLE_HEADER: [&str; 6] = ["Username", "Name", "Sent", "Delivered", "Failed", "Rate"];

/// Render `summary` as a PDF document
pub fn render_pdf(summary: &ReportSummary) -> AppResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut canvas = Canvas {
        doc,
        layer,
        regular,
        bold,
        y: PAGE_HEIGHT - MARGIN,
        pages: 1,
    };

    canvas.line(TITLE, 18.0, true);
    canvas.gap();
    canvas.line(
        &format!("Report Period: {}", summary.period_formatted),
        11.0,
        false,
    );
    canvas.line(
        &format!(
            "Generated: {}",
            summary.generated_at.format("%B %d, %Y %H:%M")
        ),
        9.0,
        false,
    );
    canvas.gap();

    let totals = &summary.summary;
    canvas.line("Summary", 14.0, true);
    canvas.line(
        &format!("Total Emails Sent: {}", format_number(totals.total_sent)),
        11.0,
        false,
    );
    canvas.line(
        &format!(
            "Total Emails Delivered: {}",
            format_number(totals.total_delivered)
        ),
        11.0,
        false,
    );
    canvas.line(
        &format!("Total Emails Failed: {}", format_number(totals.total_failed)),
        11.0,
        false,
    );
    canvas.line(
        &format!(
            "Overall Delivery Rate: {}",
            format_rate(totals.delivery_rate)
        ),
        11.0,
        false,
    );
    canvas.line(&format!("Total Users: {}", totals.total_users), 11.0, false);
    canvas.gap();

    canvas.line("Usage by User", 14.0, true);
    if summary.users.is_empty() {
        canvas.line("No email activity recorded for this period.", 11.0, false);
    } else {
        canvas.row(&TABLE_HEADER.map(String::from), true);
        for user in &summary.users {
            if canvas.needs_page() {
                canvas.new_page();
                canvas.row(&TABLE_HEADER.map(String::from), true);
            }
            canvas.row(&user_row(user), false);
        }
    }

    canvas.doc.save_to_bytes().map_err(pdf_error)
}

fn user_row(user: &UserStat) -> [String; 6] {
    [
        user.username.clone(),
        user.display_name.clone(),
        format_number(user.sent),
        format_number(user.delivered),
        format_number(user.failed),
        format_rate(user.delivery_rate),
    ]
}

fn pdf_error(err: impl std::fmt::Display) -> AppError {
    AppError::Render(format!("PDF error: {}", err))
}

/// Cut `text` to `max` characters, marking the cut with "..."
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Top-down text cursor over the document's pages
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl Canvas {
    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    fn needs_page(&self) -> bool {
        self.y - LINE_HEIGHT < MARGIN
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        if self.needs_page() {
            self.new_page();
        }
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), self.font(bold));
        self.y -= LINE_HEIGHT + (size - 10.0).max(0.0) * 0.3;
    }

    fn row(&mut self, cells: &[String; 6], bold: bool) {
        for (cell, (x, width)) in cells.iter().zip(COLUMNS) {
            self.layer
                .use_text(truncate(cell, width), 9.0, Mm(x), Mm(self.y), self.font(bold));
        }
        self.y -= LINE_HEIGHT;
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT / 2.0;
    }
}
