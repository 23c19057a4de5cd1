//! PDF shopping list rendered with `printpdf`.
//!
//! Text is set in an embedded DejaVu Sans so Cyrillic and other non-Latin
//! ingredient names keep their glyphs. Characters the font lacks are skipped.

use printpdf::{Mm, PdfDocument};

use crate::domain::ports::RenderError;
use crate::domain::{SHOPPING_LIST_TITLE, ShoppingList};

/// Text lines (title included) placed on one page.
pub(super) const LINES_PER_PAGE: usize = 40;

static FONT: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const LAYER: &str = "Text";
const MARGIN_LEFT: Mm = Mm(20.0);
const FIRST_BASELINE: Mm = Mm(279.0);
// Line spacing in points.
const LEADING: f32 = 18.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

pub(super) fn render(list: &ShoppingList) -> Result<Vec<u8>, RenderError> {
    let mut lines = Vec::with_capacity(list.lines().len() + 1);
    lines.push(SHOPPING_LIST_TITLE.to_owned());
    lines.extend(list.lines().iter().map(ToString::to_string));

    let (doc, first_page, first_layer) =
        PdfDocument::new(SHOPPING_LIST_TITLE, PAGE_WIDTH, PAGE_HEIGHT, LAYER);
    let font = doc.add_external_font(FONT).map_err(encoding_error)?;

    for (index, page_lines) in lines.chunks(LINES_PER_PAGE).enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER)
        };
        let layer = doc.get_page(page).get_layer(layer);
        layer.begin_text_section();
        layer.set_font(&font, BODY_SIZE);
        layer.set_line_height(LEADING);
        layer.set_text_cursor(MARGIN_LEFT, FIRST_BASELINE);
        for (position, text) in page_lines.iter().enumerate() {
            let is_title = index == 0 && position == 0;
            if is_title {
                layer.set_font(&font, TITLE_SIZE);
            }
            layer.write_text(text.as_str(), &font);
            layer.add_line_break();
            if is_title {
                layer.set_font(&font, BODY_SIZE);
                layer.add_line_break();
            }
        }
        layer.end_text_section();
    }

    doc.save_to_bytes().map_err(encoding_error)
}

fn encoding_error(err: printpdf::Error) -> RenderError {
    RenderError::encoding(err.to_string())
}
