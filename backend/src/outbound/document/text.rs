//! Plain-text shopping list: a title line, then one line per ingredient.

use crate::domain::{SHOPPING_LIST_TITLE, ShoppingList};

pub(super) fn render(list: &ShoppingList) -> Vec<u8> {
    let mut out = String::from(SHOPPING_LIST_TITLE);
    out.push('\n');
    for line in list.lines() {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out.into_bytes()
}
