//! Message bodies. All prices are printed with two decimals.

use crate::domain::Product;
use rust_decimal::Decimal;

/// `*Name - Kind*`, price and stock; the description is added when `detailed`.
pub fn product_info(product: &Product, detailed: bool) -> String {
    let title = if product.kind.is_empty() {
        format!("*{}*", product.name)
    } else {
        format!("*{} - {}*", product.name, product.kind)
    };
    let mut text = format!("{title}\nPrice: {:.2}\nIn stock: {}", product.price, product.stock);
    if detailed && !product.description.is_empty() {
        text.push_str("\n\n");
        text.push_str(&product.description);
    }
    text
}

pub fn product_list(products: &[Product]) -> String {
    products
        .iter()
        .map(|product| product_info(product, false))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product: Product,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// A cart with every line resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
}

impl CartView {
    pub fn new(resolved: Vec<(Product, u32)>) -> Self {
        let lines: Vec<PricedLine> = resolved
            .into_iter()
            .map(|(product, quantity)| PricedLine {
                line_total: product.price * Decimal::from(quantity),
                product,
                quantity,
            })
            .collect();
        let total = lines.iter().map(|line| line.line_total).sum();
        Self { lines, total }
    }

    pub fn render(&self) -> String {
        let mut text = self
            .lines
            .iter()
            .map(|line| format!("*{}*\nQuantity: {}\nPrice: {:.2}", line.product.name, line.quantity, line.line_total))
            .collect::<Vec<_>>()
            .join("\n\n");
        text.push_str(&format!("\n\nTotal: {:.2}", self.total));
        text
    }
}
