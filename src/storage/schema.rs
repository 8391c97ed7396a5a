//! Database schema and demo data

/// SQL schema for initialization
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS beers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    price TEXT NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    type TEXT NOT NULL DEFAULT '',
    image_url TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    order_date TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL,
    beer_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),

    FOREIGN KEY (order_id) REFERENCES orders(id) ON DELETE CASCADE,
    FOREIGN KEY (beer_id) REFERENCES beers(id)
);

CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);
"#;

/// (name, kind, price, stock, description) rows inserted by `--seed-demo`.
pub const DEMO_CATALOG: &[(&str, &str, &str, i64, &str)] = &[
    ("Brewery Pils", "Lager", "2.40", 120, "Crisp, dry and grassy with a firm bitter finish."),
    ("Harbour Stout", "Stout", "3.10", 48, "Roasted malt, dark chocolate and a creamy head."),
    ("Orchard Weiss", "Wheat", "2.80", 64, "Banana and clove over a soft wheat body."),
    ("Night Shift IPA", "IPA", "3.50", 36, "Resinous pine and grapefruit, 6.5% ABV."),
    ("Amber Road", "Amber Ale", "2.90", 0, "Caramel malt with a gentle hop bite."),
];
