use rusqlite_migration::{M, Migrations};

pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        M::up(
            "CREATE TABLE products (
                sku             TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                description     TEXT,
                price           REAL,
                currency        TEXT NOT NULL DEFAULT 'USD',
                stock           INTEGER NOT NULL DEFAULT 0,
                supplier_name   TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_products_name ON products(name);",
        ),
        M::up("ALTER TABLE products ADD COLUMN incoming_stock INTEGER NOT NULL DEFAULT 0;"),
    ])
}
