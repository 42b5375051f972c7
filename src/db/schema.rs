/// Idempotent schema bootstrap, run on every open
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS listings (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    code             TEXT UNIQUE,
    title            TEXT NOT NULL,
    description      TEXT NOT NULL DEFAULT '',
    category         TEXT NOT NULL,
    transaction_type TEXT NOT NULL,
    price_usd        REAL,
    price_ars        REAL,
    address          TEXT NOT NULL DEFAULT '',
    locality         TEXT NOT NULL DEFAULT '',
    region           TEXT NOT NULL DEFAULT '',
    country          TEXT NOT NULL DEFAULT 'Argentina',
    accepts_pets     INTEGER NOT NULL DEFAULT 0,
    pet_type         TEXT NOT NULL DEFAULT 'no_especificado',
    total_area       REAL,
    covered_area     REAL,
    bedrooms         INTEGER,
    bathrooms        INTEGER,
    garages          INTEGER,
    age_years        INTEGER,
    amenities        TEXT NOT NULL DEFAULT '',
    main_image       TEXT,
    featured         INTEGER NOT NULL DEFAULT 0,
    state            TEXT NOT NULL DEFAULT 'borrador',
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    CHECK (updated_at >= created_at)
);

CREATE INDEX IF NOT EXISTS listings_state_updated
    ON listings (state, updated_at DESC);

CREATE INDEX IF NOT EXISTS listings_featured
    ON listings (featured, state);

CREATE TABLE IF NOT EXISTS gallery_images (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    listing_id INTEGER NOT NULL REFERENCES listings (id) ON DELETE CASCADE,
    image      TEXT NOT NULL,
    caption    TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS gallery_images_listing
    ON gallery_images (listing_id);
"#;
