/// Idempotent schema applied every time a store is opened.
pub(super) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    name          TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL CHECK (role IN ('admin', 'editor')),
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS manufacturers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    location    TEXT,
    state       TEXT,
    latitude    REAL,
    longitude   REAL,
    description TEXT,
    logo_url    TEXT,
    website     TEXT,
    email       TEXT,
    phone       TEXT,
    published   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS models (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    manufacturer_id INTEGER NOT NULL REFERENCES manufacturers(id) ON DELETE CASCADE,
    name            TEXT NOT NULL,
    slug            TEXT NOT NULL UNIQUE,
    description     TEXT,
    square_feet     INTEGER,
    bedrooms        INTEGER,
    bathrooms       REAL,
    price_range     TEXT,
    category        TEXT,
    tags            TEXT NOT NULL DEFAULT '[]',
    features        TEXT NOT NULL DEFAULT '[]',
    images          TEXT NOT NULL DEFAULT '[]',
    published       INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS models_manufacturer_idx ON models(manufacturer_id);

CREATE TABLE IF NOT EXISTS blog_posts (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    slug         TEXT NOT NULL UNIQUE,
    content      TEXT NOT NULL,
    excerpt      TEXT,
    image_url    TEXT,
    published    INTEGER NOT NULL DEFAULT 0,
    published_at TEXT,
    author_id    INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS leads (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    kind              TEXT NOT NULL CHECK (kind IN ('contact', 'waitlist', 'survey')),
    name              TEXT,
    email             TEXT NOT NULL,
    phone             TEXT,
    message           TEXT,
    zip               TEXT,
    manufacturer_slug TEXT,
    model_slug        TEXT,
    answers           TEXT,
    created_at        TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS leads_waitlist_email_idx ON leads(email) WHERE kind = 'waitlist';

CREATE TABLE IF NOT EXISTS builders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    location    TEXT,
    website     TEXT,
    email       TEXT,
    phone       TEXT,
    description TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS houses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    builder_id  INTEGER NOT NULL REFERENCES builders(id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    address     TEXT,
    price       INTEGER NOT NULL CHECK (price > 0),
    bedrooms    INTEGER,
    bathrooms   REAL,
    square_feet INTEGER,
    status      TEXT NOT NULL CHECK (status IN ('available', 'pending', 'sold')),
    images      TEXT NOT NULL DEFAULT '[]',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS houses_builder_idx ON houses(builder_id);
"#;
