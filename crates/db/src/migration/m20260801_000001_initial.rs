//! Initial database migration.
//!
//! Creates the core tables: budgets, requests, audit_entries,
//! destinations, and exchange_rates.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: BUDGETS
        // ============================================================
        db.execute_unprepared(BUDGETS_SQL).await?;

        // ============================================================
        // PART 2: REQUESTS & AUDIT TRAIL
        // ============================================================
        db.execute_unprepared(REQUESTS_SQL).await?;
        db.execute_unprepared(AUDIT_ENTRIES_SQL).await?;

        // ============================================================
        // PART 3: PAYEE PROFILES
        // ============================================================
        db.execute_unprepared(DESTINATIONS_SQL).await?;

        // ============================================================
        // PART 4: EXCHANGE RATES
        // ============================================================
        db.execute_unprepared(EXCHANGE_RATES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS exchange_rates, destinations, audit_entries, requests, budgets CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY,
    department VARCHAR(32) NOT NULL,
    reason TEXT NOT NULL,
    amount BIGINT NOT NULL CHECK (amount >= 0),
    spent BIGINT NOT NULL DEFAULT 0,
    received BIGINT NOT NULL DEFAULT 0,
    spent_gbp BIGINT NOT NULL DEFAULT 0,
    spent_cny BIGINT NOT NULL DEFAULT 0,
    received_gbp BIGINT NOT NULL DEFAULT 0,
    received_cny BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_budgets_department ON budgets(department);
";

// "cursor" is a reserved word in Postgres; quoted to match the entity
// column name SeaORM generates.
const REQUESTS_SQL: &str = r#"
CREATE TABLE requests (
    id UUID PRIMARY KEY,
    kind VARCHAR(16) NOT NULL CHECK (kind IN ('expense', 'income')),
    owner_id UUID NOT NULL,
    owner_department VARCHAR(32) NOT NULL,
    department VARCHAR(32) NOT NULL,
    category VARCHAR(32),
    budget_id UUID REFERENCES budgets(id),
    currency VARCHAR(3) NOT NULL CHECK (currency IN ('GBP', 'CNY')),
    amount BIGINT NOT NULL CHECK (amount > 0),
    reason TEXT NOT NULL,
    payee_name VARCHAR(100) NOT NULL DEFAULT '',
    platform VARCHAR(16),
    sort_code VARCHAR(6),
    account_number VARCHAR(8),
    business BOOLEAN NOT NULL DEFAULT FALSE,
    card_number VARCHAR(32),
    bank_name VARCHAR(100),
    "cursor" SMALLINT NOT NULL CHECK ("cursor" BETWEEN -1 AND 5),
    received_gbp BIGINT NOT NULL DEFAULT 0 CHECK (received_gbp >= 0),
    received_cny BIGINT NOT NULL DEFAULT 0 CHECK (received_cny >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_requests_owner ON requests(owner_id);
CREATE INDEX idx_requests_budget ON requests(budget_id);
CREATE INDEX idx_requests_cursor ON requests("cursor" DESC);
"#;

const AUDIT_ENTRIES_SQL: &str = r"
CREATE TABLE audit_entries (
    id UUID PRIMARY KEY,
    request_id UUID NOT NULL REFERENCES requests(id),
    actor_id UUID NOT NULL,
    seq BIGINT NOT NULL GENERATED ALWAYS AS IDENTITY,
    action VARCHAR(16) NOT NULL
        CHECK (action IN ('comment', 'approve', 'reject', 'create', 'cancel', 'complete')),
    note TEXT,
    attachments JSONB NOT NULL DEFAULT '[]'::jsonb,
    amount BIGINT CHECK (amount IS NULL OR amount > 0),
    timestamp TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_audit_entries_request ON audit_entries(request_id, timestamp, seq);
";

// "public" is a reserved word in Postgres; quoted to match the entity
// column name SeaORM generates.
const DESTINATIONS_SQL: &str = r#"
CREATE TABLE destinations (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    name VARCHAR(100) NOT NULL,
    platform VARCHAR(16) NOT NULL CHECK (platform IN ('bank', 'card')),
    sort_code VARCHAR(6),
    account_number VARCHAR(8),
    business BOOLEAN NOT NULL DEFAULT FALSE,
    card_number VARCHAR(32),
    bank_name VARCHAR(100),
    "public" BOOLEAN NOT NULL DEFAULT FALSE,
    star BOOLEAN NOT NULL DEFAULT FALSE,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_destinations_owner ON destinations(owner_id);
"#;

const EXCHANGE_RATES_SQL: &str = r"
CREATE TABLE exchange_rates (
    id UUID PRIMARY KEY,
    from_currency VARCHAR(3) NOT NULL,
    to_currency VARCHAR(3) NOT NULL,
    rate NUMERIC(18, 8) NOT NULL CHECK (rate > 0),
    effective_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (from_currency, to_currency, effective_date)
);
";
