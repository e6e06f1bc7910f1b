//! Initial database migration.
//!
//! Creates the enum types, core tables, indexes, and the account-number
//! sequence.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(SEQUENCES_SQL).await?;
        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(INVESTMENTS_SQL).await?;
        db.execute_unprepared(APPROVAL_REQUESTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Ledger entry kinds
CREATE TYPE entry_kind AS ENUM ('deposit', 'withdrawal', 'contribution');

-- Investment lifecycle (fixed -> matured, terminal)
CREATE TYPE investment_status AS ENUM ('fixed', 'matured');

-- Approval request kinds
CREATE TYPE request_kind AS ENUM ('withdrawal', 'contribution', 'investment');

-- Approval request lifecycle
CREATE TYPE request_status AS ENUM ('pending', 'approved', 'rejected');
";

const SEQUENCES_SQL: &str = r"
-- Explicit sequence for account-number generation
CREATE SEQUENCE member_account_seq;
";

const MEMBERS_SQL: &str = r"
CREATE TABLE members (
    id UUID PRIMARY KEY,
    account_number VARCHAR(32) NOT NULL UNIQUE,
    display_name VARCHAR(120) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_members_account_number ON members(account_number);
";

const LEDGER_ENTRIES_SQL: &str = r"
-- Immutable money movements; one row per deposit/withdrawal/contribution
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    kind entry_kind NOT NULL,
    amount NUMERIC(14,2) NOT NULL CHECK (amount > 0),
    entry_date DATE NOT NULL,
    external_ref VARCHAR(64),
    covered_weeks JSONB NOT NULL DEFAULT '[]'::jsonb,
    carry_forward NUMERIC(14,2) NOT NULL DEFAULT 0,
    cumulative_total NUMERIC(14,2) NOT NULL DEFAULT 0,
    next_week INTEGER NOT NULL DEFAULT 1 CHECK (next_week BETWEEN 1 AND 53),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Chronological reads per member (entry_date, then created_at for same-day order)
CREATE INDEX idx_ledger_member_date ON ledger_entries(member_id, entry_date, created_at);

-- Idempotent posting: one entry per (member, external reference).
-- NULL refs are distinct, so unkeyed entries are unaffected.
CREATE UNIQUE INDEX uniq_ledger_external_ref ON ledger_entries(member_id, external_ref);
";

const INVESTMENTS_SQL: &str = r"
CREATE TABLE investments (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    principal NUMERIC(14,2) NOT NULL CHECK (principal > 0),
    annual_rate_pct NUMERIC(5,2) NOT NULL CHECK (annual_rate_pct BETWEEN 0 AND 100),
    term_months INTEGER NOT NULL CHECK (term_months >= 1),
    start_date DATE NOT NULL,
    status investment_status NOT NULL DEFAULT 'fixed',
    interest_posted BOOLEAN NOT NULL DEFAULT FALSE,
    request_id UUID UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_investments_member ON investments(member_id, start_date);

-- The maturity sweep scans only fixed investments
CREATE INDEX idx_investments_fixed ON investments(status) WHERE status = 'fixed';
";

const APPROVAL_REQUESTS_SQL: &str = r"
CREATE TABLE approval_requests (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    kind request_kind NOT NULL,
    amount NUMERIC(14,2) NOT NULL CHECK (amount > 0),
    status request_status NOT NULL DEFAULT 'pending',
    term_months INTEGER CHECK (term_months IS NULL OR term_months >= 1),
    annual_rate_pct NUMERIC(5,2) CHECK (annual_rate_pct IS NULL OR annual_rate_pct BETWEEN 0 AND 100),
    admin_notes TEXT,
    requested_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    decided_at TIMESTAMPTZ
);

-- Pending-hold lookups per member
CREATE INDEX idx_requests_member_status ON approval_requests(member_id, status);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS approval_requests CASCADE;
DROP TABLE IF EXISTS investments CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS members CASCADE;
DROP SEQUENCE IF EXISTS member_account_seq;
DROP TYPE IF EXISTS request_status;
DROP TYPE IF EXISTS request_kind;
DROP TYPE IF EXISTS investment_status;
DROP TYPE IF EXISTS entry_kind;
";
