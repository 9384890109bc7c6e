//! Initial database migration.
//!
//! Creates all enums, tables, indexes and reference seed data for the
//! multi-business ledger schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: IDENTITY & REFERENCE TABLES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(BUSINESSES_SQL).await?;
        db.execute_unprepared(ACCOUNT_TYPES_SQL).await?;
        db.execute_unprepared(TRANSACTION_TYPES_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: JOURNAL & LEDGER
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRY_LINES_SQL).await?;
        db.execute_unprepared(LEDGER_SQL).await?;
        db.execute_unprepared(ENTRY_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 5: SNAPSHOTS & RECONCILIATION
        // ============================================================
        db.execute_unprepared(ACCOUNT_BALANCES_SQL).await?;
        db.execute_unprepared(RECONCILIATIONS_SQL).await?;

        // ============================================================
        // PART 6: AUDIT TRAIL
        // ============================================================
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;

        // ============================================================
        // PART 7: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_ACCOUNT_TYPES_SQL).await?;
        db.execute_unprepared(SEED_TRANSACTION_TYPES_SQL).await?;

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
-- Account categories
CREATE TYPE account_category AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Side on which an account balance increases
CREATE TYPE normal_balance_side AS ENUM ('debit', 'credit');

-- Journal entry lifecycle
CREATE TYPE entry_status AS ENUM ('draft', 'posted', 'reversed');

-- Reconciliation outcome
CREATE TYPE reconciliation_status AS ENUM ('pending', 'reconciled', 'discrepancy');

-- Audit trail actions
CREATE TYPE audit_action AS ENUM ('create', 'update', 'delete', 'login', 'logout', 'export');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const BUSINESSES_SQL: &str = r"
CREATE TABLE businesses (
    id UUID PRIMARY KEY,
    code VARCHAR(10) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNT_TYPES_SQL: &str = r"
CREATE TABLE account_types (
    id UUID PRIMARY KEY,
    category account_category NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    normal_balance normal_balance_side NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRANSACTION_TYPES_SQL: &str = r"
CREATE TABLE transaction_types (
    id UUID PRIMARY KEY,
    code VARCHAR(10) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    account_number VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    account_type_id UUID NOT NULL REFERENCES account_types(id),
    parent_id UUID REFERENCES accounts(id),
    business_id UUID REFERENCES businesses(id),
    is_contra BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    current_balance NUMERIC(15, 2) NOT NULL DEFAULT 0,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_accounts_business ON accounts(business_id);
CREATE INDEX idx_accounts_parent ON accounts(parent_id);
CREATE INDEX idx_accounts_type ON accounts(account_type_id);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    entry_number VARCHAR(20) NOT NULL UNIQUE,
    business_id UUID NOT NULL REFERENCES businesses(id),
    transaction_type_id UUID NOT NULL REFERENCES transaction_types(id),
    transaction_date DATE NOT NULL,
    description TEXT NOT NULL,
    reference VARCHAR(100),
    status entry_status NOT NULL DEFAULT 'draft',
    total_debit NUMERIC(15, 2) NOT NULL,
    total_credit NUMERIC(15, 2) NOT NULL,
    reversed_by UUID REFERENCES journal_entries(id),
    reverses UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    posted_at TIMESTAMPTZ,

    CONSTRAINT chk_entry_balanced CHECK (total_debit = total_credit)
);

CREATE INDEX idx_journal_entries_business_date ON journal_entries(business_id, transaction_date);
CREATE INDEX idx_journal_entries_status ON journal_entries(status);
";

const JOURNAL_ENTRY_LINES_SQL: &str = r"
CREATE TABLE journal_entry_lines (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES journal_entries(id),
    line_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    is_debit BOOLEAN NOT NULL,
    amount NUMERIC(15, 2) NOT NULL,
    description TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_line_amount_positive CHECK (amount > 0),
    CONSTRAINT uq_entry_line UNIQUE (entry_id, line_number)
);

CREATE INDEX idx_journal_entry_lines_entry ON journal_entry_lines(entry_id);
CREATE INDEX idx_journal_entry_lines_account ON journal_entry_lines(account_id);
";

const LEDGER_SQL: &str = r"
CREATE TABLE ledger (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES journal_entries(id),
    line_id UUID NOT NULL REFERENCES journal_entry_lines(id),
    account_id UUID NOT NULL REFERENCES accounts(id),
    business_id UUID NOT NULL REFERENCES businesses(id),
    transaction_date DATE NOT NULL,
    is_debit BOOLEAN NOT NULL,
    amount NUMERIC(15, 2) NOT NULL,
    signed_change NUMERIC(15, 2) NOT NULL,
    balance_after NUMERIC(15, 2) NOT NULL,
    account_sequence BIGINT NOT NULL,
    posted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_ledger_amount_positive CHECK (amount > 0),
    CONSTRAINT uq_ledger_account_sequence UNIQUE (account_id, account_sequence)
);

CREATE INDEX idx_ledger_account_date ON ledger(account_id, transaction_date);
CREATE INDEX idx_ledger_business_date ON ledger(business_id, transaction_date);
CREATE INDEX idx_ledger_entry ON ledger(entry_id);

-- The ledger is append-only. Updates and deletes are blocked at the
-- database level; corrections go through reversing entries.
CREATE OR REPLACE FUNCTION forbid_ledger_mutation() RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'ledger rows are append-only; post a reversing entry instead';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_ledger_no_update
    BEFORE UPDATE OR DELETE ON ledger
    FOR EACH ROW EXECUTE FUNCTION forbid_ledger_mutation();
";

const ENTRY_SEQUENCES_SQL: &str = r"
CREATE TABLE entry_sequences (
    scope_key VARCHAR(20) PRIMARY KEY,
    last_value BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNT_BALANCES_SQL: &str = r"
CREATE TABLE account_balances (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts(id),
    business_id UUID NOT NULL REFERENCES businesses(id),
    balance_date DATE NOT NULL,
    opening_balance NUMERIC(15, 2) NOT NULL,
    closing_balance NUMERIC(15, 2) NOT NULL,
    total_debits NUMERIC(15, 2) NOT NULL,
    total_credits NUMERIC(15, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_account_balance_day UNIQUE (account_id, business_id, balance_date)
);

CREATE INDEX idx_account_balances_date ON account_balances(balance_date);
";

const RECONCILIATIONS_SQL: &str = r"
CREATE TABLE reconciliations (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts(id),
    business_id UUID NOT NULL REFERENCES businesses(id),
    statement_date DATE NOT NULL,
    system_balance NUMERIC(15, 2) NOT NULL,
    external_balance NUMERIC(15, 2) NOT NULL,
    difference NUMERIC(15, 2) NOT NULL,
    status reconciliation_status NOT NULL DEFAULT 'pending',
    notes TEXT,
    reconciled_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_reconciliations_account_date ON reconciliations(account_id, statement_date);
";

const AUDIT_LOGS_SQL: &str = r"
CREATE TABLE audit_logs (
    id UUID PRIMARY KEY,
    table_name VARCHAR(63) NOT NULL,
    record_id VARCHAR(100) NOT NULL,
    action audit_action NOT NULL,
    old_data JSONB,
    new_data JSONB,
    changed_fields JSONB NOT NULL DEFAULT '[]',
    user_id UUID REFERENCES users(id),
    business_id UUID REFERENCES businesses(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_audit_logs_record ON audit_logs(table_name, record_id);
CREATE INDEX idx_audit_logs_user ON audit_logs(user_id);
CREATE INDEX idx_audit_logs_created ON audit_logs(created_at);
";

const SEED_ACCOUNT_TYPES_SQL: &str = r"
INSERT INTO account_types (id, category, name, normal_balance, description) VALUES
    (gen_random_uuid(), 'asset', 'Asset', 'debit', 'Resources owned by the business'),
    (gen_random_uuid(), 'liability', 'Liability', 'credit', 'Obligations owed to others'),
    (gen_random_uuid(), 'equity', 'Equity', 'credit', 'Owner''s residual interest'),
    (gen_random_uuid(), 'revenue', 'Revenue', 'credit', 'Income earned'),
    (gen_random_uuid(), 'expense', 'Expense', 'debit', 'Costs incurred');
";

const SEED_TRANSACTION_TYPES_SQL: &str = r"
INSERT INTO transaction_types (id, code, name, description) VALUES
    (gen_random_uuid(), 'SALE', 'Sale', 'Sale or service income'),
    (gen_random_uuid(), 'EXP', 'Expense', 'Expense payment'),
    (gen_random_uuid(), 'DEP', 'Deposit', 'Cash or bank deposit'),
    (gen_random_uuid(), 'WDR', 'Withdrawal', 'Cash or bank withdrawal'),
    (gen_random_uuid(), 'TRF', 'Transfer', 'Transfer between accounts'),
    (gen_random_uuid(), 'ADJ', 'Adjustment', 'Adjustment entry'),
    (gen_random_uuid(), 'REV', 'Reversal', 'Reversal of a previous entry');
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS audit_logs CASCADE;
DROP TABLE IF EXISTS reconciliations CASCADE;
DROP TABLE IF EXISTS account_balances CASCADE;
DROP TABLE IF EXISTS entry_sequences CASCADE;
DROP TABLE IF EXISTS ledger CASCADE;
DROP TABLE IF EXISTS journal_entry_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS transaction_types CASCADE;
DROP TABLE IF EXISTS account_types CASCADE;
DROP TABLE IF EXISTS businesses CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP FUNCTION IF EXISTS forbid_ledger_mutation CASCADE;

DROP TYPE IF EXISTS audit_action;
DROP TYPE IF EXISTS reconciliation_status;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS normal_balance_side;
DROP TYPE IF EXISTS account_category;
";
