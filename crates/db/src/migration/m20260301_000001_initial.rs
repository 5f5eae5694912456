//! Initial database migration.
//!
//! Creates all enums and tables for users, service requests, the chart of
//! accounts, sales, the cash book, and gateway payments.

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
        // PART 2: USERS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: SERVICE REQUESTS
        // ============================================================
        db.execute_unprepared(SERVICE_REQUESTS_SQL).await?;

        // ============================================================
        // PART 4: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNT_CATEGORIES_SQL).await?;
        db.execute_unprepared(ACCOUNT_SUBCATEGORIES_SQL).await?;
        db.execute_unprepared(PRODUCTS_SQL).await?;

        // ============================================================
        // PART 5: SALES & CASH BOOK
        // ============================================================
        db.execute_unprepared(SALES_SQL).await?;
        db.execute_unprepared(CASH_MOVEMENTS_SQL).await?;
        db.execute_unprepared(CASH_BALANCES_SQL).await?;

        // ============================================================
        // PART 6: GATEWAY PAYMENTS
        // ============================================================
        db.execute_unprepared(PAYMENTS_SQL).await?;

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
-- Service request lifecycle
CREATE TYPE request_status AS ENUM (
    'pending',
    'processing',
    'completed',
    'cancelled'
);

-- Sale settlement status
CREATE TYPE sale_status AS ENUM ('pending', 'paid', 'cancelled');

-- Sale settlement method
CREATE TYPE payment_method AS ENUM (
    'cash',
    'credit_card',
    'debit_card',
    'pix',
    'bank_transfer',
    'boleto'
);

-- Cash movement direction / account category kind
CREATE TYPE movement_direction AS ENUM ('in', 'out');

-- Gateway payment status (canonical vocabulary)
CREATE TYPE payment_status AS ENUM (
    'pending',
    'approved',
    'rejected',
    'cancelled',
    'in_process',
    'refunded',
    'charged_back'
);

-- MEI bureaucratic service
CREATE TYPE service_kind AS ENUM (
    'open_mei',
    'regularize_mei',
    'annual_declaration',
    'close_mei'
);

-- Business operating mode
CREATE TYPE operating_mode AS ENUM (
    'fixed',
    'internet',
    'telesales',
    'door_to_door',
    'mail',
    'fixed_external',
    'vending_machines'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(200) NOT NULL,
    phone VARCHAR(20),
    is_staff BOOLEAN NOT NULL DEFAULT FALSE,
    is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_users_staff ON users (is_staff) WHERE is_staff;
";

const SERVICE_REQUESTS_SQL: &str = r"
CREATE TABLE service_requests (
    id UUID PRIMARY KEY,

    -- Applicant
    full_name VARCHAR(200) NOT NULL,
    cpf VARCHAR(14) NOT NULL UNIQUE,
    rg VARCHAR(15) NOT NULL,
    rg_issuer VARCHAR(10) NOT NULL,
    rg_issuer_state VARCHAR(2) NOT NULL,
    email VARCHAR(255) NOT NULL,
    phone VARCHAR(20) NOT NULL,

    -- Business
    primary_cnae VARCHAR(20) NOT NULL,
    secondary_cnaes TEXT,
    operating_mode operating_mode NOT NULL,
    starting_capital NUMERIC(10, 2) NOT NULL,

    -- Address
    cep VARCHAR(9) NOT NULL,
    city VARCHAR(100) NOT NULL,
    state VARCHAR(2) NOT NULL,
    street VARCHAR(200) NOT NULL,
    number VARCHAR(10) NOT NULL,
    district VARCHAR(100) NOT NULL,
    complement VARCHAR(100),

    -- Control
    user_id UUID REFERENCES users(id) ON DELETE SET NULL,
    status request_status NOT NULL DEFAULT 'pending',
    service_value NUMERIC(10, 2) NOT NULL DEFAULT 97.00,
    sale_created BOOLEAN NOT NULL DEFAULT FALSE,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_service_requests_status ON service_requests (status);
CREATE INDEX idx_service_requests_created ON service_requests (created_at DESC);
";

const ACCOUNT_CATEGORIES_SQL: &str = r"
CREATE TABLE account_categories (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    kind movement_direction NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (name, kind)
);
";

const ACCOUNT_SUBCATEGORIES_SQL: &str = r"
CREATE TABLE account_subcategories (
    id UUID PRIMARY KEY,
    category_id UUID NOT NULL REFERENCES account_categories(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (category_id, name)
);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    price NUMERIC(10, 2) NOT NULL CHECK (price > 0),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    subcategory_id UUID NOT NULL REFERENCES account_subcategories(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (name, subcategory_id)
);
";

const SALES_SQL: &str = r"
CREATE TABLE sales (
    id UUID PRIMARY KEY,

    -- Buyer snapshot
    customer_name VARCHAR(200) NOT NULL,
    customer_email VARCHAR(255),
    customer_phone VARCHAR(20),
    customer_cpf_cnpj VARCHAR(18),

    product_id UUID NOT NULL REFERENCES products(id) ON DELETE RESTRICT,
    quantity INTEGER NOT NULL CHECK (quantity >= 1),
    unit_price NUMERIC(10, 2) NOT NULL,
    total_value NUMERIC(10, 2) NOT NULL,
    discount NUMERIC(10, 2) NOT NULL DEFAULT 0,
    final_value NUMERIC(10, 2) NOT NULL,

    status sale_status NOT NULL DEFAULT 'pending',
    payment_method payment_method,

    notes TEXT,
    created_by UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    -- A request produces at most one sale, enforced here
    service_request_id UUID UNIQUE REFERENCES service_requests(id) ON DELETE SET NULL,

    sold_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    payment_date TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_sales_status ON sales (status);
CREATE INDEX idx_sales_sold_at ON sales (sold_at DESC);
";

const CASH_MOVEMENTS_SQL: &str = r"
CREATE TABLE cash_movements (
    id UUID PRIMARY KEY,
    direction movement_direction NOT NULL,
    category_id UUID REFERENCES account_categories(id) ON DELETE RESTRICT,
    subcategory_id UUID REFERENCES account_subcategories(id) ON DELETE RESTRICT,
    description VARCHAR(200) NOT NULL,
    amount NUMERIC(10, 2) NOT NULL CHECK (amount > 0),
    -- A paid sale materializes at most one movement, enforced here
    sale_id UUID UNIQUE REFERENCES sales(id) ON DELETE CASCADE,
    movement_date DATE NOT NULL,
    created_by UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_cash_movements_date ON cash_movements (movement_date DESC);
CREATE INDEX idx_cash_movements_direction ON cash_movements (direction);
";

const CASH_BALANCES_SQL: &str = r"
CREATE TABLE cash_balances (
    id UUID PRIMARY KEY,
    date DATE NOT NULL UNIQUE,
    opening_balance NUMERIC(15, 2) NOT NULL DEFAULT 0,
    total_in NUMERIC(15, 2) NOT NULL DEFAULT 0,
    total_out NUMERIC(15, 2) NOT NULL DEFAULT 0,
    closing_balance NUMERIC(15, 2) NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    user_id UUID REFERENCES users(id) ON DELETE SET NULL,
    service_request_id UUID REFERENCES service_requests(id) ON DELETE SET NULL,

    service_kind service_kind NOT NULL,
    amount NUMERIC(10, 2) NOT NULL,
    status payment_status NOT NULL DEFAULT 'pending',

    -- Buyer snapshot
    customer_name VARCHAR(200) NOT NULL,
    customer_email VARCHAR(255) NOT NULL,
    customer_phone VARCHAR(20),

    -- Gateway correlation
    gateway_payment_id VARCHAR(50),
    gateway_preference_id VARCHAR(100),
    external_reference VARCHAR(100) NOT NULL UNIQUE,

    extra JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_payments_status ON payments (status);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS cash_balances;
DROP TABLE IF EXISTS cash_movements;
DROP TABLE IF EXISTS sales;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS account_subcategories;
DROP TABLE IF EXISTS account_categories;
DROP TABLE IF EXISTS service_requests;
DROP TABLE IF EXISTS users;

DROP TYPE IF EXISTS operating_mode;
DROP TYPE IF EXISTS service_kind;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS movement_direction;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS sale_status;
DROP TYPE IF EXISTS request_status;
";
