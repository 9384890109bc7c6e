//! Database seeder for Kitabu development and testing.
//!
//! Seeds a test user, the three businesses and a starter chart of accounts
//! for local development. Account types and transaction types are reference
//! data seeded by the initial migration.
//!
//! Usage: cargo run --bin seeder

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use kitabu_db::entities::{account_types, accounts, businesses, sea_orm_active_enums::AccountCategory, users};
use kitabu_shared::config::AppConfig;

/// Test user ID (consistent for all seeds)
const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

/// The businesses the ledger serves: (code, name).
const BUSINESSES: &[(&str, &str)] = &[
    ("WTR", "Water Packaging"),
    ("LND", "Laundry Services"),
    ("RTL", "Retail & LPG"),
];

/// Starter chart of accounts: (number, name, category, contra).
/// Shared across businesses; business-specific accounts are created later
/// through the account repository.
const CHART: &[(&str, &str, AccountCategory, bool)] = &[
    ("1000", "Cash on Hand", AccountCategory::Asset, false),
    ("1010", "Bank Account", AccountCategory::Asset, false),
    ("1100", "Accounts Receivable", AccountCategory::Asset, false),
    ("1200", "Inventory", AccountCategory::Asset, false),
    ("1500", "Equipment", AccountCategory::Asset, false),
    ("1510", "Accumulated Depreciation", AccountCategory::Asset, true),
    ("2000", "Accounts Payable", AccountCategory::Liability, false),
    ("2100", "Loans Payable", AccountCategory::Liability, false),
    ("3000", "Owner's Equity", AccountCategory::Equity, false),
    ("3100", "Retained Earnings", AccountCategory::Equity, false),
    ("4000", "Sales Revenue", AccountCategory::Revenue, false),
    ("4100", "Service Revenue", AccountCategory::Revenue, false),
    ("5000", "Cost of Goods Sold", AccountCategory::Expense, false),
    ("5100", "Rent Expense", AccountCategory::Expense, false),
    ("5200", "Utilities Expense", AccountCategory::Expense, false),
    ("5300", "Salaries Expense", AccountCategory::Expense, false),
    ("5400", "Depreciation Expense", AccountCategory::Expense, false),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    println!("Connecting to database...");
    let db = match AppConfig::load() {
        Ok(config) => kitabu_db::connect_with(&config.database)
            .await
            .expect("Failed to connect to database"),
        Err(_) => {
            // Bare DATABASE_URL still works for quick local runs.
            let database_url = std::env::var("DATABASE_URL")
                .expect("set KITABU__DATABASE__URL (or DATABASE_URL) in environment");
            kitabu_db::connect(&database_url)
                .await
                .expect("Failed to connect to database")
        }
    };

    println!("Seeding test user...");
    seed_test_user(&db).await;

    println!("Seeding businesses...");
    seed_businesses(&db).await;

    println!("Seeding chart of accounts...");
    seed_chart(&db).await;

    println!("Seeding complete!");
}

fn test_user_id() -> Uuid {
    Uuid::parse_str(TEST_USER_ID).unwrap()
}

/// Seeds a test user for development.
async fn seed_test_user(db: &DatabaseConnection) {
    if users::Entity::find_by_id(test_user_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test user already exists, skipping...");
        return;
    }

    let now = chrono::Utc::now().into();
    let user = users::ActiveModel {
        id: Set(test_user_id()),
        email: Set("dev@kitabu.local".to_string()),
        full_name: Set("Dev User".to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    user.insert(db).await.expect("Failed to seed test user");
}

/// Seeds the three businesses.
async fn seed_businesses(db: &DatabaseConnection) {
    let now = chrono::Utc::now();
    for (code, name) in BUSINESSES {
        let existing = businesses::Entity::find()
            .filter(businesses::Column::Code.eq(*code))
            .one(db)
            .await
            .expect("Failed to query businesses");
        if existing.is_some() {
            println!("  Business {code} already exists, skipping...");
            continue;
        }

        let business = businesses::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set((*code).to_string()),
            name: Set((*name).to_string()),
            description: Set(None),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        business.insert(db).await.expect("Failed to seed business");
    }
}

/// Seeds the shared starter chart of accounts.
async fn seed_chart(db: &DatabaseConnection) {
    let now = chrono::Utc::now();
    for (number, name, category, is_contra) in CHART {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::AccountNumber.eq(*number))
            .one(db)
            .await
            .expect("Failed to query accounts");
        if existing.is_some() {
            println!("  Account {number} already exists, skipping...");
            continue;
        }

        let account_type = account_types::Entity::find()
            .filter(account_types::Column::Category.eq(category.clone()))
            .one(db)
            .await
            .expect("Failed to query account types")
            .expect("account_types not seeded; run the migrator first");

        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_number: Set((*number).to_string()),
            name: Set((*name).to_string()),
            account_type_id: Set(account_type.id),
            parent_id: Set(None),
            business_id: Set(None),
            is_contra: Set(*is_contra),
            is_active: Set(true),
            current_balance: Set(Decimal::ZERO),
            description: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        account.insert(db).await.expect("Failed to seed account");
    }
}
