//! Database seeder for Central MEI development and testing.
//!
//! Seeds an administrative staff user and the MEI service catalog
//! (category, subcategories, and products with their prices).
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use centralmei_core::auth::hash_password;
use centralmei_core::cashbook::MovementDirection;
use centralmei_db::entities::users;
use centralmei_db::repositories::{
    CatalogRepository, CreateCategoryInput, CreateProductInput, CreateSubcategoryInput,
};

/// Admin user seeded for local development.
const ADMIN_EMAIL: &str = "admin@centralmei.dev";

/// The MEI service catalog: (subcategory, product, price in cents).
const SERVICES: &[(&str, &str, i64)] = &[
    ("Abertura de MEI", "Abertura de MEI", 9700),
    ("Regularização de MEI", "Regularização de MEI", 12000),
    ("Declaração Anual MEI", "Declaração Anual MEI", 8900),
    ("Baixa de MEI", "Baixa de MEI", 11000),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = centralmei_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding admin user...");
    seed_admin_user(&db).await;

    println!("Seeding service catalog...");
    seed_service_catalog(&db).await;

    println!("Seeding complete!");
}

/// Seeds a superuser staff account for the back office.
async fn seed_admin_user(db: &DatabaseConnection) {
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(ADMIN_EMAIL))
        .one(db)
        .await
        .expect("Failed to query users");

    if existing.is_some() {
        println!("  Admin user already exists, skipping...");
        return;
    }

    let password = std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin12345".to_string());
    let password_hash = hash_password(&password).expect("Failed to hash admin password");

    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::now_v7()),
        email: Set(ADMIN_EMAIL.to_string()),
        password_hash: Set(password_hash),
        full_name: Set("Administrador".to_string()),
        phone: Set(None),
        is_staff: Set(true),
        is_superuser: Set(true),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    user.insert(db).await.expect("Failed to insert admin user");
    println!("  Admin user created ({ADMIN_EMAIL})");
}

/// Seeds the revenue category and one subcategory/product per service.
async fn seed_service_catalog(db: &DatabaseConnection) {
    let catalog = CatalogRepository::new(db.clone());

    let categories = catalog
        .list_categories(Some(MovementDirection::In))
        .await
        .expect("Failed to list categories");

    let category = match categories.into_iter().find(|c| c.name == "Serviços MEI") {
        Some(category) => {
            println!("  Category already exists, skipping...");
            category
        }
        None => catalog
            .create_category(CreateCategoryInput {
                name: "Serviços MEI".to_string(),
                kind: MovementDirection::In,
            })
            .await
            .expect("Failed to create category"),
    };

    let existing = catalog
        .list_subcategories(category.id)
        .await
        .expect("Failed to list subcategories");

    for (subcategory_name, product_name, price_cents) in SERVICES {
        if existing.iter().any(|s| s.name == *subcategory_name) {
            println!("  {subcategory_name} already seeded, skipping...");
            continue;
        }

        let subcategory = catalog
            .create_subcategory(CreateSubcategoryInput {
                category_id: category.id,
                name: (*subcategory_name).to_string(),
                description: None,
            })
            .await
            .expect("Failed to create subcategory");

        catalog
            .create_product(CreateProductInput {
                name: (*product_name).to_string(),
                description: None,
                price: Decimal::new(*price_cents, 2),
                subcategory_id: subcategory.id,
            })
            .await
            .expect("Failed to create product");

        println!("  Seeded {product_name}");
    }
}
