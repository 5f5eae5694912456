//! Chart-of-accounts catalog repository: categories, subcategories,
//! and products.
//!
//! Deletes are guarded: a category or subcategory referenced by cash
//! movements, and a product referenced by sales, cannot be removed.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use centralmei_core::cashbook::MovementDirection;

use crate::entities::{
    account_categories, account_subcategories, cash_movements, products, sales,
    sea_orm_active_enums,
};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    /// Subcategory not found.
    #[error("Subcategory not found: {0}")]
    SubcategoryNotFound(Uuid),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// The entry is referenced by movements or sales and cannot be deleted.
    #[error("Entry is referenced and cannot be deleted: {0}")]
    InUse(Uuid),

    /// Product prices must be positive.
    #[error("Product price must be greater than zero")]
    NonPositivePrice,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Category name.
    pub name: String,
    /// Revenue (`in`) or expense (`out`).
    pub kind: MovementDirection,
}

/// Input for creating a subcategory.
#[derive(Debug, Clone)]
pub struct CreateSubcategoryInput {
    /// Parent category.
    pub category_id: Uuid,
    /// Subcategory name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Product name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Decimal,
    /// Owning subcategory.
    pub subcategory_id: Uuid,
}

/// The category/subcategory/product triple backing an automated sale.
#[derive(Debug, Clone)]
pub struct ServiceProductRefs {
    /// Top-level revenue category.
    pub category: account_categories::Model,
    /// Service subcategory.
    pub subcategory: account_subcategories::Model,
    /// Product row the sale references.
    pub product: products::Model,
}

/// Catalog repository.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    /// Creates a category.
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<account_categories::Model, CatalogError> {
        let category = account_categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            kind: Set(input.kind.into()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };
        Ok(category.insert(&self.db).await?)
    }

    /// Lists active categories, optionally restricted to one kind.
    pub async fn list_categories(
        &self,
        kind: Option<MovementDirection>,
    ) -> Result<Vec<account_categories::Model>, CatalogError> {
        let mut query = account_categories::Entity::find()
            .filter(account_categories::Column::IsActive.eq(true));

        if let Some(kind) = kind {
            let kind: sea_orm_active_enums::MovementDirection = kind.into();
            query = query.filter(account_categories::Column::Kind.eq(kind));
        }

        Ok(query
            .order_by_asc(account_categories::Column::Kind)
            .order_by_asc(account_categories::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Deletes a category unless movements reference it.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), CatalogError> {
        let category = account_categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?;

        let referenced = cash_movements::Entity::find()
            .filter(cash_movements::Column::CategoryId.eq(id))
            .count(&self.db)
            .await?;
        if referenced > 0 {
            return Err(CatalogError::InUse(id));
        }

        category.delete(&self.db).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Subcategories
    // ------------------------------------------------------------------

    /// Creates a subcategory under an existing category.
    pub async fn create_subcategory(
        &self,
        input: CreateSubcategoryInput,
    ) -> Result<account_subcategories::Model, CatalogError> {
        account_categories::Entity::find_by_id(input.category_id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::CategoryNotFound(input.category_id))?;

        let subcategory = account_subcategories::ActiveModel {
            id: Set(Uuid::now_v7()),
            category_id: Set(input.category_id),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };
        Ok(subcategory.insert(&self.db).await?)
    }

    /// Lists active subcategories of a category.
    pub async fn list_subcategories(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<account_subcategories::Model>, CatalogError> {
        Ok(account_subcategories::Entity::find()
            .filter(account_subcategories::Column::CategoryId.eq(category_id))
            .filter(account_subcategories::Column::IsActive.eq(true))
            .order_by_asc(account_subcategories::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Deletes a subcategory unless movements reference it.
    pub async fn delete_subcategory(&self, id: Uuid) -> Result<(), CatalogError> {
        let subcategory = account_subcategories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::SubcategoryNotFound(id))?;

        let referenced = cash_movements::Entity::find()
            .filter(cash_movements::Column::SubcategoryId.eq(id))
            .count(&self.db)
            .await?;
        if referenced > 0 {
            return Err(CatalogError::InUse(id));
        }

        subcategory.delete(&self.db).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    /// Creates a product under an existing subcategory.
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<products::Model, CatalogError> {
        if input.price <= Decimal::ZERO {
            return Err(CatalogError::NonPositivePrice);
        }
        account_subcategories::Entity::find_by_id(input.subcategory_id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::SubcategoryNotFound(input.subcategory_id))?;

        let product = products::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            is_active: Set(true),
            subcategory_id: Set(input.subcategory_id),
            created_at: Set(Utc::now().into()),
        };
        Ok(product.insert(&self.db).await?)
    }

    /// Lists active products.
    pub async fn list_products(&self) -> Result<Vec<products::Model>, CatalogError> {
        Ok(products::Entity::find()
            .filter(products::Column::IsActive.eq(true))
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds a product by ID.
    pub async fn find_product(&self, id: Uuid) -> Result<Option<products::Model>, CatalogError> {
        Ok(products::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Deletes a product unless sales reference it.
    pub async fn delete_product(&self, id: Uuid) -> Result<(), CatalogError> {
        let product = products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        let referenced = sales::Entity::find()
            .filter(sales::Column::ProductId.eq(id))
            .count(&self.db)
            .await?;
        if referenced > 0 {
            return Err(CatalogError::InUse(id));
        }

        product.delete(&self.db).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Automation support
    // ------------------------------------------------------------------

    /// Resolves or creates the category/subcategory/product triple used by
    /// automated MEI-opening sales. The product price follows the request's
    /// service value when the product is first created.
    pub async fn ensure_service_product(
        &self,
        price: Decimal,
    ) -> Result<ServiceProductRefs, CatalogError> {
        const CATEGORY_NAME: &str = "Serviços MEI";
        const SUBCATEGORY_NAME: &str = "Abertura de MEI";
        const PRODUCT_NAME: &str = "Abertura de MEI";

        let category = match account_categories::Entity::find()
            .filter(account_categories::Column::Name.eq(CATEGORY_NAME))
            .filter(
                account_categories::Column::Kind
                    .eq(sea_orm_active_enums::MovementDirection::In),
            )
            .one(&self.db)
            .await?
        {
            Some(found) => found,
            None => {
                self.create_category(CreateCategoryInput {
                    name: CATEGORY_NAME.to_string(),
                    kind: MovementDirection::In,
                })
                .await?
            }
        };

        let subcategory = match account_subcategories::Entity::find()
            .filter(account_subcategories::Column::CategoryId.eq(category.id))
            .filter(account_subcategories::Column::Name.eq(SUBCATEGORY_NAME))
            .one(&self.db)
            .await?
        {
            Some(found) => found,
            None => {
                self.create_subcategory(CreateSubcategoryInput {
                    category_id: category.id,
                    name: SUBCATEGORY_NAME.to_string(),
                    description: Some("Serviços de abertura de MEI".to_string()),
                })
                .await?
            }
        };

        let product = match products::Entity::find()
            .filter(products::Column::SubcategoryId.eq(subcategory.id))
            .filter(products::Column::Name.eq(PRODUCT_NAME))
            .one(&self.db)
            .await?
        {
            Some(found) => found,
            None => {
                self.create_product(CreateProductInput {
                    name: PRODUCT_NAME.to_string(),
                    description: Some("Serviço completo de abertura de MEI".to_string()),
                    price,
                    subcategory_id: subcategory.id,
                })
                .await?
            }
        };

        Ok(ServiceProductRefs {
            category,
            subcategory,
            product,
        })
    }

    /// Resolves the category owning a subcategory.
    pub async fn find_subcategory_with_category(
        &self,
        subcategory_id: Uuid,
    ) -> Result<
        Option<(account_subcategories::Model, account_categories::Model)>,
        CatalogError,
    > {
        let Some(subcategory) = account_subcategories::Entity::find_by_id(subcategory_id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let category = account_categories::Entity::find_by_id(subcategory.category_id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::CategoryNotFound(subcategory.category_id))?;

        Ok(Some((subcategory, category)))
    }
}
