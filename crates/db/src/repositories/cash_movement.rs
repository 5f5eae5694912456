//! Cash-movement repository.
//!
//! Every write recomputes the affected daily balances before returning:
//! the movement's date on create and delete, and both the original and the
//! new date (in that order) when an update moves a movement across days.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use centralmei_core::cashbook::{CashbookError, MovementDirection, validate_amount};
use centralmei_shared::types::{SaleId, UserId};

use crate::entities::{cash_movements, sea_orm_active_enums};
use crate::repositories::cash_balance::{BalanceError, CashBalanceRepository};

/// Error types for movement operations.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    /// Movement not found.
    #[error("Cash movement not found: {0}")]
    NotFound(Uuid),

    /// Amount validation failed.
    #[error(transparent)]
    Invalid(#[from] CashbookError),

    /// Balance recomputation failed.
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a movement.
#[derive(Debug, Clone)]
pub struct CreateMovementInput {
    /// Money in or out.
    pub direction: MovementDirection,
    /// Classifying category.
    pub category_id: Option<Uuid>,
    /// Classifying subcategory.
    pub subcategory_id: Option<Uuid>,
    /// What the movement was for.
    pub description: String,
    /// Amount (> 0).
    pub amount: Decimal,
    /// Originating sale for automatic entries.
    pub sale_id: Option<SaleId>,
    /// Calendar date the movement lands on.
    pub movement_date: NaiveDate,
    /// Recording user.
    pub created_by: UserId,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Editable fields of a movement.
#[derive(Debug, Clone, Default)]
pub struct UpdateMovementInput {
    /// New direction.
    pub direction: Option<MovementDirection>,
    /// New category.
    pub category_id: Option<Option<Uuid>>,
    /// New subcategory.
    pub subcategory_id: Option<Option<Uuid>>,
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New movement date.
    pub movement_date: Option<NaiveDate>,
    /// New notes.
    pub notes: Option<Option<String>>,
}

/// Filter options for listing movements.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    /// Filter by direction.
    pub direction: Option<MovementDirection>,
    /// Filter by category.
    pub category_id: Option<Uuid>,
    /// Filter by subcategory.
    pub subcategory_id: Option<Uuid>,
    /// Movements dated on or after this date.
    pub date_from: Option<NaiveDate>,
    /// Movements dated on or before this date.
    pub date_to: Option<NaiveDate>,
}

/// Cash-movement repository.
#[derive(Debug, Clone)]
pub struct CashMovementRepository {
    db: DatabaseConnection,
    balances: CashBalanceRepository,
}

impl CashMovementRepository {
    /// Creates a new cash-movement repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let balances = CashBalanceRepository::new(db.clone());
        Self { db, balances }
    }

    /// Creates a movement and recomputes its date's balance.
    ///
    /// # Errors
    ///
    /// Returns `MovementError::Invalid` for non-positive amounts.
    pub async fn create(
        &self,
        input: CreateMovementInput,
    ) -> Result<cash_movements::Model, MovementError> {
        validate_amount(input.amount)?;

        let now = Utc::now();
        let movement = cash_movements::ActiveModel {
            id: Set(Uuid::now_v7()),
            direction: Set(input.direction.into()),
            category_id: Set(input.category_id),
            subcategory_id: Set(input.subcategory_id),
            description: Set(input.description),
            amount: Set(input.amount),
            sale_id: Set(input.sale_id.map(SaleId::into_inner)),
            movement_date: Set(input.movement_date),
            created_by: Set(input.created_by.into_inner()),
            notes: Set(input.notes),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = movement.insert(&self.db).await?;
        self.balances.recompute_for(model.movement_date).await?;
        Ok(model)
    }

    /// Finds a movement by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<cash_movements::Model>, MovementError> {
        Ok(cash_movements::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Returns true when a movement already references the given sale.
    pub async fn exists_for_sale(&self, sale_id: Uuid) -> Result<bool, MovementError> {
        let count = cash_movements::Entity::find()
            .filter(cash_movements::Column::SaleId.eq(sale_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Lists movements, newest first.
    pub async fn list(
        &self,
        filter: MovementFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<cash_movements::Model>, u64), MovementError> {
        let mut query = cash_movements::Entity::find();

        if let Some(direction) = filter.direction {
            let direction: sea_orm_active_enums::MovementDirection = direction.into();
            query = query.filter(cash_movements::Column::Direction.eq(direction));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(cash_movements::Column::CategoryId.eq(category_id));
        }
        if let Some(subcategory_id) = filter.subcategory_id {
            query = query.filter(cash_movements::Column::SubcategoryId.eq(subcategory_id));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(cash_movements::Column::MovementDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(cash_movements::Column::MovementDate.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(cash_movements::Column::MovementDate)
            .order_by_desc(cash_movements::Column::CreatedAt)
            .offset(Some(offset))
            .limit(Some(limit))
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Updates a movement and recomputes every affected date's balance.
    ///
    /// When the movement date changes, the original date is recomputed
    /// first so its balance no longer counts the moved entry, then the
    /// destination date.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateMovementInput,
    ) -> Result<cash_movements::Model, MovementError> {
        let movement = self
            .find_by_id(id)
            .await?
            .ok_or(MovementError::NotFound(id))?;
        let original_date = movement.movement_date;

        if let Some(amount) = input.amount {
            validate_amount(amount)?;
        }

        let mut active: cash_movements::ActiveModel = movement.into();
        if let Some(direction) = input.direction {
            active.direction = Set(direction.into());
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(subcategory_id) = input.subcategory_id {
            active.subcategory_id = Set(subcategory_id);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(movement_date) = input.movement_date {
            active.movement_date = Set(movement_date);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;

        self.balances.recompute_for(original_date).await?;
        if updated.movement_date != original_date {
            self.balances.recompute_for(updated.movement_date).await?;
        }

        Ok(updated)
    }

    /// Deletes a movement and recomputes its date's balance.
    pub async fn delete(&self, id: Uuid) -> Result<(), MovementError> {
        let movement = self
            .find_by_id(id)
            .await?
            .ok_or(MovementError::NotFound(id))?;
        let date = movement.movement_date;

        movement.delete(&self.db).await?;
        self.balances.recompute_for(date).await?;
        Ok(())
    }
}
