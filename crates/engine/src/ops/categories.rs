use std::collections::BTreeSet;

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, Sector, categories, sector_categories, sectors,
    util::{normalize_display_name, normalize_name_key},
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn create_category(&self, name: &str) -> ResultEngine<Category> {
        let display = normalize_display_name(name, "category")?;
        let name_norm = normalize_name_key(&display);

        with_tx!(self, |db_tx| {
            if categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(display));
            }

            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(display),
                name_norm: ActiveValue::Set(name_norm),
            }
            .insert(&db_tx)
            .await?;
            Ok(Category::from(model))
        })
    }

    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        Ok(categories::Entity::find()
            .order_by_asc(categories::Column::NameNorm)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::from)
            .collect())
    }

    pub async fn create_sector(&self, name: &str, category_ids: &[Uuid]) -> ResultEngine<Sector> {
        let display = normalize_display_name(name, "sector")?;
        let name_norm = normalize_name_key(&display);

        with_tx!(self, |db_tx| {
            if sectors::Entity::find()
                .filter(sectors::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(display));
            }

            let id = Uuid::new_v4();
            sectors::ActiveModel {
                id: ActiveValue::Set(id),
                name: ActiveValue::Set(display.clone()),
                name_norm: ActiveValue::Set(name_norm),
            }
            .insert(&db_tx)
            .await?;

            let members = replace_members(&db_tx, id, category_ids).await?;
            Ok(Sector {
                id,
                name: display,
                category_ids: members,
            })
        })
    }

    /// Replace the categories of a sector.
    ///
    /// Fails with `Containment` if a manual budget of the sector would end up
    /// below the budgets of its new categories.
    pub async fn set_sector_categories(
        &self,
        sector_id: Uuid,
        category_ids: &[Uuid],
    ) -> ResultEngine<Sector> {
        with_tx!(self, |db_tx| {
            let sector = require_sector(&db_tx, sector_id).await?;
            let members = replace_members(&db_tx, sector_id, category_ids).await?;
            self.ensure_sector_budgets_hold(&db_tx, &sector).await?;
            Ok(Sector {
                id: sector.id,
                name: sector.name,
                category_ids: members,
            })
        })
    }

    pub async fn sector(&self, sector_id: Uuid) -> ResultEngine<Sector> {
        let model = require_sector(&self.database, sector_id).await?;
        let category_ids = sector_member_ids(&self.database, sector_id).await?;
        Ok(Sector {
            id: model.id,
            name: model.name,
            category_ids,
        })
    }

    pub async fn list_sectors(&self) -> ResultEngine<Vec<Sector>> {
        let models = sectors::Entity::find()
            .order_by_asc(sectors::Column::NameNorm)
            .all(&self.database)
            .await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let category_ids = sector_member_ids(&self.database, model.id).await?;
            out.push(Sector {
                id: model.id,
                name: model.name,
                category_ids,
            });
        }
        Ok(out)
    }
}

async fn replace_members<C: ConnectionTrait>(
    db: &C,
    sector_id: Uuid,
    category_ids: &[Uuid],
) -> ResultEngine<Vec<Uuid>> {
    let unique: BTreeSet<Uuid> = category_ids.iter().copied().collect();
    for category_id in &unique {
        require_category(db, *category_id).await?;
    }

    sector_categories::Entity::delete_many()
        .filter(sector_categories::Column::SectorId.eq(sector_id))
        .exec(db)
        .await?;
    for category_id in &unique {
        sector_categories::ActiveModel {
            sector_id: ActiveValue::Set(sector_id),
            category_id: ActiveValue::Set(*category_id),
        }
        .insert(db)
        .await?;
    }
    Ok(unique.into_iter().collect())
}

pub(super) async fn require_category<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
}

pub(super) async fn require_sector<C: ConnectionTrait>(
    db: &C,
    sector_id: Uuid,
) -> ResultEngine<sectors::Model> {
    sectors::Entity::find_by_id(sector_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("sector not exists".to_string()))
}

pub(super) async fn sector_member_ids<C: ConnectionTrait>(
    db: &C,
    sector_id: Uuid,
) -> ResultEngine<Vec<Uuid>> {
    Ok(sector_categories::Entity::find()
        .filter(sector_categories::Column::SectorId.eq(sector_id))
        .order_by_asc(sector_categories::Column::CategoryId)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.category_id)
        .collect())
}

pub(super) async fn sectors_containing<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
) -> ResultEngine<Vec<sectors::Model>> {
    let sector_ids: Vec<Uuid> = sector_categories::Entity::find()
        .filter(sector_categories::Column::CategoryId.eq(category_id))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.sector_id)
        .collect();
    if sector_ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(sectors::Entity::find()
        .filter(sectors::Column::Id.is_in(sector_ids))
        .order_by_asc(sectors::Column::NameNorm)
        .all(db)
        .await?)
}
