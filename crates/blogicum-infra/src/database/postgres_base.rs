use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait,
};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, User};
use blogicum_core::error::RepoError;
use blogicum_core::ports::BaseRepository;

/// Domain types stored under a UUID primary key.
pub trait Keyed {
    fn key(&self) -> Uuid;
}

macro_rules! keyed {
    ($($ty:ty),*) => {
        $(impl Keyed for $ty {
            fn key(&self) -> Uuid {
                self.id
            }
        })*
    };
}

keyed!(User, Post, Category, Location, Comment);

/// Map a SeaORM error onto the repository error kinds.
pub(crate) fn repo_err(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(e.to_string()),
        DbErr::RecordNotFound(_) => RepoError::NotFound,
        _ => {
            let err_str = e.to_string();
            if err_str.contains("duplicate") || err_str.contains("unique") {
                RepoError::Constraint(err_str)
            } else {
                RepoError::Query(err_str)
            }
        }
    }
}

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, T> BaseRepository<T, Uuid> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    T: Keyed + From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        // Every row carries an application-generated id, so look it up to
        // choose between INSERT and UPDATE.
        let exists = E::find_by_id(entity.key())
            .one(&self.db)
            .await
            .map_err(repo_err)?
            .is_some();

        let active_model: E::ActiveModel = entity.into();
        let model = if exists {
            active_model.update(&self.db).await
        } else {
            active_model.insert(&self.db).await
        }
        .map_err(repo_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(repo_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
