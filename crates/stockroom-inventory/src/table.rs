//! Typed access to one entity.

use std::marker::PhantomData;

use stockroom_core::{DeleteReport, Error, Fields, Filter, Repository};

use crate::models::Model;

/// Create, read, update and delete for the rows of one model.
///
/// Every call runs in its own transaction on the underlying repository.
pub struct Table<'a, M> {
    repo: &'a Repository,
    _model: PhantomData<M>,
}

impl<'a, M: Model> Table<'a, M> {
    pub(crate) fn new(repo: &'a Repository) -> Self {
        Self {
            repo,
            _model: PhantomData,
        }
    }

    /// Entity name.
    pub fn entity(&self) -> &'static str {
        M::ENTITY
    }

    /// Create a row.
    pub fn create(&self, fields: Fields) -> Result<M, Error> {
        let row = self.repo.create(M::ENTITY, fields)?;
        M::from_row(&row)
    }

    /// Get a row by id.
    pub fn get(&self, id: i64) -> Result<Option<M>, Error> {
        self.repo
            .get(M::ENTITY, id)?
            .map(|row| M::from_row(&row))
            .transpose()
    }

    /// List rows matching a filter, ordered by id.
    pub fn list(&self, filter: &Filter) -> Result<Vec<M>, Error> {
        self.repo
            .list(M::ENTITY, filter)?
            .iter()
            .map(M::from_row)
            .collect()
    }

    /// List every row, ordered by id.
    pub fn all(&self) -> Result<Vec<M>, Error> {
        self.list(&Filter::all())
    }

    /// Number of rows.
    pub fn count(&self) -> Result<usize, Error> {
        self.repo.count(M::ENTITY)
    }

    /// Update a row.
    pub fn update(&self, id: i64, fields: Fields) -> Result<M, Error> {
        let row = self.repo.update(M::ENTITY, id, fields)?;
        M::from_row(&row)
    }

    /// Delete a row along with everything its delete policies reach.
    pub fn delete(&self, id: i64) -> Result<DeleteReport, Error> {
        self.repo.delete(M::ENTITY, id)
    }
}
