//! Business logic services

pub mod auth;
pub mod bootstrap;
pub mod catalog;
pub mod transactions;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub transactions: transactions::TransactionsService,
    pub bootstrap: bootstrap::BootstrapService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let auth = auth::AuthService::new(repository.clone(), config.auth.clone());

        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            transactions: transactions::TransactionsService::new(
                repository.clone(),
                config.loans.clone(),
            ),
            bootstrap: bootstrap::BootstrapService::new(
                repository.clone(),
                auth.clone(),
                config.bootstrap.clone(),
            ),
            users: users::UsersService::new(repository.clone()),
            auth,
            repository,
        }
    }

    /// Database reachability, for the readiness check
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await
    }
}
