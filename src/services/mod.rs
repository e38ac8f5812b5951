//! Business logic services

pub mod auth;
pub mod catalog;
pub mod home;
pub mod loans;
pub mod sessions;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub home: home::HomeService,
    pub sessions: Arc<dyn sessions::SessionStore>,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        sessions: Arc<dyn sessions::SessionStore>,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), config.renewal.into()),
            home: home::HomeService::new(repository.clone(), config.home.title_keyword.clone()),
            sessions,
            repository,
        }
    }
}

/// Server-local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
