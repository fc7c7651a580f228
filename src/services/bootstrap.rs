//! Startup seeding of the catalog and the first librarian account

use crate::{
    config::BootstrapConfig,
    error::AppResult,
    models::book::CreateBook,
    repository::Repository,
    services::auth::AuthService,
};

/// Catalogs smaller than this get the sample books
const SAMPLE_THRESHOLD: i64 = 50;
const SAMPLE_BOOKS: u32 = 60;
const SAMPLE_COPIES: i32 = 5;

/// What a seeding run changed
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub books_inserted: u64,
    pub librarian_created: bool,
}

#[derive(Clone)]
pub struct BootstrapService {
    repository: Repository,
    auth: AuthService,
    config: BootstrapConfig,
}

impl BootstrapService {
    pub fn new(repository: Repository, auth: AuthService, config: BootstrapConfig) -> Self {
        Self {
            repository,
            auth,
            config,
        }
    }

    /// Seed sample data and the configured librarian. Safe to run on every start.
    pub async fn seed(&self) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();

        if self.config.seed_sample_data {
            let count = self.repository.books.count().await?;
            if count < SAMPLE_THRESHOLD {
                report.books_inserted = self
                    .repository
                    .books
                    .insert_missing(&sample_books())
                    .await?;
            }
        }

        if let (Some(email), Some(password)) = (
            self.config.librarian_email.as_deref(),
            self.config.librarian_password.as_deref(),
        ) {
            report.librarian_created = self
                .auth
                .ensure_librarian(&self.config.librarian_name, email, password)
                .await?;
        }

        tracing::info!(
            "Bootstrap: {} sample books inserted, librarian created: {}",
            report.books_inserted,
            report.librarian_created
        );
        Ok(report)
    }
}

/// The sample catalog: ten authors, six titles each
pub fn sample_books() -> Vec<CreateBook> {
    (1..=SAMPLE_BOOKS)
        .map(|i| CreateBook {
            title: format!("Sample Book {}", i),
            author: format!("Author {}", (i - 1) % 10 + 1),
            isbn: format!("978000000{:03}", i),
            total_copies: SAMPLE_COPIES,
        })
        .collect()
}
