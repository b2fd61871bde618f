#![allow(dead_code)]

use basecrud::{AsyncBaseCrud, Fields};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use tracing_subscriber::EnvFilter;

pub mod author;
pub mod book;

/// Installs a test-friendly subscriber once; `RUST_LOG=basecrud=trace` shows
/// the built queries.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Three authors; Ada has two books, Grace one, Alan none.
pub async fn seed(db: &DatabaseConnection) -> (author::Model, author::Model, author::Model) {
    let authors = AsyncBaseCrud::<author::Entity>::new(db.clone());
    let books = AsyncBaseCrud::<book::Entity>::new(db.clone());

    let ada = authors
        .create(Fields::new().set("name", "Ada").set("active", true))
        .await
        .expect("create ada");
    let grace = authors
        .create(
            Fields::new()
                .set("name", "Grace")
                .set("bio", "Compilers")
                .set("active", true),
        )
        .await
        .expect("create grace");
    let alan = authors
        .create(Fields::new().set("name", "Alan").set("active", false))
        .await
        .expect("create alan");

    for (title, pages, author_id) in [
        ("Notes", 60, ada.id),
        ("Sketch", 20, ada.id),
        ("Manual", 200, grace.id),
    ] {
        books
            .create(
                Fields::new()
                    .set("title", title)
                    .set("pages", pages)
                    .set("author_id", author_id),
            )
            .await
            .expect("create book");
    }

    (ada, grace, alan)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateAuthorTable), Box::new(CreateBookTable)]
    }
}

pub struct CreateAuthorTable;

impl MigrationName for CreateAuthorTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_author_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateAuthorTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Authors::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Authors::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Authors::Name).string().not_null())
            .col(ColumnDef::new(Authors::Bio).text().null())
            .col(
                ColumnDef::new(Authors::Active)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Authors::Table).to_owned())
            .await?;
        Ok(())
    }
}

pub struct CreateBookTable;

impl MigrationName for CreateBookTable {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_book_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateBookTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Books::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Books::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Books::Title).string().not_null())
            .col(ColumnDef::new(Books::Pages).integer().not_null())
            .col(ColumnDef::new(Books::AuthorId).integer().null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Authors {
    Table,
    Id,
    Name,
    Bio,
    Active,
}

#[derive(DeriveIden)]
pub enum Books {
    Table,
    Id,
    Title,
    Pages,
    AuthorId,
}
