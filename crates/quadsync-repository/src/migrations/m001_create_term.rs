use sea_orm_migration::{
    async_trait::async_trait,
    prelude::{DbErr, DeriveMigrationName, Iden, Index, MigrationTrait, SchemaManager, Table},
    schema::{string_len, string_len_null, text, uuid, uuid_null},
    sea_query,
};

#[derive(Iden)]
enum Term {
    Table,
    Dataset,
    Id,
    Text,
    Kind,
    Language,
    DatatypeId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No reference count column: orphaned terms are kept, and a count can
        // be added later without touching the key.
        manager
            .create_table(
                Table::create()
                    .table(Term::Table)
                    .if_not_exists()
                    .col(string_len(Term::Dataset, 191))
                    .col(uuid(Term::Id))
                    .col(text(Term::Text))
                    .col(string_len(Term::Kind, 16))
                    .col(string_len_null(Term::Language, 64))
                    .col(uuid_null(Term::DatatypeId))
                    .primary_key(Index::create().col(Term::Dataset).col(Term::Id))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_term_dataset_kind")
                    .table(Term::Table)
                    .col(Term::Dataset)
                    .col(Term::Kind)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Term::Table).if_exists().to_owned())
            .await
    }
}
