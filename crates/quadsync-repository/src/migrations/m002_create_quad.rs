use sea_orm_migration::{
    async_trait::async_trait,
    prelude::{DbErr, DeriveMigrationName, Iden, Index, MigrationTrait, SchemaManager, Table},
    schema::{string_len, uuid},
    sea_query,
};

#[derive(Iden)]
enum Quad {
    Table,
    Dataset,
    SubjectId,
    PredicateId,
    ObjectId,
    ContextId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quad::Table)
                    .if_not_exists()
                    .col(string_len(Quad::Dataset, 191))
                    .col(uuid(Quad::SubjectId))
                    .col(uuid(Quad::PredicateId))
                    .col(uuid(Quad::ObjectId))
                    .col(uuid(Quad::ContextId))
                    .primary_key(
                        Index::create()
                            .col(Quad::Dataset)
                            .col(Quad::SubjectId)
                            .col(Quad::PredicateId)
                            .col(Quad::ObjectId)
                            .col(Quad::ContextId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_quad_dataset_context")
                    .table(Quad::Table)
                    .col(Quad::Dataset)
                    .col(Quad::ContextId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Quad::Table).if_exists().to_owned())
            .await
    }
}
