use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Role).string().not_null().default("user"))
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        for table in [Taxonomy::Categories, Taxonomy::Tags] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(ColumnDef::new(Taxonomy::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Taxonomy::Name).string().not_null())
                        .col(ColumnDef::new(Taxonomy::Slug).string().not_null().unique_key())
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::About).string_len(160).not_null())
                    .col(ColumnDef::new(Posts::Author).string_len(160).not_null())
                    .col(ColumnDef::new(Posts::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Posts::Body).text().not_null())
                    .col(ColumnDef::new(Posts::Excerpt).text().not_null())
                    .col(ColumnDef::new(Posts::MetaTitle).string().not_null())
                    .col(ColumnDef::new(Posts::MetaDescription).text().not_null())
                    .col(ColumnDef::new(Posts::PhotoData).binary().null())
                    .col(ColumnDef::new(Posts::PhotoContentType).string().null())
                    .col(ColumnDef::new(Posts::Source).boolean().null())
                    .col(ColumnDef::new(Posts::Verification).boolean().null())
                    .col(ColumnDef::new(Posts::PostedBy).uuid().not_null())
                    .col(timestamp(Posts::CreatedAt))
                    .col(timestamp(Posts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_posted_by")
                            .from(Posts::Table, Posts::PostedBy)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_created_at")
                    .table(Posts::Table)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_posted_by")
                    .table(Posts::Table)
                    .col(Posts::PostedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(link_table(
                PostCategories::Table,
                "post_categories",
                PostCategories::CategoryId,
                Taxonomy::Categories,
            ))
            .await?;
        manager
            .create_table(link_table(
                PostTags::Table,
                "post_tags",
                PostTags::TagId,
                Taxonomy::Tags,
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Taxonomy::Tags).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Taxonomy::Categories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

/// `(post_id, <target>_id, position)` join table; rows go with either side.
fn link_table<T, C>(
    table: T,
    table_name: &str,
    target_column: C,
    target: Taxonomy,
) -> TableCreateStatement
where
    T: IntoIden + Copy + 'static,
    C: IntoIden + Copy + 'static,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(Link::PostId).uuid().not_null())
        .col(ColumnDef::new(target_column).uuid().not_null())
        .col(ColumnDef::new(Link::Position).integer().not_null().default(0))
        .primary_key(Index::create().col(Link::PostId).col(target_column))
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{table_name}_post"))
                .from(table, Link::PostId)
                .to(Posts::Table, Posts::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{table_name}_target"))
                .from(table, target_column)
                .to(target, Taxonomy::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Name,
    Email,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Taxonomy {
    Categories,
    Tags,
    Id,
    Name,
    Slug,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    About,
    Author,
    Slug,
    Body,
    Excerpt,
    MetaTitle,
    MetaDescription,
    PhotoData,
    PhotoContentType,
    Source,
    Verification,
    PostedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PostCategories {
    Table,
    CategoryId,
}

#[derive(DeriveIden, Clone, Copy)]
enum PostTags {
    Table,
    TagId,
}

#[derive(DeriveIden, Clone, Copy)]
enum Link {
    PostId,
    Position,
}
