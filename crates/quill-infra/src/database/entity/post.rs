//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quill_core::domain::Photo;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub about: String,
    pub author: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    pub meta_title: String,
    #[sea_orm(column_type = "Text")]
    pub meta_description: String,
    pub photo_data: Option<Vec<u8>>,
    pub photo_content_type: Option<String>,
    pub source: Option<bool>,
    pub verification: Option<bool>,
    pub posted_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PostedBy",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    User,
    #[sea_orm(has_many = "super::post_category::Entity")]
    PostCategory,
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTag,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::post_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostCategory.def()
    }
}

impl Related<super::post_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostTag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Rebuild the domain post from its row and its ordered join rows.
    pub fn into_domain(self, categories: Vec<Uuid>, tags: Vec<Uuid>) -> quill_core::domain::Post {
        let photo = match (self.photo_data, self.photo_content_type) {
            (Some(data), Some(content_type)) => Some(Photo { data, content_type }),
            _ => None,
        };

        quill_core::domain::Post {
            id: self.id,
            about: self.about,
            author: self.author,
            slug: self.slug,
            body: self.body,
            excerpt: self.excerpt,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            photo,
            source: self.source,
            verification: self.verification,
            categories,
            tags,
            posted_by: self.posted_by,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel (row columns only).
impl From<&quill_core::domain::Post> for ActiveModel {
    fn from(post: &quill_core::domain::Post) -> Self {
        let (photo_data, photo_content_type) = match &post.photo {
            Some(photo) => (Some(photo.data.clone()), Some(photo.content_type.clone())),
            None => (None, None),
        };

        Self {
            id: Set(post.id),
            about: Set(post.about.clone()),
            author: Set(post.author.clone()),
            slug: Set(post.slug.clone()),
            body: Set(post.body.clone()),
            excerpt: Set(post.excerpt.clone()),
            meta_title: Set(post.meta_title.clone()),
            meta_description: Set(post.meta_description.clone()),
            photo_data: Set(photo_data),
            photo_content_type: Set(photo_content_type),
            source: Set(post.source),
            verification: Set(post.verification),
            posted_by: Set(post.posted_by),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
