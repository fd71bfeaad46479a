use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;
use vistoria_model::{
    AuthorSummary, ImageContent, ImageDocument, ImageId, TransformationType, UserId,
};

use crate::catalog::{ImageFilter, ImageOrder, ImageScope, Pagination};
use crate::database::ports::images::{
    ImageRepository, ImageUpdateDocument, NewImageDocument, PopulatedImage,
};
use crate::error::{CatalogError, Result};

const IMAGE_COLUMNS: &str = r#"
    i.id, i.author_id, i.title, i.transformation_type, i.public_id,
    i.secure_url, i.width, i.height, i.config, i.transformation_url,
    i.aspect_ratio, i.prompt, i.color, i.tags, i.is_public, i.shared_at,
    i.created_at, i.updated_at
"#;

const AUTHOR_COLUMNS: &str = r#"
    u.first_name AS author_first_name,
    u.last_name AS author_last_name,
    u.external_id AS author_external_id
"#;

#[derive(Debug, Clone)]
pub struct PostgresImageRepository {
    pool: PgPool,
}

impl PostgresImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<ImageDocument> {
        let read = |column: &str, e: sqlx::Error| {
            CatalogError::StoreUnavailable(format!("Failed to read image {column}: {e}"))
        };

        let id: Uuid = row.try_get("id").map_err(|e| read("id", e))?;
        let author_id: Uuid = row.try_get("author_id").map_err(|e| read("author_id", e))?;
        let transformation_type: String = row
            .try_get("transformation_type")
            .map_err(|e| read("transformation_type", e))?;
        let transformation_type = transformation_type
            .parse::<TransformationType>()
            .map_err(|e| CatalogError::StoreUnavailable(format!("Corrupt image row {id}: {e}")))?;
        let config: Option<Value> = row.try_get("config").map_err(|e| read("config", e))?;
        let shared_at: Option<DateTime<Utc>> =
            row.try_get("shared_at").map_err(|e| read("shared_at", e))?;

        let content = ImageContent {
            title: row.try_get("title").map_err(|e| read("title", e))?,
            transformation_type,
            public_id: row.try_get("public_id").map_err(|e| read("public_id", e))?,
            secure_url: row.try_get("secure_url").map_err(|e| read("secure_url", e))?,
            width: row.try_get("width").map_err(|e| read("width", e))?,
            height: row.try_get("height").map_err(|e| read("height", e))?,
            config,
            transformation_url: row
                .try_get("transformation_url")
                .map_err(|e| read("transformation_url", e))?,
            aspect_ratio: row.try_get("aspect_ratio").map_err(|e| read("aspect_ratio", e))?,
            prompt: row.try_get("prompt").map_err(|e| read("prompt", e))?,
            color: row.try_get("color").map_err(|e| read("color", e))?,
            tags: row.try_get("tags").map_err(|e| read("tags", e))?,
        };

        Ok(ImageDocument {
            id: ImageId(id),
            author: UserId(author_id),
            content,
            is_public: row.try_get("is_public").map_err(|e| read("is_public", e))?,
            shared_at,
            created_at: row.try_get("created_at").map_err(|e| read("created_at", e))?,
            updated_at: row.try_get("updated_at").map_err(|e| read("updated_at", e))?,
        })
    }

    fn map_populated_row(row: &PgRow) -> Result<PopulatedImage> {
        let image = Self::map_row(row)?;
        let read = |column: &str, e: sqlx::Error| {
            CatalogError::StoreUnavailable(format!("Failed to read author {column}: {e}"))
        };
        let author = AuthorSummary {
            id: image.author,
            first_name: row
                .try_get("author_first_name")
                .map_err(|e| read("first_name", e))?,
            last_name: row
                .try_get("author_last_name")
                .map_err(|e| read("last_name", e))?,
            external_id: row
                .try_get("author_external_id")
                .map_err(|e| read("external_id", e))?,
        };
        Ok(PopulatedImage { image, author })
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ImageFilter) {
        match filter.scope {
            ImageScope::Public => {
                builder.push(" WHERE i.is_public = TRUE");
            }
            ImageScope::Owner(author) => {
                builder.push(" WHERE i.author_id = ");
                builder.push_bind(author.to_uuid());
            }
        }

        if let Some(term) = &filter.search {
            let pattern = term.like_pattern();
            builder.push(" AND (i.title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR i.prompt ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR i.color ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR EXISTS (SELECT 1 FROM unnest(i.tags) AS tag WHERE tag ILIKE ");
            builder.push_bind(pattern);
            builder.push(r" ESCAPE '\'))");
        }
    }
}

#[async_trait]
impl ImageRepository for PostgresImageRepository {
    async fn insert(&self, image: NewImageDocument) -> Result<ImageDocument> {
        let NewImageDocument {
            author,
            content,
            visibility,
        } = image;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO images AS i (
                id, author_id, title, transformation_type, public_id,
                secure_url, width, height, config, transformation_url,
                aspect_ratio, prompt, color, tags, is_public, shared_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {IMAGE_COLUMNS}
            "#
        ))
        .bind(ImageId::new().to_uuid())
        .bind(author.to_uuid())
        .bind(content.title)
        .bind(content.transformation_type.as_str())
        .bind(content.public_id)
        .bind(content.secure_url)
        .bind(content.width)
        .bind(content.height)
        .bind(content.config)
        .bind(content.transformation_url)
        .bind(content.aspect_ratio)
        .bind(content.prompt)
        .bind(content.color)
        .bind(content.tags)
        .bind(visibility.is_public)
        .bind(visibility.shared_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to insert image: {e}")))?;

        Self::map_row(&row)
    }

    async fn find_by_id(&self, id: ImageId) -> Result<Option<ImageDocument>> {
        let row = sqlx::query(&format!("SELECT {IMAGE_COLUMNS} FROM images i WHERE i.id = $1"))
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to load image {id}: {e}")))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_with_author(&self, id: ImageId) -> Result<Option<PopulatedImage>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {IMAGE_COLUMNS}, {AUTHOR_COLUMNS}
            FROM images i
            JOIN users u ON u.id = i.author_id
            WHERE i.id = $1
            "#
        ))
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to load image {id}: {e}")))?;

        row.as_ref().map(Self::map_populated_row).transpose()
    }

    async fn update(
        &self,
        id: ImageId,
        update: ImageUpdateDocument,
    ) -> Result<Option<ImageDocument>> {
        let ImageUpdateDocument {
            content,
            visibility,
        } = update;

        let row = sqlx::query(&format!(
            r#"
            UPDATE images AS i SET
                title = $2,
                transformation_type = $3,
                public_id = $4,
                secure_url = $5,
                width = $6,
                height = $7,
                config = $8,
                transformation_url = $9,
                aspect_ratio = $10,
                prompt = $11,
                color = $12,
                tags = $13,
                is_public = $14,
                shared_at = $15,
                updated_at = NOW()
            WHERE i.id = $1
            RETURNING {IMAGE_COLUMNS}
            "#
        ))
        .bind(id.to_uuid())
        .bind(content.title)
        .bind(content.transformation_type.as_str())
        .bind(content.public_id)
        .bind(content.secure_url)
        .bind(content.width)
        .bind(content.height)
        .bind(content.config)
        .bind(content.transformation_url)
        .bind(content.aspect_ratio)
        .bind(content.prompt)
        .bind(content.color)
        .bind(content.tags)
        .bind(visibility.is_public)
        .bind(visibility.shared_at)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to update image {id}: {e}")))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn delete(&self, id: ImageId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id.to_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to delete image {id}: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        filter: &ImageFilter,
        order: ImageOrder,
        pagination: Pagination,
    ) -> Result<Vec<PopulatedImage>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {IMAGE_COLUMNS}, {AUTHOR_COLUMNS} FROM images i JOIN users u ON u.id = i.author_id"
        ));
        Self::push_filter(&mut builder, filter);
        builder.push(" ORDER BY ");
        builder.push(order.sql());
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(pagination.limit()));
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX));

        let rows = builder
            .build()
            .fetch_all(self.pool())
            .await
            .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to list images: {e}")))?;

        rows.iter().map(Self::map_populated_row).collect()
    }

    async fn count(&self, filter: &ImageFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM images i");
        Self::push_filter(&mut builder, filter);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to count images: {e}")))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
