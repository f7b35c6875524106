//! Diesel-backed publisher: writes a validated draft as a Draft-status post
//! in a single transaction.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use uuid::Uuid;

use afflux_core::review::read_time_minutes;
use afflux_core::slug::unique_slug;
use afflux_core::{ArticleDraft, PublishError, PublishReceipt, Publisher};

use crate::db::DbPool;
use crate::models::{NewCategory, NewPost, NewPostTag, NewTag, PostStatus, User, ROLE_ADMIN};
use crate::schema::{categories, post_tags, posts, tags, users};

/// Error carried through the diesel transaction so both database failures
/// and domain failures roll everything back.
#[derive(Debug)]
enum TxError {
    Db(diesel::result::Error),
    Publish(PublishError),
}

impl From<diesel::result::Error> for TxError {
    fn from(e: diesel::result::Error) -> Self {
        TxError::Db(e)
    }
}

impl From<TxError> for PublishError {
    fn from(e: TxError) -> Self {
        match e {
            TxError::Db(e) => PublishError::Database(e.to_string()),
            TxError::Publish(e) => e,
        }
    }
}

/// "my-slug" -> "My Slug", for display names of upserted categories and tags.
fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct DieselPublisher {
    pool: DbPool,
}

impl DieselPublisher {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Publisher for DieselPublisher {
    async fn publish(
        &self,
        draft: &ArticleDraft,
        word_count: usize,
    ) -> Result<PublishReceipt, PublishError> {
        let pool = self.pool.clone();
        let draft = draft.clone();

        // Diesel is synchronous; keep it off the async executor.
        tokio::task::spawn_blocking(move || insert_post(&pool, &draft, word_count))
            .await
            .map_err(|e| PublishError::Database(format!("publish task panicked: {}", e)))?
    }
}

fn insert_post(
    pool: &DbPool,
    draft: &ArticleDraft,
    word_count: usize,
) -> Result<PublishReceipt, PublishError> {
    let content = serde_json::to_value(&draft.content)
        .map_err(|e| PublishError::Database(format!("content serialization failed: {}", e)))?;

    let mut conn = pool
        .get()
        .map_err(|e| PublishError::Database(e.to_string()))?;

    let receipt = conn.transaction::<PublishReceipt, TxError, _>(|conn| {
        let author = users::table
            .filter(users::role.eq(ROLE_ADMIN))
            .order(users::created_at.asc())
            .select(User::as_select())
            .first(conn)
            .optional()?
            .ok_or(TxError::Publish(PublishError::NoAuthor))?;

        let category_id = upsert_category(conn, &draft.category_slug)?;

        let slug = unique_slug::<TxError, _>(&draft.slug, |candidate| {
            diesel::select(exists(posts::table.filter(posts::slug.eq(candidate))))
                .get_result::<bool>(conn)
                .map_err(TxError::from)
        })?
        .ok_or_else(|| TxError::Publish(PublishError::SlugExhausted(draft.slug.clone())))?;

        let post = NewPost {
            title: &draft.title,
            slug: &slug,
            excerpt: Some(&draft.excerpt),
            content: content.clone(),
            featured_image: Some(&draft.featured_image),
            status: PostStatus::Draft.as_str(),
            meta_title: Some(&draft.meta_title),
            meta_description: Some(&draft.meta_description),
            keywords: Some(&draft.keywords),
            read_time: read_time_minutes(word_count) as i32,
            published_at: None,
            author_id: author.id,
            category_id: Some(category_id),
        };
        let post_id: Uuid = diesel::insert_into(posts::table)
            .values(&post)
            .returning(posts::id)
            .get_result(conn)?;

        for tag_slug in &draft.tag_slugs {
            let tag_id = upsert_tag(conn, tag_slug)?;
            diesel::insert_into(post_tags::table)
                .values(&NewPostTag { post_id, tag_id })
                .on_conflict_do_nothing()
                .execute(conn)?;
        }

        Ok(PublishReceipt { post_id, slug })
    })?;

    tracing::info!(post_id = %receipt.post_id, slug = %receipt.slug, "post inserted");
    Ok(receipt)
}

fn upsert_category(conn: &mut PgConnection, slug: &str) -> Result<Uuid, TxError> {
    diesel::insert_into(categories::table)
        .values(&NewCategory {
            name: &title_from_slug(slug),
            slug,
            description: None,
        })
        .on_conflict(categories::slug)
        .do_nothing()
        .execute(conn)?;

    categories::table
        .filter(categories::slug.eq(slug))
        .select(categories::id)
        .first(conn)
        .map_err(TxError::from)
}

fn upsert_tag(conn: &mut PgConnection, slug: &str) -> Result<Uuid, TxError> {
    diesel::insert_into(tags::table)
        .values(&NewTag {
            name: &title_from_slug(slug),
            slug,
        })
        .on_conflict(tags::slug)
        .do_nothing()
        .execute(conn)?;

    tags::table
        .filter(tags::slug.eq(slug))
        .select(tags::id)
        .first(conn)
        .map_err(TxError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_slug_capitalizes_words() {
        assert_eq!(title_from_slug("artificial-intelligence"), "Artificial Intelligence");
        assert_eq!(title_from_slug("best-of"), "Best Of");
        assert_eq!(title_from_slug("tech"), "Tech");
    }
}
