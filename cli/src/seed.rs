//! Idempotent bootstrap data: the admin author plus the starter categories
//! and tags. Safe to run repeatedly; existing rows are left alone.

use anyhow::{Context, Result};
use diesel::prelude::*;

use crate::db::DbPool;
use crate::models::{NewCategory, NewTag, NewUser, ROLE_ADMIN};
use crate::schema::{categories, tags, users};

const ADMIN_EMAIL: &str = "admin@afflux.dev";

const SEED_CATEGORIES: &[(&str, &str, &str)] = &[
    (
        "Technology",
        "technology",
        "Software, gadgets, and the tools that run on them",
    ),
    (
        "Lifestyle",
        "lifestyle",
        "Productivity, habits, and working better",
    ),
    (
        "Reviews",
        "reviews",
        "Hands-on comparisons and buyer's guides",
    ),
];

const SEED_TAGS: &[(&str, &str)] = &[
    ("Affiliate", "affiliate"),
    ("Guide", "guide"),
    ("Comparison", "comparison"),
    ("Best Of", "best-of"),
    ("Tutorial", "tutorial"),
];

pub fn seed(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().context("Failed to get DB connection")?;

    let password = std::env::var("AFFLUX_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let password_hash =
        bcrypt::hash(&password, bcrypt::DEFAULT_COST).context("Failed to hash admin password")?;

    let created = diesel::insert_into(users::table)
        .values(&NewUser {
            email: ADMIN_EMAIL,
            password_hash: &password_hash,
            name: Some("Afflux Admin"),
            role: ROLE_ADMIN,
        })
        .on_conflict(users::email)
        .do_nothing()
        .execute(&mut conn)
        .context("Failed to seed admin user")?;
    if created > 0 {
        tracing::info!(email = ADMIN_EMAIL, "created admin user");
    } else {
        tracing::info!(email = ADMIN_EMAIL, "admin user already exists");
    }

    for (name, slug, description) in SEED_CATEGORIES {
        diesel::insert_into(categories::table)
            .values(&NewCategory {
                name,
                slug,
                description: Some(description),
            })
            .on_conflict(categories::slug)
            .do_nothing()
            .execute(&mut conn)
            .with_context(|| format!("Failed to seed category: {}", slug))?;
    }

    for (name, slug) in SEED_TAGS {
        diesel::insert_into(tags::table)
            .values(&NewTag { name, slug })
            .on_conflict(tags::slug)
            .do_nothing()
            .execute(&mut conn)
            .with_context(|| format!("Failed to seed tag: {}", slug))?;
    }

    println!("Seed complete: admin user, {} categories, {} tags", SEED_CATEGORIES.len(), SEED_TAGS.len());
    Ok(())
}
