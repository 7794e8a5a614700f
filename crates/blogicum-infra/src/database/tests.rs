use std::collections::BTreeMap;

use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment};
use blogicum_core::error::RepoError;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostQuery, PostRepository,
};

use crate::database::entity::{category, comment, post, user};
use crate::database::postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
};

fn category_model(slug: &str, is_published: bool) -> category::Model {
    category::Model {
        id: Uuid::new_v4(),
        title: "Travel".to_owned(),
        description: "Trips and places".to_owned(),
        slug: slug.to_owned(),
        is_published,
        created_at: Utc::now().into(),
    }
}

fn author_model(username: &str) -> user::Model {
    user::Model {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: "hash".to_owned(),
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

fn post_model(author_id: Uuid, category_id: Option<Uuid>, days_ago: i64) -> post::Model {
    let pub_date = Utc::now() - TimeDelta::days(days_ago);
    post::Model {
        id: Uuid::new_v4(),
        author_id,
        title: format!("{days_ago} days ago"),
        text: "Body".to_owned(),
        pub_date: pub_date.into(),
        is_published: true,
        category_id,
        location_id: None,
        image: None,
        created_at: pub_date.into(),
    }
}

#[tokio::test]
async fn test_public_listing_filters_in_sql_and_hydrates() {
    let author = author_model("alice");
    let travel = category_model("travel", true);
    let filed = post_model(author.id, Some(travel.id), 1);
    let loose = post_model(author.id, None, 2);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            (filed.clone(), Some(travel.clone())),
            (loose.clone(), None),
        ]])
        .append_query_results([vec![author.clone()]])
        .append_query_results([Vec::<BTreeMap<String, Value>>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let entries = repo.find_entries(&PostQuery::public(Utc::now())).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].post.id, filed.id);
    assert_eq!(entries[0].category.as_ref().map(|c| c.slug.as_str()), Some("travel"));
    assert_eq!(entries[0].author.username, "alice");
    assert_eq!(entries[1].post.id, loose.id);
    assert!(entries[1].category.is_none());
    assert!(entries.iter().all(|e| e.comment_count == 0 && e.location.is_none()));

    // listing, authors, comment counts; no location lookup without locations
    let log = repo.db.into_transaction_log();
    assert_eq!(log.len(), 3);

    let listing = &log[0].statements()[0];
    for fragment in [
        r#"LEFT JOIN "categories""#,
        r#""posts"."is_published" = $1"#,
        r#""posts"."pub_date" <= $2"#,
        r#""posts"."category_id" IS NULL OR "categories"."is_published" = $3"#,
        r#"ORDER BY "posts"."pub_date" DESC"#,
    ] {
        assert!(listing.sql.contains(fragment), "missing {fragment} in {}", listing.sql);
    }
    let values = listing.values.as_ref().map(|v| v.0.clone()).unwrap_or_default();
    assert_eq!(values[0], Value::Bool(Some(true)));
    assert_eq!(values[2], Value::Bool(Some(true)));
}

#[tokio::test]
async fn test_unfiltered_listing_has_no_visibility_clause() {
    let author = author_model("bob");
    let draft = post::Model {
        is_published: false,
        ..post_model(author.id, None, 0)
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![(draft.clone(), None::<category::Model>)]])
        .append_query_results([vec![author.clone()]])
        .append_query_results([Vec::<BTreeMap<String, Value>>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let entries = repo
        .find_entries(&PostQuery::all().by_author(author.id))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].post.is_published);

    let log = repo.db.into_transaction_log();
    let listing = &log[0].statements()[0];
    assert!(listing.sql.contains(r#""posts"."author_id" = $1"#));
    assert!(!listing.sql.contains(r#""posts"."is_published" ="#));
    assert!(!listing.sql.contains("IS NULL OR"));
}

#[tokio::test]
async fn test_find_category_by_slug() {
    let model = category_model("travel", true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model.clone()]])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);

    let category = repo.find_by_slug("travel").await.unwrap().unwrap();
    assert_eq!(category.id, model.id);
    assert_eq!(category.slug, "travel");
    assert!(category.is_published);
}

#[tokio::test]
async fn test_find_missing_category_by_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<category::Model>::new()])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);

    assert!(repo.find_by_slug("nowhere").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_owned_comment() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let model = comment::Model {
        id: Uuid::new_v4(),
        post_id,
        author_id,
        text: "Nice post".to_owned(),
        created_at: Utc::now().into(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model.clone()]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    let found: Comment = repo
        .find_owned(model.id, post_id, author_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.text, "Nice post");
    assert_eq!(found.author_id, author_id);
}

#[tokio::test]
async fn test_delete_missing_comment_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);

    let result = BaseRepository::<Comment, Uuid>::delete(&repo, Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_save_new_category_inserts() {
    let model = category_model("news", false);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // existence check, then INSERT ... RETURNING
        .append_query_results([Vec::<category::Model>::new(), vec![model.clone()]])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);

    let saved: Category = repo.save(Category::from(model.clone())).await.unwrap();
    assert_eq!(saved.id, model.id);
    assert!(!saved.is_published);
}
