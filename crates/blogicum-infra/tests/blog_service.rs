//! End-to-end flows of `BlogService` over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use uuid::Uuid;

use blogicum_core::domain::{Category, Location, Post, User, Viewer};
use blogicum_core::error::DomainError;
use blogicum_core::forms::{CommentForm, DATETIME_INPUT_FORMAT, PostForm, ProfileForm};
use blogicum_core::policy::{Outcome, Publication};
use blogicum_core::ports::{BaseRepository, CommentRepository};
use blogicum_core::services::{BlogService, Repositories};
use blogicum_infra::{FixedClock, InMemoryStore};

struct Fixture {
    service: BlogService,
    repos: Repositories,
    clock: Arc<FixedClock>,
    alice: User,
    bob: User,
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn date(at: DateTime<Utc>) -> Option<String> {
    Some(at.format(DATETIME_INPUT_FORMAT).to_string())
}

fn form(title: &str, pub_date: Option<String>) -> PostForm {
    PostForm {
        title: title.to_string(),
        text: "Body".to_string(),
        pub_date,
        ..PostForm::default()
    }
}

async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let repos = store.repositories();
    let clock = Arc::new(FixedClock::new(now()));

    let alice = repos
        .users
        .save(User::new("alice".into(), "alice@example.com".into(), "x".into()))
        .await
        .unwrap();
    let bob = repos
        .users
        .save(User::new("bob".into(), "bob@example.com".into(), "x".into()))
        .await
        .unwrap();

    let service = BlogService::new(repos.clone(), clock.clone());

    Fixture {
        service,
        repos,
        clock,
        alice,
        bob,
    }
}

impl Fixture {
    async fn category(&self, slug: &str, is_published: bool) -> Category {
        self.repos
            .categories
            .save(Category::new(slug.to_uppercase(), String::new(), slug.into(), is_published))
            .await
            .unwrap()
    }

    async fn publish(&self, author: &User, title: &str, hours_ago: i64) -> Post {
        self.service
            .create_post(
                author.id,
                &form(title, date(now() - TimeDelta::hours(hours_ago))),
            )
            .await
            .unwrap()
            .post
    }
}

#[tokio::test]
async fn past_dated_post_is_published_on_save() {
    let f = fixture().await;

    let saved = f
        .service
        .create_post(f.alice.id, &form("Old news", date(now() - TimeDelta::days(1))))
        .await
        .unwrap();

    assert_eq!(saved.publication, Publication::Published);
    assert!(saved.post.is_published);
}

#[tokio::test]
async fn future_dated_post_is_scheduled_even_if_marked_published() {
    let f = fixture().await;
    let mut scheduled = form("Tomorrow", date(now() + TimeDelta::days(1)));
    scheduled.is_published = true;

    let saved = f.service.create_post(f.alice.id, &scheduled).await.unwrap();

    assert_eq!(saved.publication, Publication::Scheduled);
    assert!(!saved.post.is_published);
}

#[tokio::test]
async fn index_shows_only_public_posts_newest_first() {
    let f = fixture().await;
    let hidden = f.category("hidden", false).await;

    let older = f.publish(&f.alice, "older", 5).await;
    let newer = f.publish(&f.bob, "newer", 1).await;
    f.service
        .create_post(f.alice.id, &form("later", date(now() + TimeDelta::hours(2))))
        .await
        .unwrap();
    let mut in_hidden = form("in hidden category", date(now() - TimeDelta::hours(3)));
    // Unpublished categories cannot be picked through the form, so file it directly.
    in_hidden.category = None;
    let mut filed = f.service.create_post(f.alice.id, &in_hidden).await.unwrap().post;
    filed.category_id = Some(hidden.id);
    f.repos.posts.save(filed).await.unwrap();

    let page = f.service.index(None).await.unwrap();
    let titles: Vec<&str> = page.items.iter().map(|e| e.post.title.as_str()).collect();

    assert_eq!(titles, vec![newer.title.as_str(), older.title.as_str()]);
    assert_eq!(page.number, 1);
    assert!(!page.has_next);
}

#[tokio::test]
async fn scheduled_post_does_not_self_activate() {
    let f = fixture().await;
    let scheduled = f
        .service
        .create_post(f.alice.id, &form("Soon", date(now() + TimeDelta::hours(1))))
        .await
        .unwrap()
        .post;

    f.clock.advance(TimeDelta::hours(2));
    assert!(f.service.index(None).await.unwrap().is_empty());

    // Re-saving after the date flips the flag.
    let resaved = f
        .service
        .edit_post(Viewer::User(f.alice.id), scheduled.id, &PostForm::from_post(&scheduled))
        .await
        .unwrap();
    assert!(matches!(resaved, Outcome::Done(ref s) if s.publication == Publication::Published));
    assert_eq!(f.service.index(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn index_paginates_by_ten_and_clamps() {
    let f = fixture().await;
    for i in 0..25 {
        f.publish(&f.alice, &format!("post {i}"), i + 1).await;
    }

    let first = f.service.index(None).await.unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(first.items[0].post.title, "post 0");
    assert!(first.has_next && !first.has_previous);

    let last = f.service.index(Some("3")).await.unwrap();
    assert_eq!(last.len(), 5);
    assert_eq!(last.items[4].post.title, "post 24");

    let clamped = f.service.index(Some("999")).await.unwrap();
    assert_eq!(clamped.number, 3);

    let garbage = f.service.index(Some("abc")).await.unwrap();
    assert_eq!(garbage.number, 1);
}

#[tokio::test]
async fn category_page_requires_published_category() {
    let f = fixture().await;
    let travel = f.category("travel", true).await;
    f.category("drafts", false).await;

    let mut filed = form("Trip", date(now() - TimeDelta::hours(1)));
    filed.category = Some(travel.id);
    f.service.create_post(f.alice.id, &filed).await.unwrap();
    f.publish(&f.alice, "uncategorised", 1).await;

    let (category, page) = f.service.category_posts("travel", None).await.unwrap();
    assert_eq!(category.id, travel.id);
    assert_eq!(page.len(), 1);
    assert_eq!(page.items[0].category.as_ref().map(|c| c.slug.as_str()), Some("travel"));

    assert!(matches!(
        f.service.category_posts("drafts", None).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        f.service.category_posts("missing", None).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn profile_owner_sees_everything_others_see_public() {
    let f = fixture().await;
    f.publish(&f.alice, "public", 1).await;
    f.service
        .create_post(f.alice.id, &form("scheduled", date(now() + TimeDelta::days(1))))
        .await
        .unwrap();

    let (_, own) = f
        .service
        .profile("alice", Viewer::User(f.alice.id), None)
        .await
        .unwrap();
    assert_eq!(own.len(), 2);

    let (_, public) = f
        .service
        .profile("alice", Viewer::User(f.bob.id), None)
        .await
        .unwrap();
    assert_eq!(public.len(), 1);

    let (_, anonymous) = f.service.profile("alice", Viewer::Anonymous, None).await.unwrap();
    assert_eq!(anonymous.len(), 1);

    assert!(matches!(
        f.service.profile("nobody", Viewer::Anonymous, None).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn detail_of_unpublished_post_is_only_for_its_author() {
    let f = fixture().await;
    let draft = f
        .service
        .create_post(f.alice.id, &form("draft", None))
        .await
        .unwrap();
    assert_eq!(draft.publication, Publication::Draft);

    assert!(
        f.service
            .post_detail(draft.post.id, Viewer::User(f.alice.id))
            .await
            .is_ok()
    );
    assert!(matches!(
        f.service.post_detail(draft.post.id, Viewer::User(f.bob.id)).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        f.service.post_detail(draft.post.id, Viewer::Anonymous).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn non_author_cannot_delete_or_edit_post() {
    let f = fixture().await;
    let post = f.publish(&f.alice, "mine", 1).await;

    let outcome = f
        .service
        .delete_post(Viewer::User(f.bob.id), post.id)
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Denied));
    assert!(f.repos.posts.find_by_id(post.id).await.unwrap().is_some());

    let outcome = f
        .service
        .edit_post(Viewer::User(f.bob.id), post.id, &form("hijacked", None))
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Denied));
    let unchanged = f.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "mine");

    let outcome = f
        .service
        .delete_post(Viewer::User(f.alice.id), post.id)
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Done(ref p) if p.id == post.id));
    assert!(f.repos.posts.find_by_id(post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_post_form_is_reported_per_field() {
    let f = fixture().await;
    let location = f
        .repos
        .locations
        .save(Location::new("Nowhere".into(), false))
        .await
        .unwrap();

    let mut bad = form("", Some("yesterday".into()));
    bad.location = Some(location.id);

    match f.service.create_post(f.alice.id, &bad).await {
        Err(DomainError::InvalidForm(errors)) => {
            assert!(errors.get("title").is_some());
            assert!(errors.get("pub_date").is_some());
            assert!(errors.get("location").is_some());
        }
        other => panic!("expected form errors, got {other:?}"),
    }
}

#[tokio::test]
async fn comments_are_listed_and_guarded_by_author() {
    let f = fixture().await;
    let post = f.publish(&f.alice, "discuss", 1).await;

    let comment = f
        .service
        .add_comment(f.bob.id, post.id, &CommentForm { text: "first".into() })
        .await
        .unwrap();
    f.clock.advance(TimeDelta::minutes(1));
    f.service
        .add_comment(f.alice.id, post.id, &CommentForm { text: "second".into() })
        .await
        .unwrap();

    let detail = f.service.post_detail(post.id, Viewer::Anonymous).await.unwrap();
    assert_eq!(detail.post.comment_count, 2);
    let texts: Vec<&str> = detail.comments.iter().map(|c| c.comment.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(detail.comments[0].author.username, "bob");

    let denied = f
        .service
        .edit_comment(
            Viewer::User(f.alice.id),
            post.id,
            comment.id,
            &CommentForm { text: "edited".into() },
        )
        .await
        .unwrap();
    assert!(matches!(denied, Outcome::Denied));

    let edited = f
        .service
        .edit_comment(
            Viewer::User(f.bob.id),
            post.id,
            comment.id,
            &CommentForm { text: "edited".into() },
        )
        .await
        .unwrap();
    assert!(matches!(edited, Outcome::Done(ref c) if c.text == "edited"));

    // Someone else's comment reads as missing.
    assert!(matches!(
        f.service.delete_comment(f.alice.id, post.id, comment.id).await,
        Err(DomainError::NotFound { .. })
    ));
    f.service
        .delete_comment(f.bob.id, post.id, comment.id)
        .await
        .unwrap();
    assert_eq!(f.repos.comments.find_for_post(post.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cannot_comment_on_hidden_post() {
    let f = fixture().await;
    let draft = f
        .service
        .create_post(f.alice.id, &form("draft", None))
        .await
        .unwrap()
        .post;

    assert!(matches!(
        f.service
            .add_comment(f.bob.id, draft.id, &CommentForm { text: "hi".into() })
            .await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        f.service
            .add_comment(f.bob.id, Uuid::new_v4(), &CommentForm { text: "hi".into() })
            .await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn profile_edit_rejects_taken_username() {
    let f = fixture().await;

    let taken = f
        .service
        .edit_profile(
            f.alice.id,
            &ProfileForm {
                username: "bob".into(),
                ..ProfileForm::default()
            },
        )
        .await;
    assert!(matches!(taken, Err(DomainError::InvalidForm(ref e)) if e.get("username").is_some()));

    let updated = f
        .service
        .edit_profile(
            f.alice.id,
            &ProfileForm {
                username: "alice2".into(),
                email: "a2@example.com".into(),
                first_name: "Alice".into(),
                last_name: "Liddell".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "alice2");
    assert_eq!(updated.first_name, "Alice");
}
