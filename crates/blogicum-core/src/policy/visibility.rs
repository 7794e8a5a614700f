//! Post visibility.
//!
//! A post is public once it is published, its publication date has been
//! reached and its category (if any) is published. Authors always see
//! their own posts, including drafts and scheduled ones.

use chrono::{DateTime, Utc};

use crate::domain::{Category, Post, Viewer};

/// Whether `viewer` may see `post` at `now`.
///
/// `category` is the post's category as loaded from storage. A post that
/// references a category which could not be loaded is treated as hidden.
pub fn is_visible(
    post: &Post,
    category: Option<&Category>,
    viewer: Viewer,
    now: DateTime<Utc>,
) -> bool {
    viewer.is(post.author_id) || is_publicly_visible(post, category, now)
}

/// The anonymous-viewer half of [`is_visible`].
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    let category_ok = match category {
        Some(category) => category.is_published,
        None => post.category_id.is_none(),
    };

    post.is_published && post.pub_date <= now && category_ok
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use uuid::Uuid;

    use super::*;
    use crate::domain::PostDraft;

    fn post(author: Uuid, is_published: bool, pub_date: DateTime<Utc>) -> Post {
        Post::new(
            author,
            PostDraft {
                title: "Title".into(),
                text: "Text".into(),
                pub_date,
                is_published,
                category_id: None,
                location_id: None,
                image: None,
            },
            pub_date,
        )
    }

    #[test]
    fn author_sees_own_unpublished_and_future_posts() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let future = now + TimeDelta::days(3);

        for p in [
            post(author, false, now),
            post(author, true, future),
            post(author, false, future),
        ] {
            assert!(is_visible(&p, None, Viewer::User(author), now));
        }
    }

    #[test]
    fn unpublished_post_is_hidden_from_others() {
        let now = Utc::now();
        let p = post(Uuid::new_v4(), false, now - TimeDelta::hours(1));

        assert!(!is_visible(&p, None, Viewer::Anonymous, now));
        assert!(!is_visible(&p, None, Viewer::User(Uuid::new_v4()), now));
    }

    #[test]
    fn future_post_is_hidden_even_when_published() {
        let now = Utc::now();
        let p = post(Uuid::new_v4(), true, now + TimeDelta::minutes(1));

        assert!(!is_visible(&p, None, Viewer::Anonymous, now));
    }

    #[test]
    fn post_at_exactly_now_is_visible() {
        let now = Utc::now();
        let p = post(Uuid::new_v4(), true, now);

        assert!(is_visible(&p, None, Viewer::Anonymous, now));
    }

    #[test]
    fn unpublished_category_hides_post() {
        let now = Utc::now();
        let hidden = Category::new("Hidden".into(), String::new(), "hidden".into(), false);
        let shown = Category::new("Shown".into(), String::new(), "shown".into(), true);
        let mut p = post(Uuid::new_v4(), true, now - TimeDelta::days(1));

        p.category_id = Some(hidden.id);
        assert!(!is_visible(&p, Some(&hidden), Viewer::Anonymous, now));

        p.category_id = Some(shown.id);
        assert!(is_visible(&p, Some(&shown), Viewer::Anonymous, now));
    }

    #[test]
    fn dangling_category_reference_hides_post() {
        let now = Utc::now();
        let mut p = post(Uuid::new_v4(), true, now - TimeDelta::days(1));
        p.category_id = Some(Uuid::new_v4());

        assert!(!is_publicly_visible(&p, None, now));
    }
}
