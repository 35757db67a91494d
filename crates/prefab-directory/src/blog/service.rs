use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{BlogPost, PostDetail, PostFields, PostId, PostInput, PostSummary};
use super::markdown;
use super::repository::BlogRepository;
use crate::accounts::{UserId, UserRepository};
use crate::error::ServiceError;
use crate::slug;
use crate::validation::{clean, ValidationErrors, Validator, MAX_NAME_LEN};

pub const EXCERPT_CHARS: usize = 160;
const MAX_CONTENT_LEN: usize = 100_000;
const MAX_EXCERPT_LEN: usize = 500;

pub struct BlogService {
    posts: Arc<dyn BlogRepository>,
    users: Arc<dyn UserRepository>,
}

impl BlogService {
    pub fn new(posts: Arc<dyn BlogRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Published posts, most recently published first.
    pub fn list_published(&self, limit: Option<usize>) -> Result<Vec<PostSummary>, ServiceError> {
        let mut posts: Vec<BlogPost> = self
            .posts
            .list()?
            .into_iter()
            .filter(|post| post.published)
            .collect();
        posts.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        if let Some(limit) = limit {
            posts.truncate(limit);
        }
        Ok(posts.iter().map(summarize).collect())
    }

    pub fn published_post(&self, slug: &str) -> Result<PostDetail, ServiceError> {
        let post = self
            .posts
            .fetch_by_slug(slug)?
            .filter(|post| post.published)
            .ok_or(ServiceError::NotFound("post"))?;

        let author = match post.author_id {
            Some(id) => self.users.fetch(id)?.map(|user| user.name),
            None => None,
        };

        Ok(PostDetail {
            summary: summarize(&post),
            html: markdown::render(&post.content),
            content: post.content,
            author,
        })
    }

    pub fn list_all_posts(&self) -> Result<Vec<BlogPost>, ServiceError> {
        Ok(self.posts.list()?)
    }

    pub fn get_post(&self, id: PostId) -> Result<BlogPost, ServiceError> {
        self.posts.fetch(id)?.ok_or(ServiceError::NotFound("post"))
    }

    pub fn create_post(
        &self,
        author: Option<UserId>,
        input: PostInput,
    ) -> Result<BlogPost, ServiceError> {
        let published_at = publication_stamp(None, input.published, Utc::now());
        let fields = post_fields(input, published_at, author)?;
        let created = self.posts.insert(&fields)?;
        info!(
            id = created.id.0,
            slug = %created.slug,
            published = created.published,
            "post created"
        );
        Ok(created)
    }

    /// Keeps the original author and first publication time across edits.
    pub fn update_post(&self, id: PostId, input: PostInput) -> Result<BlogPost, ServiceError> {
        let existing = self.get_post(id)?;
        let published_at = publication_stamp(existing.published_at, input.published, Utc::now());
        let fields = post_fields(input, published_at, existing.author_id)?;
        let updated = self.posts.update(id, &fields)?;
        info!(id = id.0, slug = %updated.slug, published = updated.published, "post updated");
        Ok(updated)
    }

    pub fn delete_post(&self, id: PostId) -> Result<(), ServiceError> {
        self.posts.delete(id)?;
        info!(id = id.0, "post deleted");
        Ok(())
    }
}

fn summarize(post: &BlogPost) -> PostSummary {
    PostSummary {
        title: post.title.clone(),
        slug: post.slug.clone(),
        excerpt: post
            .excerpt
            .clone()
            .unwrap_or_else(|| excerpt(&post.content, EXCERPT_CHARS)),
        image_url: post.image_url.clone(),
        published_at: post.published_at,
    }
}

fn publication_stamp(
    previous: Option<DateTime<Utc>>,
    published: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if published {
        previous.or(Some(now))
    } else {
        None
    }
}

/// Plain-text preview of `content`, cut at a word boundary within `limit` characters.
pub fn excerpt(content: &str, limit: usize) -> String {
    let text = markdown::plain_text(content);
    if text.chars().count() <= limit {
        return text;
    }

    let cut: String = text.chars().take(limit).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(index) if index > 0 => &cut[..index],
        _ => cut.as_str(),
    };
    format!(
        "{}…",
        trimmed.trim_end_matches(|ch: char| ch.is_whitespace() || ",.;:".contains(ch))
    )
}

fn post_fields(
    input: PostInput,
    published_at: Option<DateTime<Utc>>,
    author_id: Option<UserId>,
) -> Result<PostFields, ValidationErrors> {
    let mut validator = Validator::new();
    validator
        .required("title", &input.title, MAX_NAME_LEN)
        .required("content", &input.content, MAX_CONTENT_LEN)
        .max_len("excerpt", input.excerpt.as_deref(), MAX_EXCERPT_LEN)
        .optional_url("image_url", input.image_url.as_deref());

    let slug = slug::resolve(input.slug.as_deref(), &input.title);
    validator.slug("slug", &slug).finish()?;

    Ok(PostFields {
        title: input.title.trim().to_string(),
        slug,
        content: input.content.trim_end().to_string(),
        excerpt: clean(input.excerpt),
        image_url: clean(input.image_url),
        published: input.published,
        published_at,
        author_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn short_content_is_its_own_excerpt() {
        assert_eq!(excerpt("## Hello\n\nA **short** post.", 160), "Hello A short post.");
    }

    #[test]
    fn long_content_cuts_at_word_boundary() {
        let content = "Modular construction moves most of the work into a factory, ".repeat(5);
        let preview = excerpt(&content, 40);
        assert_eq!(preview, "Modular construction moves most of the…");
        assert!(preview.chars().count() <= 41);
    }

    #[test]
    fn first_publish_is_stamped_once() {
        let first = Utc::now();
        let stamped = publication_stamp(None, true, first);
        assert_eq!(stamped, Some(first));

        let later = first + Duration::days(3);
        assert_eq!(publication_stamp(stamped, true, later), Some(first));
        assert_eq!(publication_stamp(stamped, false, later), None);
        assert_eq!(publication_stamp(None, true, later), Some(later));
    }

    #[test]
    fn post_fields_require_title_and_content() {
        let errors = post_fields(PostInput::default(), None, None).expect_err("empty post");
        assert_eq!(errors.get("title"), Some("is required"));
        assert_eq!(errors.get("content"), Some("is required"));
    }
}
