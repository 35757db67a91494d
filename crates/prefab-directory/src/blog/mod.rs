//! Blog posts: markdown content, publication state, and the public feed.

pub mod domain;
pub mod markdown;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{BlogPost, PostDetail, PostFields, PostId, PostInput, PostSummary};
pub use repository::BlogRepository;
pub use router::{blog_admin_router, blog_router};
pub use service::BlogService;
