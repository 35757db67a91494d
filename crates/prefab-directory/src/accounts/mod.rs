//! CMS accounts: password login, in-process sessions, and user administration.

pub mod domain;
pub mod password;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

pub use domain::{
    AuthenticatedUser, LoginRequest, NewUser, Role, User, UserChanges, UserId, UserInput,
    UserUpdate, UserView,
};
pub use repository::UserRepository;
pub use router::{auth_router, require_admin, require_session, session_router, users_admin_router};
pub use service::AccountService;
pub use session::{Session, SessionManager, SESSION_COOKIE};
