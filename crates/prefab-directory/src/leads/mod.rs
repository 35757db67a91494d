//! Lead capture from the public contact, waitlist, and survey forms.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ContactForm, Lead, LeadId, LeadKind, LeadReceipt, NewLead, SurveyAnswers, SurveyForm,
    WaitlistForm,
};
pub use repository::LeadRepository;
pub use router::{leads_admin_router, leads_router};
pub use service::LeadService;
