pub mod auth_service;
pub use auth_service::{AuthError, AuthService, AuthenticatedUser, ClientInfo, LoginResult};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod complaint_service;
pub use complaint_service::{
    AdminComplaintSummary, ComplaintDetails, ComplaintError, ComplaintService, ComplaintSummary,
    HistoryEntry, Page, Statistics, SubmissionReceipt,
};

pub mod complaint_service_impl;
pub use complaint_service_impl::SeaOrmComplaintService;
