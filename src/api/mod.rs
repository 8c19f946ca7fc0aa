//! Admin REST API
//!
//! Client side of the GarajHub admin backend.
//!
//! # Endpoints
//!
//! ## Session
//! - `GET /api/check_auth` - Is the cookie session authenticated?
//! - `POST /api/login` - Username + password login
//! - `POST /api/logout` - Invalidate the session
//!
//! ## Dashboard
//! - `GET /api/statistics` - Aggregate counters
//! - `GET /api/analytics/user-growth?period=` - Line chart data
//! - `GET /api/analytics/startup-distribution` - Doughnut chart data
//! - `GET /api/activity` - Recent activity feed
//!
//! ## Collections
//! - `GET /api/users?page=&search=&filter=`
//! - `GET /api/startups?page=&search=&status=`
//! - `GET /api/startup/:id`, `POST /api/startup/:id/approve`, `POST /api/startup/:id/reject`
//! - `GET|POST /api/admins`, `DELETE /api/admins/:id`
//! - `GET|POST /api/backups`, `DELETE /api/backups/:id`, `GET /api/backups/:filename/download`
//! - `GET|POST /api/settings`
//! - `POST /api/broadcast`

pub mod client;
pub mod dto;
pub mod error;

pub use client::{
    AdminApi, HttpAdminClient, HttpClientConfig, StartupListQuery, UserListQuery,
};
pub use dto::{Ack, Envelope, Identity, Pagination};
pub use error::{ClientError, ClientResult};
