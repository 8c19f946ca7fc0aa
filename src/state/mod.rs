//! Controller state shared by the dashboard's loaders and actions.

pub mod app;
pub mod generation;

pub use app::{AppState, GrowthPeriod, Modal, StartupsQuery, UsersQuery};
pub use generation::{RequestTracker, Section, Ticket};
