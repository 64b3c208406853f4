//! Account, service and appointment storage.
//!
//! The hosted database the product runs against is an external collaborator;
//! handlers reach it only through [`DataStore`]. [`InMemoryStore`] is the
//! implementation the server ships with and the one the tests drive.
//!
//! # Invariants
//! - Every service and appointment carries the id of the account that owns
//!   it, and every read or write is scoped by that owner id.
//! - Account emails are unique.

mod memory;

pub use memory::InMemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors returned by a [`DataStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An account with this email already exists.
    DuplicateEmail(String),
    /// A lock guarding the store was poisoned by a panicking writer.
    LockPoisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEmail(email) => write!(f, "email already registered: {email}"),
            Self::LockPoisoned => write!(f, "store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A registered account.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub company_name: String,
    pub email: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("company_name", &self.company_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Fields needed to create an account; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub company_name: String,
    pub email: String,
    pub password_hash: String,
}

/// A service offered by an account (a haircut, a consultation...).
///
/// Serialized with the field names the frontend already uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "preco")]
    pub price: Option<f64>,
    #[serde(rename = "duracao_minutos")]
    pub duration_minutes: Option<u32>,
}

/// Editable fields of a [`Service`].
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "agendado")]
    Scheduled,
    #[serde(rename = "concluido")]
    Completed,
    #[serde(rename = "cancelado")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
}

/// Criteria for counting appointments. `None` fields match everything.
///
/// The date range is half-open: `from <= date < until`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    /// Whether `appointment` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.from.is_none_or(|from| appointment.appointment_date >= from)
            && self.until.is_none_or(|until| appointment.appointment_date < until)
            && self.status.is_none_or(|status| appointment.status == status)
    }
}

/// Storage operations the API needs.
///
/// Methods taking `owner` only ever see or touch records belonging to that
/// account.
pub trait DataStore: Send + Sync {
    /// Create an account.
    ///
    /// # Errors
    /// `StoreError::DuplicateEmail` if the email is taken.
    fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// The owner's services in creation order.
    fn list_services(&self, owner: &str) -> Result<Vec<Service>, StoreError>;

    fn insert_service(&self, owner: &str, draft: ServiceDraft) -> Result<Service, StoreError>;

    fn get_service(&self, owner: &str, id: &str) -> Result<Option<Service>, StoreError>;

    /// Replace a service's editable fields. `None` if the owner has no such service.
    fn update_service(
        &self,
        owner: &str,
        id: &str,
        draft: ServiceDraft,
    ) -> Result<Option<Service>, StoreError>;

    /// Remove a service and return it. `None` if the owner has no such service.
    fn delete_service(&self, owner: &str, id: &str) -> Result<Option<Service>, StoreError>;

    /// Record an appointment. The owner is `appointment.user_id`.
    fn insert_appointment(&self, appointment: Appointment) -> Result<(), StoreError>;

    fn count_appointments(&self, owner: &str, filter: AppointmentFilter)
    -> Result<u64, StoreError>;
}
