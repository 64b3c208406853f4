//! In-memory [`DataStore`].
//!
//! # Thread Safety
//!
//! All tables sit behind one `RwLock`: lookups and counts share the read lock,
//! inserts and edits take the write lock. Email uniqueness is checked and
//! enforced under the same write lock, so two concurrent registrations for
//! one email cannot both succeed.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use super::{
    Account, Appointment, AppointmentFilter, DataStore, NewAccount, Service, ServiceDraft,
    StoreError,
};

#[derive(Default)]
struct Tables {
    /// Accounts keyed by id.
    accounts: HashMap<String, Account>,
    /// Email to account id.
    emails: HashMap<String, String>,
    /// Services per owner, in creation order.
    services: HashMap<String, Vec<Service>>,
    /// Appointments per owner.
    appointments: HashMap<String, Vec<Appointment>>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl DataStore for InMemoryStore {
    fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.write()?;
        if tables.emails.contains_key(&account.email) {
            return Err(StoreError::DuplicateEmail(account.email));
        }

        let account = Account {
            id: new_id(),
            name: account.name,
            company_name: account.company_name,
            email: account.email,
            password_hash: account.password_hash,
        };
        tables
            .emails
            .insert(account.email.clone(), account.id.clone());
        tables.accounts.insert(account.id.clone(), account.clone());
        drop(tables);

        tracing::debug!(account_id = %account.id, "account created");
        Ok(account)
    }

    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .emails
            .get(email)
            .and_then(|id| tables.accounts.get(id))
            .cloned())
    }

    fn list_services(&self, owner: &str) -> Result<Vec<Service>, StoreError> {
        Ok(self.read()?.services.get(owner).cloned().unwrap_or_default())
    }

    fn insert_service(&self, owner: &str, draft: ServiceDraft) -> Result<Service, StoreError> {
        let service = Service {
            id: new_id(),
            user_id: owner.to_string(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            duration_minutes: draft.duration_minutes,
        };
        self.write()?
            .services
            .entry(owner.to_string())
            .or_default()
            .push(service.clone());
        Ok(service)
    }

    fn get_service(&self, owner: &str, id: &str) -> Result<Option<Service>, StoreError> {
        Ok(self
            .read()?
            .services
            .get(owner)
            .and_then(|services| services.iter().find(|service| service.id == id))
            .cloned())
    }

    fn update_service(
        &self,
        owner: &str,
        id: &str,
        draft: ServiceDraft,
    ) -> Result<Option<Service>, StoreError> {
        let mut tables = self.write()?;
        let Some(service) = tables
            .services
            .get_mut(owner)
            .and_then(|services| services.iter_mut().find(|service| service.id == id))
        else {
            return Ok(None);
        };

        service.name = draft.name;
        service.description = draft.description;
        service.price = draft.price;
        service.duration_minutes = draft.duration_minutes;
        Ok(Some(service.clone()))
    }

    fn delete_service(&self, owner: &str, id: &str) -> Result<Option<Service>, StoreError> {
        let mut tables = self.write()?;
        let Some(services) = tables.services.get_mut(owner) else {
            return Ok(None);
        };
        Ok(services
            .iter()
            .position(|service| service.id == id)
            .map(|index| services.remove(index)))
    }

    fn insert_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        self.write()?
            .appointments
            .entry(appointment.user_id.clone())
            .or_default()
            .push(appointment);
        Ok(())
    }

    fn count_appointments(
        &self,
        owner: &str,
        filter: AppointmentFilter,
    ) -> Result<u64, StoreError> {
        let tables = self.read()?;
        let count = tables.appointments.get(owner).map_or(0, |appointments| {
            appointments
                .iter()
                .filter(|appointment| filter.matches(appointment))
                .count()
        });
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::store::AppointmentStatus;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Ana".to_string(),
            company_name: "Salon".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn draft(name: &str) -> ServiceDraft {
        ServiceDraft {
            name: name.to_string(),
            description: None,
            price: Some(40.0),
            duration_minutes: Some(45),
        }
    }

    #[test]
    fn test_insert_and_find_account_by_email() {
        let store = InMemoryStore::new();
        let account = store
            .insert_account(new_account("ana@example.com"))
            .expect("insert account");

        let by_email = store
            .find_account_by_email("ana@example.com")
            .expect("lookup")
            .expect("account exists");

        assert_eq!(by_email, account);
        assert!(store.find_account_by_email("nobody@example.com").expect("lookup").is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = InMemoryStore::new();
        store
            .insert_account(new_account("ana@example.com"))
            .expect("insert account");

        let result = store.insert_account(new_account("ana@example.com"));
        assert_eq!(
            result,
            Err(StoreError::DuplicateEmail("ana@example.com".to_string()))
        );
    }

    #[test]
    fn test_concurrent_registration_single_winner() {
        let store = Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.insert_account(new_account("race@example.com")))
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread finished"))
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 1);
    }

    #[test]
    fn test_account_ids_are_unique() {
        let store = InMemoryStore::new();
        let a = store.insert_account(new_account("a@example.com")).expect("insert");
        let b = store.insert_account(new_account("b@example.com")).expect("insert");

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_services_scoped_by_owner() {
        let store = InMemoryStore::new();
        let cut = store.insert_service("alice", draft("Corte")).expect("insert");
        store.insert_service("alice", draft("Barba")).expect("insert");
        store.insert_service("bob", draft("Manicure")).expect("insert");

        let alice: Vec<String> = store
            .list_services("alice")
            .expect("list")
            .into_iter()
            .map(|service| service.name)
            .collect();

        assert_eq!(alice, vec!["Corte", "Barba"]);
        assert_eq!(cut.user_id, "alice");
        assert!(store.get_service("bob", &cut.id).expect("get").is_none());
        assert!(store.list_services("carol").expect("list").is_empty());
    }

    #[test]
    fn test_update_service() {
        let store = InMemoryStore::new();
        let service = store.insert_service("alice", draft("Corte")).expect("insert");

        let updated = store
            .update_service("alice", &service.id, draft("Corte degradê"))
            .expect("update")
            .expect("service exists");

        assert_eq!(updated.id, service.id);
        assert_eq!(updated.name, "Corte degradê");
        assert_eq!(
            store.get_service("alice", &service.id).expect("get"),
            Some(updated)
        );
        assert!(store
            .update_service("bob", &service.id, draft("Hijack"))
            .expect("update")
            .is_none());
    }

    #[test]
    fn test_delete_service() {
        let store = InMemoryStore::new();
        let service = store.insert_service("alice", draft("Corte")).expect("insert");

        assert!(store.delete_service("bob", &service.id).expect("delete").is_none());
        assert_eq!(
            store.delete_service("alice", &service.id).expect("delete"),
            Some(service.clone())
        );
        assert!(store.delete_service("alice", &service.id).expect("delete").is_none());
        assert!(store.list_services("alice").expect("list").is_empty());
    }

    #[test]
    fn test_count_appointments() {
        let store = InMemoryStore::new();
        for (day, status) in [
            (1, AppointmentStatus::Completed),
            (2, AppointmentStatus::Completed),
            (2, AppointmentStatus::Scheduled),
        ] {
            store
                .insert_appointment(Appointment {
                    id: new_id(),
                    user_id: "alice".to_string(),
                    appointment_date: Utc
                        .with_ymd_and_hms(2024, 3, day, 9, 0, 0)
                        .single()
                        .expect("valid date"),
                    status,
                })
                .expect("insert appointment");
        }

        let completed = AppointmentFilter {
            status: Some(AppointmentStatus::Completed),
            ..AppointmentFilter::default()
        };
        assert_eq!(store.count_appointments("alice", completed).expect("count"), 2);
        assert_eq!(
            store
                .count_appointments("alice", AppointmentFilter::default())
                .expect("count"),
            3
        );
        assert_eq!(
            store
                .count_appointments("bob", AppointmentFilter::default())
                .expect("count"),
            0
        );
    }
}
