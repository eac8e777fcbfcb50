//! Session state and startup control flow.
//!
//! On load the connectivity probe fixes the session mode, then the six
//! collections are populated: connected sessions fan out six concurrent
//! remote fetches and join them (partial failure falls back only that
//! collection to its seed), local sessions read the persistence mirror.
//! All subsequent mutations go through the store adapter for the kind and,
//! in local mode, are followed by a mirror flush.

use crate::config::AppConfig;
use crate::entities::{
    Category, Entity, Location, Product, Purpose, Registration, User, instant_id,
};
use crate::errors::Error;
use crate::local::LocalMirror;
use crate::remote::{self, RemoteHandle};
use crate::store::{Adapter, Subscription};
use crate::sync::{self, Collection, EditGuard, Mode, SubscriptionManager};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct AppState {
    mode: Mode,
    remote: RemoteHandle,
    mirror: LocalMirror,
    guard: EditGuard,
    poll_interval: Duration,
    pub users: Collection<User>,
    pub products: Collection<Product>,
    pub locations: Collection<Location>,
    pub purposes: Collection<Purpose>,
    pub categories: Collection<Category>,
    pub registrations: Collection<Registration>,
}

async fn initial_fetch<E: Entity>(remote: &RemoteHandle, poll_interval: Duration) -> Vec<E> {
    let fetched = Adapter::<E>::new(Arc::clone(remote), Mode::Connected, poll_interval)
        .fetch_all()
        .await;
    if let Some(error) = fetched.error {
        warn!(kind = %E::KIND, %error, "initial fetch fell back to seed data");
    }
    fetched.items
}

impl AppState {
    /// Builds the session from configuration, constructing the remote
    /// client from the configured credentials.
    pub async fn load(config: &AppConfig) -> Self {
        Self::load_with(remote::connect(config), config).await
    }

    /// Builds the session around an explicit remote client. Never fails:
    /// every degradation path ends in usable (seeded) collections.
    pub async fn load_with(remote: RemoteHandle, config: &AppConfig) -> Self {
        let mode = sync::probe(&remote, config.remote.is_some()).await;
        let mirror = LocalMirror::new(&config.data_dir, &config.namespace);
        let poll_interval = config.poll_interval;
        info!(?mode, "session mode selected");

        let (users, products, locations, purposes, categories, registrations) = match mode {
            Mode::Connected => {
                tokio::join!(
                    initial_fetch::<User>(&remote, poll_interval),
                    initial_fetch::<Product>(&remote, poll_interval),
                    initial_fetch::<Location>(&remote, poll_interval),
                    initial_fetch::<Purpose>(&remote, poll_interval),
                    initial_fetch::<Category>(&remote, poll_interval),
                    initial_fetch::<Registration>(&remote, poll_interval),
                )
            }
            Mode::Local => (
                mirror.load::<User>(),
                mirror.load::<Product>(),
                mirror.load::<Location>(),
                mirror.load::<Purpose>(),
                mirror.load::<Category>(),
                mirror.load::<Registration>(),
            ),
        };

        Self {
            mode,
            remote,
            mirror,
            guard: EditGuard::new(),
            poll_interval,
            users: Arc::new(RwLock::new(users)),
            products: Arc::new(RwLock::new(products)),
            locations: Arc::new(RwLock::new(locations)),
            purposes: Arc::new(RwLock::new(purposes)),
            categories: Arc::new(RwLock::new(categories)),
            registrations: Arc::new(RwLock::new(registrations)),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The edit guard consulted by the push-apply path; the presentation
    /// layer toggles it around open edit dialogs.
    #[must_use]
    pub fn guard(&self) -> &EditGuard {
        &self.guard
    }

    fn adapter<E: Entity>(&self) -> Adapter<E> {
        Adapter::new(Arc::clone(&self.remote), self.mode, self.poll_interval)
    }

    /// Attaches one push channel per kind. In local mode every handle is
    /// null and the manager tears down nothing.
    #[must_use]
    pub fn attach_subscriptions(&self) -> SubscriptionManager {
        let manager = SubscriptionManager::new(vec![
            self.subscribe_kind(&self.users),
            self.subscribe_kind(&self.products),
            self.subscribe_kind(&self.locations),
            self.subscribe_kind(&self.purposes),
            self.subscribe_kind(&self.categories),
            self.subscribe_kind(&self.registrations),
        ]);
        info!(active = manager.active(), "subscriptions attached");
        manager
    }

    fn subscribe_kind<E: Entity>(&self, collection: &Collection<E>) -> Option<Subscription> {
        let guard = self.guard.clone();
        let collection = Arc::clone(collection);
        self.adapter::<E>().subscribe(move |items| {
            let guard = guard.clone();
            let collection = Arc::clone(&collection);
            async move {
                sync::apply_snapshot(&guard, &collection, items).await;
            }
        })
    }

    async fn mirror_flush<E: Entity>(&self, collection: &Collection<E>) {
        if self.mode != Mode::Local {
            return;
        }
        let items = collection.read().await;
        if let Err(error) = self.mirror.flush::<E>(&items) {
            warn!(kind = %E::KIND, %error, "mirror flush failed");
        }
    }

    /// Inserts a value after a client-side uniqueness check on its key.
    /// A duplicate is an inert no-op, not an error.
    async fn insert_item<E: Entity>(
        &self,
        collection: &Collection<E>,
        value: E,
    ) -> Option<Error> {
        {
            let items = collection.read().await;
            if items.iter().any(|item| item.key() == value.key()) {
                debug!(kind = %E::KIND, key = value.key(), "duplicate key, insert skipped");
                return None;
            }
        }
        let (confirmed, error) = self.adapter::<E>().create(value).await;
        collection.write().await.push(confirmed);
        self.mirror_flush(collection).await;
        error
    }

    async fn remove_item<E: Entity>(&self, collection: &Collection<E>, key: &str) -> Option<Error> {
        let error = self.adapter::<E>().delete(key).await;
        collection.write().await.retain(|item| item.key() != key);
        self.mirror_flush(collection).await;
        error
    }

    pub async fn add_user(&self, name: &str) -> Option<Error> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.insert_item(&self.users, User::new(name)).await
    }

    pub async fn remove_user(&self, name: &str) -> Option<Error> {
        self.remove_item(&self.users, name).await
    }

    pub async fn add_location(&self, name: &str) -> Option<Error> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.insert_item(&self.locations, Location::new(name)).await
    }

    pub async fn remove_location(&self, name: &str) -> Option<Error> {
        self.remove_item(&self.locations, name).await
    }

    pub async fn add_purpose(&self, name: &str) -> Option<Error> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.insert_item(&self.purposes, Purpose::new(name)).await
    }

    pub async fn remove_purpose(&self, name: &str) -> Option<Error> {
        self.remove_item(&self.purposes, name).await
    }

    /// Creates a category with an instant-derived id.
    pub async fn add_category(&self, name: &str) -> Option<Error> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let category = Category::new(instant_id(Utc::now()), name);
        self.insert_item(&self.categories, category).await
    }

    /// Deletes a category by id. Products referencing it keep their
    /// dangling id; the reference is weak and never cascades.
    pub async fn remove_category(&self, id: &str) -> Option<Error> {
        self.remove_item(&self.categories, id).await
    }

    pub async fn add_product(
        &self,
        name: &str,
        qrcode: Option<String>,
        category_id: Option<String>,
    ) -> Option<Error> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let now = Utc::now();
        let product = Product {
            id: instant_id(now),
            name: name.to_string(),
            qrcode,
            category_id,
            created_at: Some(now),
            attachment: None,
        };
        self.insert_item(&self.products, product).await
    }

    pub async fn remove_product(&self, id: &str) -> Option<Error> {
        self.remove_item(&self.products, id).await
    }

    /// Appends a registration. Registrations are immutable; this is the
    /// only mutation path for the collection.
    pub async fn create_registration(&self, registration: Registration) -> Option<Error> {
        self.insert_item(&self.registrations, registration).await
    }

    /// First product whose name matches. Product names are not guaranteed
    /// unique; first match wins by contract.
    pub async fn product_by_name(&self, name: &str) -> Option<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|product| product.name == name)
            .cloned()
    }

    /// First product whose scan code matches, for QR-scan selection.
    pub async fn product_by_qrcode(&self, code: &str) -> Option<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|product| product.qrcode.as_deref() == Some(code))
            .cloned()
    }

    /// Resolves a weak category reference; dangling or absent ids resolve
    /// to `None` and render as "none".
    pub async fn category_name(&self, id: Option<&str>) -> Option<String> {
        let id = id?;
        self.categories
            .read()
            .await
            .iter()
            .find(|category| category.id == id)
            .map(|category| category.name.clone())
    }

    /// Collection sizes for startup logging.
    pub async fn summary(&self) -> [(crate::entities::EntityKind, usize); 6] {
        use crate::entities::EntityKind;
        [
            (EntityKind::Users, self.users.read().await.len()),
            (EntityKind::Products, self.products.read().await.len()),
            (EntityKind::Locations, self.locations.read().await.len()),
            (EntityKind::Purposes, self.purposes.read().await.len()),
            (EntityKind::Categories, self.categories.read().await.len()),
            (
                EntityKind::Registrations,
                self.registrations.read().await.len(),
            ),
        ]
    }
}
