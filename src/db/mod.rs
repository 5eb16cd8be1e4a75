//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// One document per uploaded image (keyed by repository-assigned UUID)
    pub const SKIN_ANALYSES: &str = "skin_analyses";
    pub const SUBSCRIPTIONS: &str = "subscriptions";
    pub const ROUTINES: &str = "routines";
    pub const PRODUCT_BUNDLES: &str = "product_bundles";
}
