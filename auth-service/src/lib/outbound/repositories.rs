pub mod identity;
pub mod memory;

pub use identity::PostgresIdentityStore;
pub use memory::InMemoryIdentityStore;
