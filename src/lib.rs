pub mod export;
pub mod fetch;
pub mod model;
pub mod shell;
pub mod store;

pub use export::save_to_csv;
pub use fetch::fetch_listings;
pub use model::Crypto;
pub use shell::Shell;
pub use store::CryptoStore;
