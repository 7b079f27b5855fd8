pub mod client;
pub mod installation;
pub mod jwt;
pub mod models;

#[cfg(test)]
pub mod testing;

pub use client::GitHubClient;
pub use installation::InstallationCache;
pub use jwt::sign_app_jwt;
