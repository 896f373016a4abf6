// handlers/protected/mod.rs - endpoints behind require_auth
//
// Every handler here resolves the caller's entreprise from the token and
// passes it down; nothing is ever looked up across tenants.
pub mod contacts;
pub mod dashboard;
pub mod entreprise;
pub mod factures;
pub mod missions;
pub mod profile;
pub mod whoami;
