// handlers/elevated/mod.rs - admin-token endpoints under /api/admin
pub mod entreprises;
