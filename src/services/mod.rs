// Service exports
pub mod auth;
pub mod supabase;

pub use auth::{bearer_token, AuthError, Authenticator, Claims};
pub use supabase::{Filter, SupabaseClient, SupabaseError};
