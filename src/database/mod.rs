pub mod models;
pub mod supabase;

pub use models::JournalEntry;
pub use supabase::SupabaseClient;
