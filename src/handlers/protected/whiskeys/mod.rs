pub mod collection;
pub mod csv_io;
pub mod record;
pub mod search;
pub mod stats;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::create as whiskeys_create;
pub use collection::list as whiskeys_list;
pub use record::delete as whiskey_delete;
pub use record::get as whiskey_get;
pub use record::put as whiskey_put;
pub use search::search as whiskeys_search;
pub use stats::stats as whiskeys_stats;

pub use csv_io::export as whiskeys_export_csv;
pub use csv_io::import as whiskeys_import_csv;
