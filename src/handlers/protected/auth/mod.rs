pub mod profile;
pub mod whoami;

pub use profile::get as profile_get;
pub use profile::put as profile_put;
pub use whoami::whoami as session_whoami;
