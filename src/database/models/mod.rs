pub mod account;
pub mod whiskey;

pub use account::{Account, AccountStatus, ProfileUpdate};
pub use whiskey::{
    FieldError, OwnerId, UnknownWhiskeyType, Whiskey, WhiskeyData, WhiskeyFields, WhiskeyId, WhiskeyType,
};
