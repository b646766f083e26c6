pub mod admin;
pub mod domain;
pub mod short_url;
pub mod user_domain;

pub use admin::Entity as AdminEntity;
pub use domain::Entity as DomainEntity;
pub use short_url::Entity as ShortUrlEntity;
pub use user_domain::Entity as UserDomainEntity;
