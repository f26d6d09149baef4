pub mod card;
pub mod engagement_event;
pub mod organization;
pub mod user;

pub use card::Entity as CardEntity;
pub use engagement_event::Entity as EngagementEventEntity;
pub use organization::Entity as OrganizationEntity;
pub use user::Entity as UserEntity;
