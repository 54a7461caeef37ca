mod subscriber_email;
mod waitlist_status;

pub use subscriber_email::SubscriberEmail;
pub use waitlist_status::WaitlistStatus;
