/// Subscription state stored in the `status` column of the waitlist table.
///
/// The column default is `subscribed`; nothing in this repository flips an
/// entry to `unsubscribed`, but the campaign runner filters on it so rows
/// edited out-of-band stay excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum WaitlistStatus {
    Subscribed,
    Unsubscribed,
}
