/// Data models module
///
/// One struct per table. The resource kinds implement
/// [`Resource`](crate::resource::Resource) so they can be mounted on the
/// generic CRUD routes; `Session` is internal to authentication.

mod category;
pub use category::Category;

mod timeframe;
pub use timeframe::Timeframe;

mod reminder;
pub use reminder::Reminder;

pub use test::Test;

mod user;
pub use user::{join_roles, User};

mod session;
pub use session::Session;
