mod customer;
mod invoice;
mod settings;

pub use customer::Customer;
pub use invoice::{CurrentInvoice, LineItem};
pub use settings::{Settings, SettingsPatch};
