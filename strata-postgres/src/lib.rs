mod connection;
mod util;
mod value_holder;

pub use connection::*;
pub(crate) use value_holder::ValueHolder;
pub use value_holder::postgres_type_to_value;
