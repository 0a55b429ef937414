mod boxed_value;
mod globals;
mod inline_array;
mod number_value;
mod record_object;
mod string_value;
mod value;

pub use boxed_value::BoxedValue;
pub use globals::Globals;
pub use inline_array::InlineArray;
pub use number_value::NumberValue;
pub use record_object::RecordObject;
pub use string_value::StringValue;
pub use value::Value;
