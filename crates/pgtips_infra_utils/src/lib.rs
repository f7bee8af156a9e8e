pub mod dumping;
pub mod path;
#[cfg(any(feature = "testing", test))]
pub mod test_utils;
pub mod tracing_utils;
