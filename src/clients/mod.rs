#[cfg(feature = "deepseek")]
pub mod deepseek;
pub mod flexible;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "deepseek")]
pub use deepseek::*;
pub use flexible::*;
pub use mock::*;
#[cfg(feature = "openai")]
pub use openai::*;
