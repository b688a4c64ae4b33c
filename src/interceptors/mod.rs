use async_trait::async_trait;
use std::fmt::Debug;

/// Observer for every (prompt, completion) exchange with the model.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn save(&self, prompt: &str, completion: &str) -> std::io::Result<()>;
}

pub mod file;
pub use file::FileInterceptor;
