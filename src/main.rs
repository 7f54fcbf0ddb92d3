//! CMS Backend - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() -> Result<(), cms_backend::BoxError> {
    cms_backend::run().await
}
