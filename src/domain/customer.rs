use {
    super::error::PipelineError,
    super::id::CustomerId,
    std::{future::Future, pin::Pin},
};

/// What the enrichment step gets back from the provider's customer resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedCustomer {
    pub email: Option<String>,
}

/// Outcome of a provider key check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub success: bool,
    pub message: String,
}

pub trait CustomerDirectory: Send + Sync {
    fn fetch_customer(
        &self,
        id: &CustomerId,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedCustomer, PipelineError>> + Send + '_>>;

    fn check_connection(&self) -> Pin<Box<dyn Future<Output = ConnectionStatus> + Send + '_>>;
}
