use {
    crate::{
        config::StripeMode,
        domain::{
            customer::{ConnectionStatus, CustomerDirectory, FetchedCustomer},
            error::PipelineError,
            id::CustomerId,
        },
    },
    std::{future::Future, pin::Pin, time::Duration},
};

/// Upper bound for any single Stripe API call.
pub const STRIPE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct StripeCustomers {
    client: Option<stripe::Client>,
    mode: StripeMode,
}

impl StripeCustomers {
    /// Without a secret key every lookup fails fast and the connection
    /// check reports the key as missing.
    pub fn new(secret_key: Option<&str>, mode: StripeMode) -> Self {
        Self {
            client: secret_key.map(|key| stripe::Client::new(key.to_string())),
            mode,
        }
    }
}

impl CustomerDirectory for StripeCustomers {
    fn fetch_customer(
        &self,
        id: &CustomerId,
    ) -> Pin<Box<dyn Future<Output = Result<FetchedCustomer, PipelineError>> + Send + '_>> {
        let id = id.clone();
        Box::pin(async move { self.fetch_customer_inner(&id).await })
    }

    fn check_connection(&self) -> Pin<Box<dyn Future<Output = ConnectionStatus> + Send + '_>> {
        Box::pin(self.check_connection_inner())
    }
}

impl StripeCustomers {
    async fn fetch_customer_inner(&self, id: &CustomerId) -> Result<FetchedCustomer, PipelineError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| PipelineError::Provider("Stripe secret key not configured".into()))?;

        let customer_id = id
            .as_str()
            .parse::<stripe::CustomerId>()
            .map_err(|e| PipelineError::Provider(format!("invalid customer id: {e}")))?;

        let customer = tokio::time::timeout(
            STRIPE_TIMEOUT,
            stripe::Customer::retrieve(client, &customer_id, &[]),
        )
        .await
        .map_err(|_| PipelineError::Provider("Stripe API: request timed out".into()))?
        .map_err(|e| PipelineError::Provider(format!("Stripe API: {e}")))?;

        Ok(FetchedCustomer {
            email: customer.email,
        })
    }

    async fn check_connection_inner(&self) -> ConnectionStatus {
        let Some(client) = self.client.as_ref() else {
            return ConnectionStatus {
                success: false,
                message: "No API key configured".into(),
            };
        };

        let mut params = stripe::ListCustomers::new();
        params.limit = Some(1);

        match tokio::time::timeout(STRIPE_TIMEOUT, stripe::Customer::list(client, &params)).await {
            Ok(Ok(_)) => ConnectionStatus {
                success: true,
                message: format!("{} - API key is valid", self.mode.label()),
            },
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Stripe connection check failed");
                ConnectionStatus {
                    success: false,
                    message: e.to_string(),
                }
            }
            Err(_) => ConnectionStatus {
                success: false,
                message: "request timed out".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_key_fails_without_network() {
        let customers = StripeCustomers::new(None, StripeMode::Test);
        let id = CustomerId::parse("cus_123").unwrap();
        assert!(matches!(
            customers.fetch_customer(&id).await,
            Err(PipelineError::Provider(_))
        ));

        let status = customers.check_connection().await;
        assert!(!status.success);
        assert_eq!(status.message, "No API key configured");
    }

    #[tokio::test]
    async fn malformed_customer_id_is_rejected_locally() {
        let customers = StripeCustomers::new(Some("sk_test_dummy"), StripeMode::Test);
        let id = CustomerId::parse("not-a-customer").unwrap();
        assert!(matches!(
            customers.fetch_customer(&id).await,
            Err(PipelineError::Provider(_))
        ));
    }
}
