use async_trait::async_trait;
use innkeep_shared::types::{DepositPaymentId, StayId, TenantId};

use super::RepoResult;
use crate::deposit::{DepositPayment, DepositPolicy};

/// Deposit policies and deposit payments.
#[async_trait]
pub trait DepositRepository: Send + Sync {
    /// Lists every policy of the tenant, active or not.
    async fn list_policies(&self, tenant_id: TenantId) -> RepoResult<Vec<DepositPolicy>>;

    /// Inserts a policy. `AlreadyExists` on a duplicate name within the tenant.
    async fn insert_policy(&self, policy: DepositPolicy) -> RepoResult<DepositPolicy>;

    /// Loads one deposit payment.
    async fn get_payment(
        &self,
        tenant_id: TenantId,
        payment_id: DepositPaymentId,
    ) -> RepoResult<Option<DepositPayment>>;

    /// Lists the deposit payments of a stay, oldest first.
    async fn list_payments(&self, tenant_id: TenantId, stay_id: StayId) -> RepoResult<Vec<DepositPayment>>;

    /// Inserts (`expected_version == None`) or conditionally replaces a payment.
    async fn save_payment(
        &self,
        payment: DepositPayment,
        expected_version: Option<u64>,
    ) -> RepoResult<DepositPayment>;
}
